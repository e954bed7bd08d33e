//! Minimum fee table (piso) and the percentage-based base fee.
//!
//! The floor for a case is the larger of two figures: the fixed amount the
//! OAB/RJ table lists for its case type, and a fraction (the contingency
//! factor) of 20 % of the case value. The base fee is then the larger of
//! 20 % of the case value and that floor, so `base >= floor` always holds.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::case::CaseType;
use crate::error::ConfigError;

/// Percentage of the case value used as the reference fee (20 %).
pub const PERCENTAGE_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Share of the 20 % figure that can lift the floor above the table amount.
pub const FLOOR_CONTINGENCY_FACTOR: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Floor applied to case types missing from the table.
pub const DEFAULT_FLOOR: Decimal = Decimal::from_parts(300_000, 0, 0, false, 2);

/// Validated contingency factor in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContingencyFactor(Decimal);

impl ContingencyFactor {
    pub fn new(value: Decimal) -> Result<Self, ConfigError> {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(ConfigError::InvalidContingencyFactor(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl Default for ContingencyFactor {
    fn default() -> Self {
        Self(FLOOR_CONTINGENCY_FACTOR)
    }
}

/// Floor and base fee computed locally for one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalFigures {
    pub floor_amount: Decimal,
    pub base_amount: Decimal,
}

/// Read-only mapping from case-type label to fixed minimum fee.
///
/// Keys are always the English [`CaseType::label`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeFloorTable {
    default_floor: Decimal,
    floors: BTreeMap<String, Decimal>,
}

/// On-disk shape; keys may use any spelling [`CaseType`] parses.
#[derive(Deserialize)]
struct FloorTableFile {
    default_floor: Decimal,
    floors: BTreeMap<String, Decimal>,
}

impl FeeFloorTable {
    /// An empty table where every case type gets `default_floor`.
    pub fn new(default_floor: Decimal) -> Self {
        Self {
            default_floor,
            floors: BTreeMap::new(),
        }
    }

    /// Add or replace the floor for one case type.
    pub fn with_floor(mut self, case_type: CaseType, amount: Decimal) -> Self {
        self.floors.insert(case_type.label().to_string(), amount);
        self
    }

    /// The OAB/RJ minimum fee figures (illustrative values; confirm against
    /// the current published table).
    pub fn oab_rj() -> Self {
        Self::new(DEFAULT_FLOOR)
            .with_floor(CaseType::CivilCommon, Decimal::new(6500_00, 2))
            .with_floor(CaseType::FamilyDivorce, Decimal::new(4000_00, 2))
            .with_floor(CaseType::LaborClaimant, Decimal::new(3000_00, 2))
            .with_floor(CaseType::SocialSecurityAdministrative, Decimal::new(2500_00, 2))
            .with_floor(CaseType::Other, Decimal::new(3000_00, 2))
    }

    /// Parse a table from JSON:
    /// `{"default_floor": "3000.00", "floors": {"Other": "3000.00"}}`.
    ///
    /// Keys may be a slug, the English label or the Portuguese label; each is
    /// stored under the English label. Unknown or repeated case types are
    /// rejected.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: FloorTableFile = serde_json::from_str(json)?;
        let mut table = Self::new(file.default_floor);
        for (key, amount) in file.floors {
            let case_type: CaseType = key
                .parse()
                .map_err(|_| ConfigError::UnknownFloorCaseType(key.clone()))?;
            let label = case_type.label().to_string();
            if table.floors.insert(label.clone(), amount).is_some() {
                return Err(ConfigError::DuplicateFloorCaseType(label));
            }
        }
        table.check_non_negative()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::FloorTableIo {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            entries = table.floors.len(),
            "loaded floor table"
        );
        Ok(table)
    }

    pub fn default_floor(&self) -> Decimal {
        self.default_floor
    }

    /// Labels and fixed floors, in label order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.floors.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Fixed floor for a case type, or the default floor.
    ///
    /// Accepts any spelling [`CaseType`] parses; anything else gets the
    /// default floor.
    pub fn fixed_floor(&self, case_type: &str) -> Decimal {
        let label = match case_type.parse::<CaseType>() {
            Ok(known) => known.label(),
            Err(_) => case_type,
        };
        self.floors
            .get(label)
            .copied()
            .unwrap_or(self.default_floor)
    }

    /// Floor for a case: `max(fixed_floor, case_value * 20% * factor)`.
    pub fn floor(&self, case_type: &str, case_value: Decimal, factor: ContingencyFactor) -> Decimal {
        let contingent = percentage_base(case_value) * factor.value();
        self.fixed_floor(case_type).max(contingent)
    }

    /// Floor and base fee for a case type and value.
    pub fn figures(
        &self,
        case_type: &str,
        case_value: Decimal,
        factor: ContingencyFactor,
    ) -> LocalFigures {
        let floor_amount = self.floor(case_type, case_value, factor);
        LocalFigures {
            floor_amount,
            base_amount: base_fee(case_value, floor_amount),
        }
    }

    fn check_non_negative(&self) -> Result<(), ConfigError> {
        if self.default_floor < Decimal::ZERO {
            return Err(ConfigError::NegativeFloor {
                case_type: "<default>".to_string(),
                amount: self.default_floor,
            });
        }
        if let Some((case_type, amount)) = self.floors.iter().find(|(_, v)| **v < Decimal::ZERO) {
            return Err(ConfigError::NegativeFloor {
                case_type: case_type.clone(),
                amount: *amount,
            });
        }
        Ok(())
    }
}

impl Default for FeeFloorTable {
    fn default() -> Self {
        Self::oab_rj()
    }
}

/// 20 % of the case value.
pub fn percentage_base(case_value: Decimal) -> Decimal {
    case_value * PERCENTAGE_RATE
}

/// Base fee: the greater of 20 % of the case value and the floor.
pub fn base_fee(case_value: Decimal, floor_amount: Decimal) -> Decimal {
    percentage_base(case_value).max(floor_amount)
}
