//! Fee estimate assembled from local figures and the parsed model reply.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::case::CaseInput;
use crate::floor::LocalFigures;
use crate::parse::{FeeLevel, ParsedResponse};

/// Justification for estimates made without consulting the model.
pub const RULES_ONLY_JUSTIFICATION: &str =
    "Computed from internal rules only (OAB/RJ floor and the 20% base); no AI suggestion requested.";

/// A property of the estimate the lawyer should double-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimateWarning {
    /// The suggested minimum is below the ethical floor.
    MinimumBelowFloor { minimum: Decimal, floor: Decimal },
    /// Suggested amounts are not in `minimum <= median <= maximum` order.
    RangeOutOfOrder,
    /// The reply lacked some fields; they are `None` in the estimate.
    PartiallyUnparseable {
        missing: Vec<FeeLevel>,
        justification_missing: bool,
    },
}

impl std::fmt::Display for EstimateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateWarning::MinimumBelowFloor { minimum, floor } => write!(
                f,
                "suggested minimum {minimum} is below the OAB/RJ floor {floor}"
            ),
            EstimateWarning::RangeOutOfOrder => {
                f.write_str("suggested amounts are not in minimum <= median <= maximum order")
            }
            EstimateWarning::PartiallyUnparseable {
                missing,
                justification_missing,
            } => {
                let mut parts: Vec<&str> = missing.iter().map(|l| l.key()).collect();
                if *justification_missing {
                    parts.push("JUSTIFICATION");
                }
                write!(f, "could not read from the model reply: {}", parts.join(", "))
            }
        }
    }
}

/// Result of one calculation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeEstimate {
    pub case: CaseInput,
    pub floor_amount: Decimal,
    pub base_amount: Decimal,
    pub suggested_minimum: Option<Decimal>,
    pub suggested_median: Option<Decimal>,
    pub suggested_maximum: Option<Decimal>,
    pub justification: String,
    pub justification_found: bool,
    pub warnings: Vec<EstimateWarning>,
}

impl FeeEstimate {
    pub fn suggested(&self, level: FeeLevel) -> Option<Decimal> {
        match level {
            FeeLevel::Minimum => self.suggested_minimum,
            FeeLevel::Median => self.suggested_median,
            FeeLevel::Maximum => self.suggested_maximum,
        }
    }

    pub fn has_suggestions(&self) -> bool {
        FeeLevel::ALL.into_iter().any(|l| self.suggested(l).is_some())
    }
}

/// Merge the local figures with whatever the parser recovered.
///
/// Missing amounts stay `None`; the floor invariant and range ordering are
/// checked and reported as warnings rather than corrected.
pub fn build_estimate(case: CaseInput, figures: LocalFigures, parsed: ParsedResponse) -> FeeEstimate {
    let mut estimate = FeeEstimate {
        case,
        floor_amount: figures.floor_amount,
        base_amount: figures.base_amount,
        suggested_minimum: parsed.get(FeeLevel::Minimum),
        suggested_median: parsed.get(FeeLevel::Median),
        suggested_maximum: parsed.get(FeeLevel::Maximum),
        justification: parsed.justification.clone(),
        justification_found: parsed.justification_found,
        warnings: Vec::new(),
    };

    if let Some(minimum) = estimate.suggested_minimum
        && minimum < estimate.floor_amount
    {
        estimate.warnings.push(EstimateWarning::MinimumBelowFloor {
            minimum,
            floor: estimate.floor_amount,
        });
    }

    let present: Vec<Decimal> = FeeLevel::ALL
        .into_iter()
        .filter_map(|l| estimate.suggested(l))
        .collect();
    if present.windows(2).any(|w| w[0] > w[1]) {
        estimate.warnings.push(EstimateWarning::RangeOutOfOrder);
    }

    let missing = parsed.missing();
    if !missing.is_empty() || !parsed.justification_found {
        estimate.warnings.push(EstimateWarning::PartiallyUnparseable {
            missing,
            justification_missing: !parsed.justification_found,
        });
    }

    estimate
}

/// An estimate with only the locally computed floor and base.
pub fn rules_only_estimate(case: CaseInput, figures: LocalFigures) -> FeeEstimate {
    FeeEstimate {
        case,
        floor_amount: figures.floor_amount,
        base_amount: figures.base_amount,
        suggested_minimum: None,
        suggested_median: None,
        suggested_maximum: None,
        justification: RULES_ONLY_JUSTIFICATION.to_string(),
        justification_found: false,
        warnings: Vec::new(),
    }
}
