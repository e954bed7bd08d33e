//! Case parameters collected from the lawyer.
//!
//! Every enumerated field accepts three spellings when parsed: the kebab-case
//! slug used on the command line (`family-divorce`), the English label, and
//! the Portuguese label printed in the OAB/RJ fee table. Matching ignores case.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::InputError;

/// Type of legal action, as grouped by the OAB/RJ minimum fee table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseType {
    CivilCommon,
    FamilyDivorce,
    LaborClaimant,
    #[serde(rename = "social-security")]
    SocialSecurityAdministrative,
    Other,
}

impl CaseType {
    pub const ALL: [CaseType; 5] = [
        CaseType::CivilCommon,
        CaseType::FamilyDivorce,
        CaseType::LaborClaimant,
        CaseType::SocialSecurityAdministrative,
        CaseType::Other,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            CaseType::CivilCommon => "civil-common",
            CaseType::FamilyDivorce => "family-divorce",
            CaseType::LaborClaimant => "labor-claimant",
            CaseType::SocialSecurityAdministrative => "social-security",
            CaseType::Other => "other",
        }
    }

    /// Label used as the floor table key.
    pub fn label(self) -> &'static str {
        match self {
            CaseType::CivilCommon => "Civil (Ordinary Proceedings)",
            CaseType::FamilyDivorce => "Family (Consensual Divorce)",
            CaseType::LaborClaimant => "Labor (Claimant)",
            CaseType::SocialSecurityAdministrative => "Social Security (Administrative)",
            CaseType::Other => "Other",
        }
    }

    pub fn label_pt(self) -> &'static str {
        match self {
            CaseType::CivilCommon => "Cível Comum (Conhecimento)",
            CaseType::FamilyDivorce => "Família (Divórcio Consensual)",
            CaseType::LaborClaimant => "Trabalhista (Reclamante)",
            CaseType::SocialSecurityAdministrative => "Previdenciário (Administrativo)",
            CaseType::Other => "Outro",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CaseType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CaseType::ALL
            .into_iter()
            .find(|t| matches_any(s, &[t.slug(), t.label(), t.label_pt()]))
            .ok_or_else(|| InputError::UnknownCaseType(s.to_string()))
    }
}

/// Complexity of the case, as self-assessed by the lawyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Low, Complexity::Medium, Complexity::High];

    pub fn label(self) -> &'static str {
        match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
        }
    }

    pub fn label_pt(self) -> &'static str {
        match self {
            Complexity::Low => "Baixa",
            Complexity::Medium => "Média",
            Complexity::High => "Alta",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Complexity {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Complexity::ALL
            .into_iter()
            .find(|c| matches_any(s, &[c.label(), c.label_pt()]))
            .ok_or_else(|| InputError::UnknownComplexity(s.to_string()))
    }
}

/// Current procedural phase of the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProceduralPhase {
    #[default]
    Knowledge,
    Instruction,
    Appeal,
    Enforcement,
}

impl ProceduralPhase {
    pub const ALL: [ProceduralPhase; 4] = [
        ProceduralPhase::Knowledge,
        ProceduralPhase::Instruction,
        ProceduralPhase::Appeal,
        ProceduralPhase::Enforcement,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ProceduralPhase::Knowledge => "knowledge",
            ProceduralPhase::Instruction => "instruction",
            ProceduralPhase::Appeal => "appeal",
            ProceduralPhase::Enforcement => "enforcement",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProceduralPhase::Knowledge => "Knowledge Phase (Initial)",
            ProceduralPhase::Instruction => "Evidentiary Phase",
            ProceduralPhase::Appeal => "Appeal Phase (Local Court)",
            ProceduralPhase::Enforcement => "Enforcement Phase",
        }
    }

    pub fn label_pt(self) -> &'static str {
        match self {
            ProceduralPhase::Knowledge => "Fase de Conhecimento (Inicial)",
            ProceduralPhase::Instruction => "Fase de Instrução",
            ProceduralPhase::Appeal => "Fase Recursal (Tribunal Local)",
            ProceduralPhase::Enforcement => "Fase de Execução",
        }
    }
}

impl fmt::Display for ProceduralPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProceduralPhase {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ProceduralPhase::ALL
            .into_iter()
            .find(|p| matches_any(s, &[p.slug(), p.label(), p.label_pt()]))
            .ok_or_else(|| InputError::UnknownPhase(s.to_string()))
    }
}

/// Parameters of one fee calculation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseInput {
    pub case_type: CaseType,
    /// Amount in dispute (valor da causa), in BRL.
    pub case_value: Decimal,
    pub complexity: Complexity,
    pub procedural_phase: ProceduralPhase,
}

impl CaseInput {
    /// Build a case, rejecting a non-positive case value.
    pub fn new(
        case_type: CaseType,
        case_value: Decimal,
        complexity: Complexity,
        procedural_phase: ProceduralPhase,
    ) -> Result<Self, InputError> {
        let case = Self {
            case_type,
            case_value,
            complexity,
            procedural_phase,
        };
        case.validate()?;
        Ok(case)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.case_value <= Decimal::ZERO {
            return Err(InputError::NonPositiveCaseValue(self.case_value));
        }
        Ok(())
    }
}

fn matches_any(input: &str, candidates: &[&str]) -> bool {
    let input = input.to_lowercase();
    candidates.iter().any(|c| c.to_lowercase() == input)
}
