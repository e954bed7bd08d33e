//! Fee model for Honorarios: case parameters, the OAB/RJ floor table, the
//! prompt sent to the generative model and the parser for its reply.
//!
//! Everything here is pure; the network call lives in `honorarios-ai`.

pub mod case;
pub mod config;
pub mod currency;
pub mod error;
pub mod estimate;
pub mod floor;
pub mod parse;
pub mod prompt;

pub use case::{CaseInput, CaseType, Complexity, ProceduralPhase};
pub use config::Settings;
pub use currency::{format_brl, format_plain, normalize_amount, parse_amount};
pub use error::{AmountError, ConfigError, InputError};
pub use estimate::{EstimateWarning, FeeEstimate, build_estimate, rules_only_estimate};
pub use floor::{ContingencyFactor, FeeFloorTable, LocalFigures, base_fee};
pub use parse::{FeeLevel, ParseIssue, ParsedResponse, parse_response};
pub use prompt::build_prompt;
