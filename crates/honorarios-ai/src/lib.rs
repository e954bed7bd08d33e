//! AI layer: generative text client and the fee calculation pipeline.

mod error;
pub mod gemini;
pub mod generator;
pub mod pipeline;

pub use error::{CalculationError, GenerationError};
pub use gemini::GeminiClient;
pub use generator::{TextGenerator, with_retry};
pub use pipeline::{FeeCalculator, FeeReport, local_figures, rules_only};
