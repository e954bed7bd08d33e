//! One calculation request: local figures, prompt, model call, parse, assembly.

use chrono::Utc;
use honorarios_core::{
    CaseInput, ContingencyFactor, FeeEstimate, FeeFloorTable, LocalFigures, Settings,
    build_estimate, build_prompt, parse_response, rules_only_estimate,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CalculationError;
use crate::generator::TextGenerator;

/// An estimate with provenance, as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct FeeReport {
    pub estimate: FeeEstimate,
    /// `None` for rules-only estimates.
    pub model: Option<String>,
    /// ISO 8601 timestamp string.
    pub generated_at: String,
}

/// Computes fee estimates against an injected generator and floor table.
pub struct FeeCalculator<G> {
    generator: G,
    table: FeeFloorTable,
    factor: ContingencyFactor,
    temperature: f32,
}

impl<G: TextGenerator> FeeCalculator<G> {
    pub fn new(generator: G, table: FeeFloorTable, settings: &Settings) -> Self {
        Self {
            generator,
            table,
            factor: settings.contingency_factor,
            temperature: settings.temperature,
        }
    }

    /// Run the full pipeline for one case.
    ///
    /// Input is validated before any network call. A failed model call yields
    /// an error and no estimate; a reply that is only partly readable still
    /// yields an estimate, with the unreadable fields left empty.
    pub async fn calculate(&self, case: &CaseInput) -> Result<FeeReport, CalculationError> {
        case.validate()?;
        let figures = local_figures(&self.table, self.factor, case);
        info!(
            case_type = %case.case_type,
            case_value = %case.case_value,
            floor = %figures.floor_amount,
            base = %figures.base_amount,
            "computed local figures"
        );

        let prompt = build_prompt(case, figures.floor_amount, figures.base_amount);
        let raw = self.generator.generate(&prompt, self.temperature).await?;

        let parsed = parse_response(&raw);
        for issue in &parsed.issues {
            warn!(%issue, "model reply parse issue");
        }

        let estimate = build_estimate(case.clone(), figures, parsed);
        for warning in &estimate.warnings {
            warn!(%warning, "estimate needs review");
        }

        Ok(FeeReport {
            estimate,
            model: Some(self.generator.model().to_string()),
            generated_at: Utc::now().to_rfc3339(),
        })
    }
}

/// Floor and base for a case, using its case-type label as the table key.
pub fn local_figures(
    table: &FeeFloorTable,
    factor: ContingencyFactor,
    case: &CaseInput,
) -> LocalFigures {
    table.figures(case.case_type.label(), case.case_value, factor)
}

/// Estimate from the floor table alone, without calling the model.
pub fn rules_only(
    table: &FeeFloorTable,
    factor: ContingencyFactor,
    case: &CaseInput,
) -> Result<FeeReport, CalculationError> {
    case.validate()?;
    let figures = local_figures(table, factor, case);
    info!(floor = %figures.floor_amount, base = %figures.base_amount, "rules-only estimate");
    Ok(FeeReport {
        estimate: rules_only_estimate(case.clone(), figures),
        model: None,
        generated_at: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use honorarios_core::{
        CaseType, Complexity, EstimateWarning, InputError, ProceduralPhase, parse::FALLBACK_JUSTIFICATION,
    };
    use rust_decimal::Decimal;

    use crate::error::GenerationError;

    /// Replies with a fixed script and records the prompts it was given.
    struct ScriptedGenerator {
        reply: Result<String, u16>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<(String, f32)>>,
    }

    impl ScriptedGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(GenerationError::Server {
                    status: *status,
                    body: "scripted failure".into(),
                }),
            }
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn family_case(value: i64) -> CaseInput {
        CaseInput::new(
            CaseType::FamilyDivorce,
            Decimal::new(value, 0),
            Complexity::Medium,
            ProceduralPhase::Knowledge,
        )
        .unwrap()
    }

    fn calculator(generator: ScriptedGenerator) -> FeeCalculator<ScriptedGenerator> {
        FeeCalculator::new(generator, FeeFloorTable::oab_rj(), &Settings::default())
    }

    #[tokio::test]
    async fn full_reply_produces_estimate() {
        let calc = calculator(ScriptedGenerator::replying(
            "MINIMUM: 4500.00\nMEDIAN: 6000,50\nMAXIMUM: 9000.\n---\nJUSTIFICATION: Divórcio simples.",
        ));
        let report = calc.calculate(&family_case(10_000)).await.unwrap();
        let est = &report.estimate;
        assert_eq!(est.floor_amount, Decimal::new(4000, 0));
        assert_eq!(est.base_amount, Decimal::new(4000, 0));
        assert_eq!(est.suggested_minimum, Some(Decimal::new(4500, 0)));
        assert_eq!(est.suggested_median, Some(Decimal::new(600050, 2)));
        assert_eq!(est.suggested_maximum, Some(Decimal::new(9000, 0)));
        assert_eq!(est.justification, "Divórcio simples.");
        assert!(est.warnings.is_empty());
        assert_eq!(report.model.as_deref(), Some("scripted"));
    }

    #[tokio::test]
    async fn prompt_carries_figures_and_temperature() {
        let calc = calculator(ScriptedGenerator::replying("MINIMUM: 4000\n---\nok"));
        calc.calculate(&family_case(10_000)).await.unwrap();
        let prompts = calc.generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let (prompt, temperature) = &prompts[0];
        assert!(prompt.contains("R$ 4.000,00"));
        assert!((temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn partial_reply_degrades_gracefully() {
        let calc = calculator(ScriptedGenerator::replying("MINIMUM: abc\nMEDIAN: 6000"));
        let report = calc.calculate(&family_case(10_000)).await.unwrap();
        let est = &report.estimate;
        assert_eq!(est.suggested_minimum, None);
        assert_eq!(est.suggested_median, Some(Decimal::new(6000, 0)));
        assert_eq!(est.justification, FALLBACK_JUSTIFICATION);
        assert!(matches!(
            est.warnings.last(),
            Some(EstimateWarning::PartiallyUnparseable { .. })
        ));
    }

    #[tokio::test]
    async fn upstream_failure_yields_no_estimate() {
        let calc = calculator(ScriptedGenerator::failing(403));
        let err = calc.calculate(&family_case(10_000)).await.unwrap_err();
        assert!(matches!(
            err,
            CalculationError::Upstream(GenerationError::Server { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn invalid_input_rejected_before_call() {
        let calc = calculator(ScriptedGenerator::replying("unused"));
        let mut case = family_case(10_000);
        case.case_value = Decimal::ZERO;
        let err = calc.calculate(&case).await.unwrap_err();
        assert!(matches!(
            err,
            CalculationError::InvalidInput(InputError::NonPositiveCaseValue(_))
        ));
        assert_eq!(calc.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn minimum_below_floor_is_flagged_not_fixed() {
        let calc = calculator(ScriptedGenerator::replying(
            "MINIMUM: 3000\nMEDIAN: 5000\nMAXIMUM: 8000\n---\nJUSTIFICATION: x",
        ));
        let report = calc.calculate(&family_case(10_000)).await.unwrap();
        assert_eq!(report.estimate.suggested_minimum, Some(Decimal::new(3000, 0)));
        assert!(matches!(
            report.estimate.warnings[0],
            EstimateWarning::MinimumBelowFloor { .. }
        ));
    }

    #[test]
    fn rules_only_skips_model() {
        let report = rules_only(
            &FeeFloorTable::oab_rj(),
            ContingencyFactor::default(),
            &family_case(100_000),
        )
        .unwrap();
        assert!(report.model.is_none());
        assert_eq!(report.estimate.floor_amount, Decimal::new(4000, 0));
        assert_eq!(report.estimate.base_amount, Decimal::new(20_000, 0));
        assert!(!report.estimate.has_suggestions());
    }

    #[test]
    fn report_serializes_to_json() {
        let report = rules_only(
            &FeeFloorTable::oab_rj(),
            ContingencyFactor::default(),
            &family_case(10_000),
        )
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["model"].is_null());
        assert_eq!(json["estimate"]["base_amount"], "4000.00");
        assert!(json["generated_at"].as_str().unwrap().contains('T'));
    }
}
