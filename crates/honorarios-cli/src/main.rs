mod display;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use honorarios_ai::{FeeCalculator, GeminiClient, GenerationError, local_figures, rules_only};
use honorarios_core::config::{
    DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT,
};
use honorarios_core::{
    CaseInput, CaseType, Complexity, ConfigError, ContingencyFactor, FeeFloorTable,
    ProceduralPhase, Settings, build_prompt, parse_amount, parse_response,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "honorarios",
    version,
    about = "Attorney fee range calculator: OAB/RJ floor plus a Gemini suggestion"
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArgs {
    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[arg(long, env = "HONORARIOS_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    #[arg(long, env = "HONORARIOS_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Per-request timeout for the model call.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), global = true)]
    timeout_secs: u64,

    /// Retries after a transient model failure (0 or 1).
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_RETRIES,
        value_parser = clap::value_parser!(u8).range(0..=1),
        global = true
    )]
    retries: u8,

    /// Share of 20% of the case value that can lift the floor (0 to 1).
    #[arg(long, env = "HONORARIOS_CONTINGENCY_FACTOR", value_parser = parse_amount, global = true)]
    contingency_factor: Option<Decimal>,

    /// JSON floor table replacing the built-in OAB/RJ figures.
    #[arg(long, env = "HONORARIOS_FLOOR_TABLE", global = true)]
    floor_table: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate a fee range for a case.
    Estimate {
        #[command(flatten)]
        case: CaseArgs,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,

        /// Skip the model and report the floor and base only.
        #[arg(long)]
        rules_only: bool,
    },
    /// Print the minimum fee table.
    Floors,
    /// Print the prompt that would be sent, without calling the model.
    Prompt {
        #[command(flatten)]
        case: CaseArgs,
    },
    /// Parse a saved model reply from a file or stdin.
    Parse {
        file: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct CaseArgs {
    /// civil-common, family-divorce, labor-claimant, social-security or other.
    #[arg(long)]
    case_type: CaseType,

    /// Case value in BRL (10000.50 or 10.000,50).
    #[arg(long, value_parser = parse_amount)]
    value: Decimal,

    /// low, medium or high.
    #[arg(long, default_value = "medium")]
    complexity: Complexity,

    /// knowledge, instruction, appeal or enforcement.
    #[arg(long, default_value = "knowledge")]
    phase: ProceduralPhase,
}

impl CaseArgs {
    fn into_case(self) -> anyhow::Result<CaseInput> {
        Ok(CaseInput::new(
            self.case_type,
            self.value,
            self.complexity,
            self.phase,
        )?)
    }
}

impl ConfigArgs {
    fn settings(&self) -> Result<Settings, ConfigError> {
        let contingency_factor = match self.contingency_factor {
            Some(f) => ContingencyFactor::new(f)?,
            None => ContingencyFactor::default(),
        };
        let settings = Settings {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.retries,
            contingency_factor,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn floor_table(&self) -> Result<FeeFloorTable, ConfigError> {
        match &self.floor_table {
            Some(path) => FeeFloorTable::load(path),
            None => Ok(FeeFloorTable::oab_rj()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("honorarios v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if is_config_error(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.config.settings()?;
    let table = cli.config.floor_table()?;
    tracing::debug!(?settings, "configuration loaded");

    match cli.command {
        Command::Estimate {
            case,
            json,
            rules_only: offline,
        } => {
            let case = case.into_case()?;
            let report = if offline {
                rules_only(&table, settings.contingency_factor, &case)?
            } else {
                settings.require_api_key()?;
                let client = GeminiClient::from_settings(&settings)?;
                let calculator = FeeCalculator::new(client, table, &settings);
                calculator.calculate(&case).await?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", display::ReportView(&report));
            }
        }
        Command::Floors => print!("{}", display::FloorTableView(&table)),
        Command::Prompt { case } => {
            let case = case.into_case()?;
            let figures = local_figures(&table, settings.contingency_factor, &case);
            print!(
                "{}",
                build_prompt(&case, figures.floor_amount, figures.base_amount)
            );
        }
        Command::Parse { file, json } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading model reply from stdin")?;
                    buf
                }
            };
            let parsed = parse_response(&raw);
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                print!("{}", display::ParsedView(&parsed));
            }
        }
    }

    Ok(())
}

fn is_config_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ConfigError>().is_some()
        || matches!(
            err.downcast_ref::<GenerationError>(),
            Some(GenerationError::Config(_))
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn estimate_args_parse() {
        let cli = Cli::try_parse_from([
            "honorarios",
            "estimate",
            "--case-type",
            "family-divorce",
            "--value",
            "10.000,50",
            "--complexity",
            "alta",
            "--rules-only",
        ])
        .unwrap();
        let Command::Estimate {
            case, rules_only, ..
        } = cli.command
        else {
            panic!("expected estimate");
        };
        assert!(rules_only);
        let case = case.into_case().unwrap();
        assert_eq!(case.case_type, CaseType::FamilyDivorce);
        assert_eq!(case.case_value, Decimal::new(10_000_50, 2));
        assert_eq!(case.complexity, Complexity::High);
        assert_eq!(case.procedural_phase, ProceduralPhase::Knowledge);
    }

    #[test]
    fn unknown_case_type_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "honorarios",
            "estimate",
            "--case-type",
            "tax",
            "--value",
            "1000",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn non_positive_value_rejected_before_calculation() {
        let cli = Cli::try_parse_from([
            "honorarios",
            "prompt",
            "--case-type",
            "other",
            "--value",
            "0",
        ])
        .unwrap();
        let Command::Prompt { case } = cli.command else {
            panic!("expected prompt");
        };
        assert!(case.into_case().is_err());
    }

    #[test]
    fn retries_limited_to_one() {
        let result = Cli::try_parse_from(["honorarios", "--retries", "2", "floors"]);
        assert!(result.is_err());
    }

    #[test]
    fn contingency_factor_validated() {
        let cli = Cli::try_parse_from(["honorarios", "--contingency-factor", "1.5", "floors"])
            .unwrap();
        let err = cli.config.settings().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidContingencyFactor(_)));
    }

    #[test]
    fn zero_timeout_rejected() {
        let cli = Cli::try_parse_from(["honorarios", "--timeout-secs", "0", "floors"]).unwrap();
        assert!(matches!(
            cli.config.settings().unwrap_err(),
            ConfigError::ZeroTimeout
        ));

        let cli = Cli::try_parse_from(["honorarios", "floors"]).unwrap();
        assert_eq!(cli.config.settings().unwrap().timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn config_errors_are_detected_through_anyhow() {
        let err = anyhow::Error::from(ConfigError::MissingCredential("GEMINI_API_KEY"));
        assert!(is_config_error(&err));
        let err = anyhow::Error::from(GenerationError::Config(ConfigError::MissingCredential(
            "GEMINI_API_KEY",
        )));
        assert!(is_config_error(&err));
        let err = anyhow::anyhow!("other failure");
        assert!(!is_config_error(&err));
    }
}
