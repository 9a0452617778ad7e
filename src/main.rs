use clap::Parser;
use healix::adapters::notify::Tee;
use healix::core::transform::build_request;
use healix::core::ConfigProvider;
use healix::utils::error::ErrorSeverity;
use healix::utils::logger;
use healix::{
    CliConfig, ConsoleSink, HealixError, HealixForm, HttpPredictionClient, MemorySink,
    PredictionPanel, Settlement, SubmissionPipeline, TracingSink,
};

fn exit_with(error: &HealixError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());

    let exit_code = match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium | ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None, cli.log_format.unwrap_or_default());
            exit_with(&e);
        }
    };

    logger::init_cli_logger(cli.verbose, config.log_level(), config.log_format());
    tracing::info!("Starting healix");
    tracing::debug!("Resolved config: {:?}", config);

    let state = cli.build_form().unwrap_or_else(|e| exit_with(&e));

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN - the request will not be sent");
        let request =
            build_request(&state, config.validation_mode()).unwrap_or_else(|e| exit_with(&e));
        println!("POST {}", config.endpoint());
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let client = HttpPredictionClient::new(config.endpoint());
    let recorded = MemorySink::new();

    let settlement = if cli.json {
        let notifier = Tee(TracingSink, recorded.clone());
        let form = HealixForm::with_state(
            SubmissionPipeline::from_config(client, notifier, &config),
            state,
        );
        let settlement = form.submit().await;

        let output = serde_json::json!({
            "result": form.result(),
            "panel": form.panel().to_string(),
            "notifications": recorded.notifications(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        settlement
    } else {
        let form = HealixForm::with_state(
            SubmissionPipeline::from_config(client, ConsoleSink, &config),
            state,
        );
        let settlement = form.submit().await;

        println!("{}: {}", PredictionPanel::HEADING, form.panel());
        settlement
    };

    let exit_code = match settlement {
        Settlement::Success(_) | Settlement::Superseded => 0,
        Settlement::Rejected(_) => 1,
        Settlement::SoftFailure { .. } => 2,
        Settlement::Failure(_) => 3,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
