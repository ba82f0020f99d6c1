use anyhow::Context;
use clap::Parser;
use receipt_statement_linker::domain::ports::ConfigProvider;
use receipt_statement_linker::utils::error::{ErrorSeverity, LinkerError};
use receipt_statement_linker::utils::{logger, validation::Validate};
use receipt_statement_linker::{
    AppConfig, CliConfig, FileInput, HttpInferenceClient, LinkOptions, Linker, LlmCategorizer,
    LlmTranscriber, LlmVendorMatcher, LocalStorage,
};
use std::sync::Arc;

fn exit_with(e: &LinkerError) -> ! {
    tracing::error!(
        "❌ Linking failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        exit_with(&e);
    }

    // An explicit --config must load; the default location falls back to defaults.
    let config = match &cli.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => exit_with(&e),
        },
        None => {
            let path = AppConfig::default_path().context("Could not determine the config directory")?;
            AppConfig::load_or_default(&path)
        }
    };
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let api_key = config.api_key();
    if api_key.is_none() {
        tracing::warn!(
            "{} is not set, sending requests to {} without credentials",
            config.api_key_env,
            config.api_base
        );
    }

    let client = match HttpInferenceClient::new(&config.api_base, api_key, config.request_timeout_seconds) {
        Ok(client) => Arc::new(client),
        Err(e) => exit_with(&e),
    };

    let options = LinkOptions {
        output_path: cli.output.clone(),
        csv_output_path: cli.csv_output.clone(),
        concurrent_requests: config.concurrent_requests(),
    };
    let mut linker = Linker::new(
        LlmTranscriber::new(client.clone(), config.transcription_model()),
        LlmVendorMatcher::new(client.clone(), config.matching_model()),
        LocalStorage::new("."),
        options,
    );
    if !cli.no_categorize {
        linker = linker.with_categorizer(LlmCategorizer::new(
            client,
            config.categorization_model(),
            config.category_set(),
            config.categorization_notes().map(str::to_string),
        ));
    }

    let receipts: Vec<FileInput> = cli.receipt_input.iter().map(FileInput::new).collect();
    let statements: Vec<FileInput> = cli.statement_input.iter().map(FileInput::new).collect();

    match linker.run(&receipts, &statements).await {
        Ok(report) => {
            println!(
                "✅ Linked {} transactions ({} with receipts, {} without)",
                report.records.len(),
                report.matched,
                report.unmatched
            );
            println!("📁 Output saved to: {}", report.output_path);
            if let Some(csv_path) = &cli.csv_output {
                println!("📁 CSV summary saved to: {}", csv_path);
            }
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}
