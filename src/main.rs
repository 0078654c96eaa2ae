use clap::Parser;
use json_tabular::domain::ports::{ConfigProvider, DocumentSource};
use json_tabular::utils::error::{ConnectorError, ErrorSeverity};
use json_tabular::utils::{logger, validation::Validate};
use json_tabular::{
    describe_schema, CliConfig, ConnectorEngine, ConnectorPipeline, HttpSource, LocalStorage,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting json-tabular CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mut source = HttpSource::new(config.api_endpoint());
    if let Some(timeout) = config.timeout_seconds {
        source = source.with_timeout(Duration::from_secs(timeout));
    }

    let outcome = if config.schema_only {
        print_schema(&source, &config).await
    } else {
        let storage = LocalStorage::new(config.output_path.clone());
        let pipeline = ConnectorPipeline::with_source(storage, config, source);
        ConnectorEngine::new(pipeline).run().await.map(|output_path| {
            println!("Output saved to: {}", output_path);
        })
    };

    if let Err(e) = outcome {
        exit_with(e);
    }

    Ok(())
}

async fn print_schema(source: &HttpSource, config: &CliConfig) -> json_tabular::Result<()> {
    let document = source.fetch().await?;
    let schema = describe_schema(&document, &config.options())?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn exit_with(e: ConnectorError) -> ! {
    tracing::error!(
        "Connector run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
