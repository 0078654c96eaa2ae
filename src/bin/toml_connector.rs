use clap::Parser;
use json_tabular::config::toml_config::TomlConfig;
use json_tabular::domain::ports::{ConfigProvider, DocumentSource};
use json_tabular::utils::{logger, validation::Validate};
use json_tabular::{
    describe_schema, project_with_schema, ConnectorEngine, ConnectorPipeline, HttpSource,
    LocalStorage,
};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "toml-connector")]
#[command(about = "JSON connector driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "connector.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the schema mode from config: heuristic or annotated
    #[arg(long)]
    annotated: Option<bool>,

    /// Fetch and project, print a preview, write nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config file '{}': {}", args.config, e);
            eprintln!("Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
    tracing::info!("Loaded configuration from: {}", args.config);

    if let Some(annotated) = args.annotated {
        config.schema.mode = Some(json_tabular::SchemaMode::from_annotated_flag(annotated));
        tracing::info!("Schema mode overridden to: {}", config.options().schema_mode);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let mut source = HttpSource::new(config.api_endpoint()).with_headers(config.headers());
    if let Some(timeout) = config.timeout_seconds() {
        source = source.with_timeout(Duration::from_secs(timeout));
    }

    if args.dry_run {
        tracing::info!("DRY RUN MODE - nothing will be written");
        if let Err(e) = perform_dry_run(&source, &config).await {
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
        return Ok(());
    }

    let storage = LocalStorage::new(config.load.output_path.clone());
    let pipeline = ConnectorPipeline::with_source(storage, config, source);

    match ConnectorEngine::new(pipeline).run().await {
        Ok(output_path) => {
            println!("Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Connector run failed: {}", e);
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    let options = config.options();
    tracing::info!("Connector: {}", config.connector.name);
    if let Some(description) = &config.connector.description {
        tracing::info!("  {}", description);
    }
    tracing::info!("  Endpoint: {}", config.api_endpoint());
    tracing::info!(
        "  Schema: {} mode, nested data {:?}, max depth {}",
        options.schema_mode,
        options.nested_data,
        options.max_depth
    );
    if config.requested_fields().is_empty() {
        tracing::info!("  Fields: all");
    } else {
        tracing::info!("  Fields: {}", config.requested_fields().join(", "));
    }
    tracing::info!("  Output: {}/{}", config.output_path(), config.archive_name());
}

async fn perform_dry_run(source: &HttpSource, config: &TomlConfig) -> json_tabular::Result<()> {
    let options = config.options();
    let document = source.fetch().await?;
    let schema = describe_schema(&document, &options)?;

    println!("Schema ({} fields):", schema.len());
    for field in &schema.fields {
        let kind = if field.is_metric { "metric" } else { "dimension" };
        println!("  {:<32} {:<22} {}", field.id, field.semantic_type, kind);
    }

    let projection = project_with_schema(&document, &schema, config.requested_fields(), &options)?;
    println!("First rows:");
    for row in projection.rows.iter().take(5) {
        let cells: Vec<String> = row.values.iter().map(|v| v.to_cell()).collect();
        println!("  {}", cells.join(" | "));
    }
    println!("{} rows in total", projection.rows.len());
    Ok(())
}
