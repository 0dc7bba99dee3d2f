use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use eda_services::codec::{any_map_to_model, mapping_from_json, mapping_to_json, model_to_any_map, Model, Value};
use eda_services::config::Config;
use eda_services::eda::http::format_eda_error;
use eda_services::provider::{DataSource, ManagedResource};
use eda_services::schema::{get_all_type_names, get_schema, ResourceSchema, SchemaKind};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Manage EDA services resources from the command line
#[derive(Parser, Debug)]
#[command(name = "eda-services", version = eda_services::VERSION, about, long_about = None)]
struct Args {
    /// EDA API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token (skips the password grant)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Username for the password grant
    #[arg(long, global = true)]
    username: Option<String>,

    /// Password for the password grant
    #[arg(long, global = true)]
    password: Option<String>,

    /// Accept self-signed API certificates
    #[arg(long, global = true)]
    insecure: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Log file (defaults to the config directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered resource and data source types
    Types,
    /// Print a type's schema
    Schema { type_name: String },
    /// Create a resource from a YAML or JSON file
    Create {
        type_name: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Read a resource by `<namespace>/<name>`
    Read {
        type_name: String,
        #[arg(long)]
        id: String,
    },
    /// Replace a resource from a YAML or JSON file
    Update {
        type_name: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a resource by `<namespace>/<name>`
    Delete {
        type_name: String,
        #[arg(long)]
        id: String,
    },
    /// Look up a data source object
    Query {
        type_name: String,
        #[arg(short, long)]
        namespace: String,
        #[arg(long)]
        name: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = log_file.unwrap_or_else(get_log_path);

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG narrows further, e.g. `eda_services::eda=debug`
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("eda-services {} started with log level: {:?}", eda_services::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("eda-services").join("eda-services.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".eda-services").join("eda-services.log");
    }
    PathBuf::from("eda-services.log")
}

/// File < environment < command line
fn resolve_config(args: &Args) -> Config {
    let mut config = Config::load().with_env();
    if let Some(v) = &args.base_url {
        config.base_url = Some(v.clone());
    }
    if let Some(v) = &args.token {
        config.token = Some(v.clone());
    }
    if let Some(v) = &args.username {
        config.username = Some(v.clone());
    }
    if let Some(v) = &args.password {
        config.password = Some(v.clone());
    }
    if args.insecure {
        config.tls_skip_verify = true;
    }
    config
}

fn schema_for(type_name: &str) -> Result<&'static ResourceSchema> {
    get_schema(type_name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown type '{}'. Available: {}",
            type_name,
            get_all_type_names().join(", ")
        )
    })
}

/// Plan from a YAML (or JSON) document. Schema defaults fill gaps; top-level
/// attributes the file still leaves out stay unknown until defaulting
fn load_plan(schema: &ResourceSchema, path: &Path) -> Result<Model> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let mut json: serde_json::Value =
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;
    schema.apply_defaults(&mut json);
    let document = mapping_from_json(&json)?;

    let mut plan = schema.unknown_model();
    any_map_to_model(schema, &document, &mut plan)
        .with_context(|| format!("Invalid {} in {:?}", schema.type_name, path))?;
    Ok(plan)
}

fn print_model(schema: &ResourceSchema, model: &Model) -> Result<()> {
    let document = model_to_any_map(schema, model)?;
    println!("{}", serde_json::to_string_pretty(&mapping_to_json(&document))?);
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args);

    match args.command {
        Command::Types => {
            for name in get_all_type_names() {
                let kind = match schema_for(name)?.kind {
                    SchemaKind::Resource => "resource",
                    SchemaKind::DataSource => "data source",
                };
                println!("{:<20} {}", name, kind);
            }
        }
        Command::Schema { type_name } => {
            let schema = schema_for(&type_name)?;
            println!("{:#?}", schema);
        }
        Command::Create { type_name, file } => {
            let resource = ManagedResource::new(schema_for(&type_name)?, config.client()?)?;
            let plan = load_plan(resource.schema(), &file)?;
            let state = resource.create(plan).await?;
            print_model(resource.schema(), &state)?;
        }
        Command::Read { type_name, id } => {
            let resource = ManagedResource::new(schema_for(&type_name)?, config.client()?)?;
            let state = resource.import_state(&id)?;
            let state = resource.read(state).await?;
            print_model(resource.schema(), &state)?;
        }
        Command::Update { type_name, file } => {
            let resource = ManagedResource::new(schema_for(&type_name)?, config.client()?)?;
            let plan = load_plan(resource.schema(), &file)?;
            let state = resource.update(plan).await?;
            print_model(resource.schema(), &state)?;
        }
        Command::Delete { type_name, id } => {
            let resource = ManagedResource::new(schema_for(&type_name)?, config.client()?)?;
            let state = resource.import_state(&id)?;
            resource.delete(&state).await?;
            println!("Deleted {} {}", type_name, id);
        }
        Command::Query {
            type_name,
            namespace,
            name,
        } => {
            let source = DataSource::new(schema_for(&type_name)?, config.client()?)?;
            let mut query = source.schema().null_model();
            let identity = &source.schema().identity;
            if !query.set_path(&identity.namespace, Value::string(namespace))
                || !query.set_path(&identity.name, Value::string(name))
            {
                anyhow::bail!("Cannot set identity of '{}'", type_name);
            }
            let state = source.read(query).await?;
            print_model(source.schema(), &state)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level, args.log_file.clone()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: {:#}", err);
            None
        }
    };

    if let Err(err) = run(args).await {
        let detail = format!("{:#}", err);
        tracing::error!("{}", detail);
        eprintln!("Error: {}", detail);
        let hint = format_eda_error(&err);
        if hint != detail {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }
}
