use anyhow::{Context, Result};
use boostsec::config::{Config, Settings};
use boostsec::coverage::CoverageState;
use boostsec::host::{Host, Lifecycle};
use boostsec::schema;
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Declarative scanner coverage for BoostSecurity
#[derive(Parser, Debug)]
#[command(name = "boostsec", version = boostsec::VERSION, about, long_about = None)]
struct Args {
    /// Boost API GraphQL endpoint (overrides config file and BOOST_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Boost API token (overrides config file and BOOST_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a planned state without changing anything
    Plan {
        /// Planned state document; omit to plan a destroy
        #[arg(long)]
        plan: Option<PathBuf>,
        /// Prior state document
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Apply a planned state to a new asset
    Create {
        #[arg(long)]
        plan: PathBuf,
    },
    /// Refresh a persisted state from the API
    Read {
        #[arg(long)]
        state: PathBuf,
    },
    /// Move a persisted state to a planned one
    Update {
        #[arg(long)]
        state: PathBuf,
        #[arg(long)]
        plan: PathBuf,
    },
    /// Remove scanners and policy recorded in a persisted state
    Delete {
        #[arg(long)]
        state: PathBuf,
    },
    /// Print the full posture tree
    Posture,
    /// Print the provider and resource schemas
    Schema,
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

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("boostsec {} started with log level: {:?}", boostsec::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("boostsec").join("boostsec.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".boostsec").join("boostsec.log");
    }
    PathBuf::from("boostsec.log")
}

/// Read a JSON or YAML document, picked by extension
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML {:?}", path)),
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON {:?}", path)),
    }
}

fn read_optional(path: Option<&Path>) -> Result<Option<CoverageState>> {
    path.map(read_document).transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

fn lifecycle_for(command: &Command) -> Result<Option<Lifecycle>> {
    let call = match command {
        Command::Plan { plan, state } => Lifecycle::Plan {
            prior: read_optional(state.as_deref())?,
            plan: read_optional(plan.as_deref())?,
        },
        Command::Create { plan } => Lifecycle::Create {
            plan: read_document(plan)?,
        },
        Command::Read { state } => Lifecycle::Read {
            state: read_document(state)?,
        },
        Command::Update { state, plan } => Lifecycle::Update {
            prior: read_document(state)?,
            plan: read_document(plan)?,
        },
        Command::Delete { state } => Lifecycle::Delete {
            state: read_document(state)?,
        },
        Command::Posture | Command::Schema => return Ok(None),
    };
    Ok(Some(call))
}

/// Print the diagnostics behind a failure, one per line
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<boostsec::Error>() {
        Some(boost_err) => {
            for diag in boost_err.diagnostics() {
                eprintln!("Error: {}\n  {}", diag.summary, diag.detail);
            }
        }
        None => eprintln!("Error: {err:?}"),
    }
}

async fn run(args: Args) -> Result<()> {
    if let Command::Schema = args.command {
        return print_json(&serde_json::json!({
            "provider": schema::provider_schema(),
            "resources": [schema::resource_schema()],
        }));
    }

    let explicit = Config::load().overridden_by(Config {
        host: args.host.clone(),
        token: args.token.clone(),
    });
    let settings = Settings::resolve(&explicit)?;
    let host = Host::configure(&settings)?;

    match lifecycle_for(&args.command)? {
        Some(call) => {
            let verb = call.verb();
            let state = host.run(call).await?;
            tracing::info!("{} finished", verb);
            print_json(&state)
        }
        None => print_json(&host.posture().await?),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:?}");
            None
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:?}", err);
            report(&err);
            ExitCode::FAILURE
        }
    }
}
