//! ASoC Automator - security scan automation against AppScan on Cloud
//!
//! Drives three unattended workflows from one binary:
//! - **scan**: static rounds (IRX preparation and upload) and dynamic rounds
//!   (runtime container deployment and DAST scan creation)
//! - **reports**: collect HTML/PDF reports and issue exports once scans finish,
//!   then publish them to Artifactory
//! - **depcheck**: OWASP dependency-check of the third-party jars in the
//!   runtime image
//!
//! Progress is logged through `tracing`; a summary table (or JSON) is printed
//! at the end of each run.

pub mod api_client;
pub mod application;
pub mod artifactory;
pub mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod docker;
pub mod download;
pub mod images;
pub mod output;
pub mod process;
pub mod report_files;
pub mod settings;
pub mod templates;
pub mod timing;

pub use context::AppContext;
pub use output::{OutputFormat, OutputWriter};

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ASoC Automator - scans, reports and dependency checks on AppScan on Cloud
#[derive(Parser, Debug)]
#[command(
    name = "automator",
    author = "ASoC Automator Team",
    version,
    about = "Automate AppScan on Cloud static/dynamic scans, reports and dependency checks",
    long_about = "Runs one of three unattended modes:\n\n\
                  scan      start a static and/or dynamic scan round\n\
                  reports   download reports and issue exports of finished scans\n\
                  depcheck  run OWASP dependency-check on the runtime image jars\n\n\
                  Credentials are read from the environment (or --env-file): KEY_ID, \
                  KEY_SECRET, PRESENCE_ID, ENTITLED_REGISTRY_USER/TOKEN, JENKINS_USER/TOKEN, \
                  ARTF_USER/TOKEN and the DB_* settings."
)]
pub struct Cli {
    /// Log level (RUST_LOG overrides it)
    #[arg(short, long, value_enum, default_value = "WARNING", global = true, ignore_case = true)]
    pub verbose: LogLevel,

    /// Summary output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress the summary; errors are still printed
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// .env file to preload secrets from
    #[arg(long, global = true, env = "AUTOMATOR_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a static and/or dynamic scan round
    Scan(commands::scan::ScanArgs),

    /// Collect reports and issue exports of finished scans
    Reports(commands::reports::ReportsArgs),

    /// Run the dependency check on the runtime image jars
    Depcheck(commands::depcheck::DepcheckArgs),
}

/// Which scan family a mode works on
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanType {
    All,
    Static,
    Dynamic,
}

impl ScanType {
    pub fn includes_static(&self) -> bool {
        matches!(self, ScanType::All | ScanType::Static)
    }

    pub fn includes_dynamic(&self) -> bool {
        matches!(self, ScanType::All | ScanType::Dynamic)
    }
}

/// Product release line being scanned
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Release {
    #[default]
    Single,
    Cocdev,
    Coc,
    #[value(name = "9.5")]
    V9_5,
    #[value(name = "10.0")]
    V10_0,
}

impl Release {
    pub fn as_str(&self) -> &'static str {
        match self {
            Release::Single => "single",
            Release::Cocdev => "cocdev",
            Release::Coc => "coc",
            Release::V9_5 => "9.5",
            Release::V10_0 => "10.0",
        }
    }
}

/// Log level names accepted by `-v`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// `EnvFilter` directive for the level
    pub fn directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
    context: AppContext,
}

impl CliApp {
    pub fn new(cli: Cli) -> anyhow::Result<Self> {
        let context = AppContext::new(&cli)?;
        Ok(Self { cli, context })
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Run the selected mode and return the process exit code
    pub async fn run(&self) -> anyhow::Result<i32> {
        match &self.cli.command {
            Commands::Scan(args) => commands::scan::run(&self.context, &self.cli, args).await,
            Commands::Reports(args) => {
                commands::reports::run(&self.context, &self.cli, args).await
            }
            Commands::Depcheck(args) => {
                commands::depcheck::run(&self.context, &self.cli, args).await
            }
        }
    }
}

/// Exit codes for CI integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Configuration or input error
    pub const CONFIG_ERROR: i32 = 2;
    /// Scans from the previous round have not finished
    pub const SCANS_PENDING: i32 = 6;
    /// Unhandled failure after global cleanup
    pub const FATAL: i32 = 255;
}
