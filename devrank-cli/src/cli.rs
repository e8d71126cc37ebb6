use clap::{Parser, Subcommand, ValueEnum};
use devrank_core::UploadTrigger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "devrank",
    about = "Device leaderboard scoring and submission pipeline",
    version = env!("CARGO_PKG_VERSION"),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(long, global = true, env = "DEVRANK_DATA_DIR", help = "Directory for config and local state")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Normalize raw device identifiers")]
    Normalize {
        #[arg(long)]
        model: String,
        #[arg(long, default_value = "")]
        brand: String,
        #[arg(long, default_value = "")]
        manufacturer: String,
        #[arg(long, default_value = "")]
        fingerprint: String,
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Score every category of a metric snapshot")]
    Score {
        #[arg(help = "Path to a MetricSnapshot JSON file")]
        snapshot: PathBuf,
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Run one upload pass against a metric snapshot")]
    Upload {
        #[arg(long, help = "Path to a MetricSnapshot JSON file")]
        snapshot: PathBuf,
        #[arg(long, help = "Path to a device context JSON file")]
        device: PathBuf,
        #[arg(long, value_enum, default_value_t = TriggerArg::Force)]
        trigger: TriggerArg,
        #[arg(
            long,
            help = "Local entries file used when no remote store is configured [default: <data-dir>/entries.json]"
        )]
        entries: Option<PathBuf>,
    },

    #[command(about = "Show the best devices per category")]
    Rank {
        #[arg(long, help = "Local entries file; the configured remote store otherwise")]
        entries: Option<PathBuf>,
        #[arg(short, long, help = "Single category (e.g. thermal_efficiency)")]
        category: Option<String>,
        #[arg(short, long, help = "Devices per category [default: from config]")]
        top: Option<usize>,
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Summarize one device across categories")]
    Insight {
        #[arg(help = "Normalized device id (e.g. samsung_sm_s918)")]
        device_id: String,
        #[arg(long, help = "Local entries file; the configured remote store otherwise")]
        entries: Option<PathBuf>,
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(subcommand, about = "View and initialize configuration")]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the effective configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "Write the default configuration if none exists")]
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TriggerArg {
    HealthScan,
    PowerTest,
    CpuTest,
    CameraTest,
    DisplayTest,
    AppStart,
    DailyBackground,
    Force,
}

impl From<TriggerArg> for UploadTrigger {
    fn from(arg: TriggerArg) -> Self {
        match arg {
            TriggerArg::HealthScan => UploadTrigger::HealthScan,
            TriggerArg::PowerTest => UploadTrigger::PowerTest,
            TriggerArg::CpuTest => UploadTrigger::CpuTest,
            TriggerArg::CameraTest => UploadTrigger::CameraTest,
            TriggerArg::DisplayTest => UploadTrigger::DisplayTest,
            TriggerArg::AppStart => UploadTrigger::AppStart,
            TriggerArg::DailyBackground => UploadTrigger::DailyBackground,
            TriggerArg::Force => UploadTrigger::Force,
        }
    }
}
