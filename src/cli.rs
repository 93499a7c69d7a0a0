use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::extract::MIN_REPORT_CHARS;
use crate::model::Quarter;

#[derive(Parser, Debug)]
#[command(
    name = "homeroom",
    version,
    about = "Import pasted school-portal grade and homework pages into a local tracker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Classify(ClassifyArgs),
    Extract(ExtractArgs),
    Import(ImportArgs),
    Batch(BatchArgs),
    Restore(RestoreArgs),
    Export(ExportArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    #[arg(long, default_value = ".cache/homeroom")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

impl StoreArgs {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.cache_root.join("homeroom.sqlite"))
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.cache_root.join("manifests")
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub subject: Option<String>,

    #[arg(long, value_enum, ignore_case = true)]
    pub quarter: Option<Quarter>,

    #[arg(long)]
    pub student_name: Option<String>,

    #[arg(long, default_value_t = MIN_REPORT_CHARS)]
    pub min_chars: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value_t = MIN_REPORT_CHARS)]
    pub min_chars: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub report: ReportArgs,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Quarter::Q3)]
    pub quarter: Quarter,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RestoreArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}
