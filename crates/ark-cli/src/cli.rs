use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ark", about = "ark: artifact resolution kit", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file; `ARK_*` variables override it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PackCompression {
    None,
    Gzip,
    Zstd,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the artifacts an archive, directory or file contributes
    List(ListArgs),
    /// Resolve a symbolic name through the default resolver chain
    Resolve(ResolveArgs),
    /// Print a resource to stdout
    Cat(CatArgs),
    /// Build a deterministic archive from a directory tree
    Pack(PackArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Paths or URLs to ingest
    #[arg(required = true)]
    pub sources: Vec<String>,
}

#[derive(Args)]
pub struct ResolveArgs {
    pub name: String,
    /// Paths or URLs to ingest first
    #[arg(long = "from")]
    pub sources: Vec<String>,
    /// Also print the locator of the definition
    #[arg(long)]
    pub locator: bool,
}

#[derive(Args)]
pub struct CatArgs {
    /// Resource path, e.g. `conf/app.xml`
    pub path: String,
    #[arg(long = "from")]
    pub sources: Vec<String>,
}

#[derive(Args)]
pub struct PackArgs {
    pub dir: PathBuf,
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(long, default_value = "gzip")]
    pub compression: PackCompression,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Print a single key, e.g. `chain.local.priority`
    pub key: Option<String>,
}
