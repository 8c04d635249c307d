use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(name = "tusk", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Upload a file, resuming a previous attempt when possible.
    #[command(alias = "up", name = "upload")]
    Upload(UploadArgs),
    /// List stored upload URLs.
    #[command(alias = "ls", name = "list")]
    List,
    /// Forget every stored upload URL.
    #[command(name = "clear")]
    Clear,
    /// Write the effective configuration to the config file.
    #[command(name = "init")]
    Init,
}

#[derive(Clone, Debug, Args)]
pub struct UploadArgs {
    /// File to upload.
    pub file: PathBuf,

    /// Creation endpoint.
    #[arg(long, short)]
    pub endpoint: Option<String>,

    /// Maximum bytes per PATCH request.
    #[arg(long, short)]
    pub chunk_size: Option<u64>,

    /// Resume this upload URL instead of looking one up.
    #[arg(long)]
    pub upload_url: Option<String>,

    /// Metadata entry as KEY=VALUE (repeatable). `filename` defaults to the file name.
    #[arg(long = "meta", short, value_parser = parse_key_value::<'='>)]
    pub metadata: Vec<(String, String)>,

    /// Extra header as NAME:VALUE (repeatable).
    #[arg(long = "header", short = 'H', value_parser = parse_key_value::<':'>)]
    pub headers: Vec<(String, String)>,

    /// Do not read or record upload URLs.
    #[arg(long)]
    pub no_resume: bool,

    /// Forget the stored URL once the upload completes.
    #[arg(long)]
    pub forget_on_success: bool,

    /// Declare the upload length on the first PATCH instead of at creation.
    #[arg(long)]
    pub defer_length: bool,

    /// Send chunks as POST with `X-HTTP-Method-Override: PATCH`.
    #[arg(long)]
    pub override_patch: bool,
}

fn parse_key_value<const SEP: char>(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once(SEP)
        .ok_or_else(|| format!("expected KEY{SEP}VALUE, got {s:?}"))?;
    let k = k.trim();
    if k.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((k.to_string(), v.trim().to_string()))
}
