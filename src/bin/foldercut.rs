use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "foldercut",
    version,
    about = "Assemble a folder tree of media into an editor-ready xmeml timeline"
)]
struct Cli {
    /// Collection root folder (defaults to the current directory).
    root: Option<PathBuf>,

    /// Timeline frame rate in frames per second.
    #[arg(long, default_value_t = 50)]
    fps: u32,

    /// Clip label, overriding reference-document detection.
    #[arg(long)]
    label: Option<String>,

    /// Marker color, overriding reference-document detection.
    #[arg(long)]
    marker_color: Option<String>,

    /// JSON file replacing the built-in scale/center lookup table.
    #[arg(long)]
    motion_policy: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let root = match cli.root {
        Some(path) => path,
        None => std::env::current_dir().context("resolve current directory")?,
    };

    let mut options = foldercut::ExportOptions::default();
    options.build.fps = foldercut::Fps::new(cli.fps, 1)?;
    options.label_override = cli.label;
    options.marker_color_override = cli.marker_color;
    if let Some(path) = cli.motion_policy {
        options.policy = foldercut::MotionPolicy::from_json_file(&path)?;
    }

    let saved = foldercut::export_collection(&root, &options)?;
    println!("XML file saved to {}", saved.display());
    Ok(())
}
