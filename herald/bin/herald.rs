use std::path::PathBuf;

use clap::Parser;

/// Resumable, rate-limited campaign dispatcher.
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    ///
    /// When omitted, the `HERALD_CONFIG` environment variable is
    /// consulted, then `./herald.config.toml`, then
    /// `/etc/herald/herald.config.toml`.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    herald_common::logging::init();

    let config_path = match cli.config {
        Some(path) => path,
        None => find_config_file()?,
    };
    let config = herald::Config::load(&config_path)?;

    herald::serve(config).await?;

    Ok(())
}

/// Find the configuration file using the following precedence:
/// 1. `HERALD_CONFIG` environment variable
/// 2. ./herald.config.toml (current working directory)
/// 3. /etc/herald/herald.config.toml (system-wide config)
fn find_config_file() -> anyhow::Result<PathBuf> {
    if let Ok(env_path) = std::env::var("HERALD_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!(
            "HERALD_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = [
        PathBuf::from("./herald.config.toml"),
        PathBuf::from("/etc/herald/herald.config.toml"),
    ];

    for path in &default_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let paths_tried = default_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    anyhow::bail!(
        "No configuration file found. Tried:\n  - HERALD_CONFIG environment variable\n{paths_tried}"
    )
}
