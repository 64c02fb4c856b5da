use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod batch;
mod config;
mod ledger;
mod media;
#[cfg(test)]
mod testing;

use batch::BatchRunner;
use config::Config;
use media::MediaDownloader;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,
}

fn get_config_path(args: &Args) -> Option<String> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("CONFIG_FILE") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/postgrab/config.toml", xdg_config_home);
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/postgrab/config.toml", home.display());
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

fn load_config(config_path: Option<&str>) -> Result<Config> {
    match config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path)),
        None => Ok(Config::default()),
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = get_config_path(&args);
    let config = load_config(config_path.as_deref())?;
    init_logging(&config);

    info!("Starting postgrab...");
    match &config_path {
        Some(path) => info!("Loaded config from: {}", path),
        None => info!("No config file found, using defaults"),
    }

    let downloader =
        MediaDownloader::from_config(&config).context("Failed to initialize media downloader")?;
    let runner = BatchRunner::new(config.batch.clone(), downloader);

    runner.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_path_wins() {
        let args = Args::parse_from(["postgrab", "--config", "/tmp/custom.toml"]);
        assert_eq!(get_config_path(&args).as_deref(), Some("/tmp/custom.toml"));
    }

    #[test]
    fn test_load_config_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.batch.links_column, "links");
    }

    #[test]
    fn test_load_config_reports_bad_path() {
        let err = load_config(Some("/missing/postgrab.toml")).unwrap_err();
        assert!(err.to_string().contains("/missing/postgrab.toml"));
    }
}
