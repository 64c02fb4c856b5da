use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub batch: BatchConfig,
    pub http: HttpConfig,
    pub twitter: TwitterConfig,
    pub youtube: YoutubeConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BatchConfig {
    /// Tab-separated input table
    pub input_file: PathBuf,
    /// Column holding the post URLs
    pub links_column: String,
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("data.csv"),
            links_column: "links".to_string(),
            output_dir: PathBuf::from("./media"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HttpConfig {
    /// Unset means requests never time out
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TwitterConfig {
    /// Scheme and host of the fxtwitter-compatible metadata mirror
    pub api_base: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.fxtwitter.com".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Time given to the page's client-side rendering before images are read
    pub settle_secs: u64,
    pub size_marker: String,
    pub original_size_marker: String,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            settle_secs: 5,
            size_marker: "=s1024".to_string(),
            original_size_marker: "=s0".to_string(),
            headless: true,
            chrome_path: None,
        }
    }
}

impl YoutubeConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }
}
