use super::{fetcher::MediaFetcher, types::PostRef, utils::save_media};
use crate::config::YoutubeConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

const IMAGE_EXT: &str = "webp";

/// Renders YouTube community posts in a headless Chromium and downloads the
/// full-resolution versions of their images.
pub struct YoutubePostFetcher {
    client: reqwest::Client,
    config: YoutubeConfig,
    output_dir: PathBuf,
}

impl YoutubePostFetcher {
    pub fn new(client: reqwest::Client, config: YoutubeConfig, output_dir: PathBuf) -> Self {
        Self {
            client,
            config,
            output_dir,
        }
    }

    /// Rewrites a rendered image source to request the original resolution.
    /// Returns `None` for sources that are not `https` or carry no size marker.
    fn original_size_url(&self, src: &str) -> Option<String> {
        let is_secure = url::Url::parse(src)
            .map(|parsed| parsed.scheme() == "https")
            .unwrap_or(false);

        if !is_secure || !src.contains(&self.config.size_marker) {
            return None;
        }

        Some(src.replace(&self.config.size_marker, &self.config.original_size_marker))
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();

        // chromiumoxide runs headless unless a head is requested
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .build()
            .map_err(|e| anyhow!("Failed to build browser config: {e}"))
    }

    /// Launches a browser for this one page and returns every `img` source
    /// found after the settle period. The browser is closed on every path out.
    async fn rendered_image_sources(&self, url: &str) -> Result<Vec<String>> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .context("Failed to launch browser")?;

        let page_url = url.to_string();
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("[URL: {}] browser event error: {}", page_url, e);
                }
            }
        });

        let sources = self.collect_image_sources(&browser, url).await;

        if let Err(e) = browser.close().await {
            warn!("[URL: {}] Failed to close browser: {}", url, e);
        }
        if let Err(e) = browser.wait().await {
            warn!("[URL: {}] Failed to wait for browser exit: {}", url, e);
        }
        handler_task.abort();

        sources
    }

    async fn collect_image_sources(&self, browser: &Browser, url: &str) -> Result<Vec<String>> {
        let page = browser
            .new_page(url)
            .await
            .with_context(|| format!("Failed to load {url}"))?;

        tokio::time::sleep(self.config.settle()).await;

        let images = page
            .find_elements("img")
            .await
            .context("Failed to query image elements")?;
        debug!("[URL: {}] Found {} image elements", url, images.len());

        let mut sources = Vec::new();
        for image in images {
            match image.attribute("src").await {
                Ok(Some(src)) => sources.push(src),
                Ok(None) => {}
                Err(e) => error!("[URL: {}] Error reading YT image source: {}", url, e),
            }
        }

        Ok(sources)
    }

    /// Saves the original-size version of every eligible rendered source.
    /// Sources without the size marker or an `https` URL are skipped silently.
    async fn save_sources(&self, post: &PostRef, sources: &[String]) -> usize {
        let media_urls: Vec<String> = sources
            .iter()
            .filter_map(|src| self.original_size_url(src))
            .collect();
        self.save_media_urls(post, &media_urls).await
    }

    async fn save_media_urls(&self, post: &PostRef, media_urls: &[String]) -> usize {
        let mut download_count = 0;
        for media_url in media_urls {
            let filename = post.media_filename(download_count, IMAGE_EXT);
            match save_media(&self.client, media_url, &self.output_dir, filename).await {
                Ok(_) => download_count += 1,
                Err(e) => error!(
                    "[URL: {}] Error downloading YT image {}: {:#}",
                    post.url, media_url, e
                ),
            }
        }

        if download_count > 0 {
            info!(
                "[URL: {}] {} image(s) saved to {}",
                post.url,
                download_count,
                self.output_dir.display()
            );
        }

        download_count
    }
}

#[async_trait]
impl MediaFetcher for YoutubePostFetcher {
    fn name(&self) -> &'static str {
        "youtube_post"
    }

    async fn fetch(&self, post: &PostRef) -> usize {
        let sources = match self.rendered_image_sources(&post.url).await {
            Ok(sources) => sources,
            Err(e) => {
                error!("[URL: {}] Failed to render post: {:#}", post.url, e);
                return 0;
            }
        };

        self.save_sources(post, &sources).await
    }
}
