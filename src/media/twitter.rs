use super::{
    fetcher::MediaFetcher,
    types::PostRef,
    utils::{extension_from_url, save_media},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, error, info};

const SUCCESS_CODE: u16 = 200;

#[derive(Debug, Deserialize)]
struct TweetResponse {
    code: Option<u16>,
    message: Option<String>,
    tweet: Option<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    media: Option<TweetMedia>,
}

#[derive(Debug, Deserialize)]
struct TweetMedia {
    #[serde(default)]
    all: Vec<MediaEntry>,
}

#[derive(Debug, Deserialize)]
struct MediaEntry {
    url: Option<String>,
}

/// Resolves tweets through an fxtwitter-compatible mirror and downloads every
/// attached media item.
pub struct TwitterFetcher {
    client: reqwest::Client,
    api_base: String,
    output_dir: PathBuf,
}

impl TwitterFetcher {
    pub fn new(client: reqwest::Client, api_base: &str, output_dir: PathBuf) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            output_dir,
        }
    }

    /// Mirror URL for a post: the post's host is swapped for the mirror, the
    /// path is kept.
    fn api_url(&self, post_url: &str) -> Result<String> {
        let parsed = url::Url::parse(post_url)
            .with_context(|| format!("Invalid post URL: {post_url}"))?;
        Ok(format!("{}{}", self.api_base, parsed.path()))
    }

    async fn resolve(&self, post_url: &str) -> Result<TweetResponse> {
        let api_url = self.api_url(post_url)?;
        debug!("Resolving tweet metadata via {}", api_url);

        self.client
            .get(&api_url)
            .send()
            .await
            .context("Failed to reach metadata mirror")?
            .json::<TweetResponse>()
            .await
            .context("Failed to parse metadata response")
    }
}

#[async_trait]
impl MediaFetcher for TwitterFetcher {
    fn name(&self) -> &'static str {
        "twitter"
    }

    async fn fetch(&self, post: &PostRef) -> usize {
        let response = match self.resolve(&post.url).await {
            Ok(response) => response,
            Err(e) => {
                error!("[URL: {}] Metadata lookup failed: {:#}", post.url, e);
                return 0;
            }
        };

        if response.code != Some(SUCCESS_CODE) {
            error!(
                "[URL: {}] {} seems not working: code={:?} message={}",
                post.url,
                self.api_base,
                response.code,
                response.message.as_deref().unwrap_or("none")
            );
            return 0;
        }

        let entries = response
            .tweet
            .and_then(|tweet| tweet.media)
            .map(|media| media.all)
            .unwrap_or_default();

        let mut download_count = 0;
        for entry in entries {
            let Some(media_url) = entry.url else {
                error!("[URL: {}] Media entry without URL", post.url);
                continue;
            };

            let filename = post.media_filename(download_count, &extension_from_url(&media_url));
            match save_media(&self.client, &media_url, &self.output_dir, filename).await {
                Ok(_) => download_count += 1,
                Err(e) => error!(
                    "[URL: {}] Error downloading Twitter media {}: {:#}",
                    post.url, media_url, e
                ),
            }
        }

        if download_count > 0 {
            info!(
                "[URL: {}] {} media file(s) saved to {}",
                post.url,
                download_count,
                self.output_dir.display()
            );
        }

        download_count
    }
}
