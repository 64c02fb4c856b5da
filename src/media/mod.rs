mod fetcher;
mod twitter;
mod types;
mod utils;
mod youtube;

pub use fetcher::MediaFetcher;
pub use twitter::TwitterFetcher;
pub use types::{Platform, PostRef};
pub use youtube::YoutubePostFetcher;

use crate::config::Config;
use anyhow::Result;
use tracing::{debug, info};

/// One fetcher per supported platform.
pub struct MediaDownloader {
    twitter: Box<dyn MediaFetcher>,
    youtube_post: Box<dyn MediaFetcher>,
}

impl MediaDownloader {
    pub fn new(twitter: Box<dyn MediaFetcher>, youtube_post: Box<dyn MediaFetcher>) -> Self {
        Self {
            twitter,
            youtube_post,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = utils::build_http_client(&config.http)?;
        let output_dir = config.batch.output_dir.clone();

        info!(
            "Media downloader initialized - mirror {}, output {}",
            config.twitter.api_base,
            output_dir.display()
        );

        Ok(Self::new(
            Box::new(TwitterFetcher::new(
                client.clone(),
                &config.twitter.api_base,
                output_dir.clone(),
            )),
            Box::new(YoutubePostFetcher::new(
                client,
                config.youtube.clone(),
                output_dir,
            )),
        ))
    }

    /// Fetcher for a platform; `None` for unknown posts.
    pub fn fetcher_for(&self, platform: Platform) -> Option<&dyn MediaFetcher> {
        match platform {
            Platform::Twitter => Some(self.twitter.as_ref()),
            Platform::YoutubePost => Some(self.youtube_post.as_ref()),
            Platform::Unknown => None,
        }
    }

    /// Downloads the media of a classified post. Unknown posts are never
    /// handed to a fetcher and count as zero.
    pub async fn download(&self, post: &PostRef) -> usize {
        match self.fetcher_for(post.platform) {
            Some(fetcher) => {
                debug!("[URL: {}] Fetching with {}", post.url, fetcher.name());
                fetcher.fetch(post).await
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let downloader = MediaDownloader::from_config(&Config::default()).unwrap();
        assert_eq!(
            downloader.fetcher_for(Platform::Twitter).unwrap().name(),
            "twitter"
        );
        assert_eq!(
            downloader.fetcher_for(Platform::YoutubePost).unwrap().name(),
            "youtube_post"
        );
        assert!(downloader.fetcher_for(Platform::Unknown).is_none());
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_dispatched() {
        let downloader = MediaDownloader::from_config(&Config::default()).unwrap();
        let post = PostRef::classify("https://example.com/post/1");
        assert_eq!(downloader.download(&post).await, 0);
    }
}
