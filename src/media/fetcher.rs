use super::types::PostRef;
use async_trait::async_trait;

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Human-readable name of the fetcher
    fn name(&self) -> &'static str;

    /// Download every media item of `post` into the output directory.
    ///
    /// Returns the number of files written. Failures are logged and never
    /// escape: a post that cannot be fetched at all counts as zero.
    async fn fetch(&self, post: &PostRef) -> usize;
}
