use super::types::MediaFile;
use crate::config::HttpConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder.build().context("Failed to create HTTP client")
}

/// File extension taken from the last path segment of `media_url`, ignoring the
/// query string. Falls back to `bin` when the path has none.
pub fn extension_from_url(media_url: &str) -> String {
    let path = match url::Url::parse(media_url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => media_url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    Path::new(&path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
        .to_string()
}

pub async fn download_to_memory(
    client: &reqwest::Client,
    media_url: &str,
    filename: String,
) -> Result<MediaFile> {
    debug!("Downloading URL to memory: {}", media_url);

    let response = client
        .get(media_url)
        .send()
        .await
        .context("Failed to fetch media URL")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Failed to download media: HTTP {}",
            response.status()
        ));
    }

    let data = response
        .bytes()
        .await
        .context("Failed to read media data")?
        .to_vec();

    Ok(MediaFile { filename, data })
}

pub async fn write_media_file(output_dir: &Path, file: &MediaFile) -> Result<PathBuf> {
    let path = output_dir.join(&file.filename);
    tokio::fs::write(&path, &file.data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {} bytes to {}", file.data.len(), path.display());
    Ok(path)
}

/// Fetches `media_url` and writes it as `filename` inside `output_dir`.
pub async fn save_media(
    client: &reqwest::Client,
    media_url: &str,
    output_dir: &Path,
    filename: String,
) -> Result<PathBuf> {
    let file = download_to_memory(client, media_url, filename).await?;
    write_media_file(output_dir, &file).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extension_from_url() {
        assert_eq!(
            extension_from_url("https://pbs.twimg.com/media/Abc.jpg?name=orig"),
            "jpg"
        );
        assert_eq!(
            extension_from_url("https://video.twimg.com/ext_tw_video/1/pu/vid/720x1280/clip.mp4?tag=12"),
            "mp4"
        );
        assert_eq!(extension_from_url("https://pbs.twimg.com/media/Abc.png"), "png");
    }

    #[test]
    fn test_extension_ignores_dots_in_host() {
        assert_eq!(extension_from_url("https://pbs.twimg.com/media/noext"), "bin");
        assert_eq!(extension_from_url("https://pbs.twimg.com/"), "bin");
    }

    #[test]
    fn test_extension_from_unparseable_url() {
        assert_eq!(extension_from_url("media/photo.gif?x=1"), "gif");
        assert_eq!(extension_from_url("nothing"), "bin");
    }

    #[test]
    fn test_build_http_client_with_options() {
        let config = HttpConfig {
            timeout_secs: Some(10),
            user_agent: Some("postgrab-test".to_string()),
        };
        assert!(build_http_client(&config).is_ok());
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_save_media_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let written = save_media(
            &client,
            &format!("{}/img.jpg", server.uri()),
            dir.path(),
            "x-1_0.jpg".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(written, dir.path().join("x-1_0.jpg"));
        assert_eq!(std::fs::read(written).unwrap(), b"jpegdata");
    }

    #[tokio::test]
    async fn test_save_media_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let result = save_media(
            &client,
            &format!("{}/gone.jpg", server.uri()),
            dir.path(),
            "x-1_0.jpg".to_string(),
        )
        .await;

        assert!(result.is_err());
        assert!(!dir.path().join("x-1_0.jpg").exists());
    }

    #[tokio::test]
    async fn test_write_media_file_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = MediaFile {
            filename: "yt-a_0.webp".to_string(),
            data: vec![1, 2, 3],
        };
        let result = write_media_file(&dir.path().join("missing"), &file).await;
        assert!(result.is_err());
    }
}
