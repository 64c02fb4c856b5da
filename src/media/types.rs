use std::fmt;

const TWITTER_MARKER: &str = "x.com";
const YOUTUBE_POST_MARKER: &str = "youtube.com/post";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Twitter,
    YoutubePost,
    Unknown,
}

impl Platform {
    /// Prefix shared by post ids and output filenames
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Platform::Twitter => "x-",
            Platform::YoutubePost => "yt-",
            Platform::Unknown => "",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::YoutubePost => "youtube_post",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post URL together with the platform and id derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    pub url: String,
    pub platform: Platform,
    pub post_id: String,
}

impl PostRef {
    /// Classifies a URL by substring match. The post id is the platform prefix
    /// followed by everything after the last `/`, query string included.
    pub fn classify(url: &str) -> Self {
        let platform = if url.contains(TWITTER_MARKER) {
            Platform::Twitter
        } else if url.contains(YOUTUBE_POST_MARKER) {
            Platform::YoutubePost
        } else {
            Platform::Unknown
        };

        let post_id = match platform {
            Platform::Unknown => String::new(),
            _ => format!("{}{}", platform.id_prefix(), last_segment(url)),
        };

        Self {
            url: url.to_string(),
            platform,
            post_id,
        }
    }

    pub fn is_known(&self) -> bool {
        self.platform != Platform::Unknown
    }

    /// Output filename for the `index`-th media item of this post.
    pub fn media_filename(&self, index: usize, ext: &str) -> String {
        format!("{}_{}.{}", self.post_id, index, ext)
    }
}

fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[derive(Debug)]
pub struct MediaFile {
    pub filename: String,
    pub data: Vec<u8>,
}
