//! Best-effort video metadata from YouTube's oEmbed endpoint.

use super::youtube::{extract_video_id, thumbnail_url};
use super::{MetadataSource, VideoMetadata};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
}

/// Metadata source backed by `https://www.youtube.com/oembed`.
pub struct OEmbedMetadata {
    client: reqwest::Client,
}

impl OEmbedMetadata {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    fn endpoint(video_url: &str) -> Option<Url> {
        Url::parse_with_params(OEMBED_ENDPOINT, &[("url", video_url), ("format", "json")]).ok()
    }

    async fn fetch(&self, video_url: &str) -> Option<OEmbedResponse> {
        let endpoint = Self::endpoint(video_url)?;
        let response = self.client.get(endpoint).send().await.ok()?;
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "oEmbed lookup failed");
            return None;
        }
        response.json().await.ok()
    }
}

fn into_metadata(video_id: &str, response: OEmbedResponse) -> VideoMetadata {
    VideoMetadata {
        thumbnail: Some(thumbnail_url(video_id)),
        title: Some(response.title.unwrap_or_else(|| "Unknown Title".to_string())),
        channel_name: Some(
            response
                .author_name
                .unwrap_or_else(|| "Unknown Channel".to_string()),
        ),
    }
}

#[async_trait]
impl MetadataSource for OEmbedMetadata {
    async fn video_metadata(&self, video_url: &str) -> VideoMetadata {
        let Some(video_id) = extract_video_id(video_url) else {
            return VideoMetadata::default();
        };

        match self.fetch(video_url).await {
            Some(response) => into_metadata(&video_id, response),
            None => {
                warn!("Could not extract video metadata for {}", video_url);
                VideoMetadata::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_url() {
        let endpoint =
            OEmbedMetadata::endpoint("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1").unwrap();
        let pairs: Vec<(String, String)> = endpoint
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs[0],
            (
                "url".to_string(),
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1".to_string()
            )
        );
        assert_eq!(pairs[1], ("format".to_string(), "json".to_string()));
    }

    #[test]
    fn test_missing_fields_get_placeholders() {
        let response: OEmbedResponse = serde_json::from_str(r#"{"type":"video"}"#).unwrap();
        let metadata = into_metadata("dQw4w9WgXcQ", response);
        assert_eq!(metadata.title.as_deref(), Some("Unknown Title"));
        assert_eq!(metadata.channel_name.as_deref(), Some("Unknown Channel"));
        assert_eq!(
            metadata.thumbnail.as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
    }

    #[tokio::test]
    async fn test_no_video_id_yields_empty_metadata() {
        let source = OEmbedMetadata::new(Duration::from_secs(1));
        let metadata = source.video_metadata("not-a-video-url").await;
        assert_eq!(metadata, VideoMetadata::default());
    }
}
