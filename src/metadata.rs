//! Video preview data from YouTube's public oEmbed endpoint.

use std::time::Duration;

use url::Url;

use crate::errors::DownloadError;
use crate::http::HttpClient;
use crate::models::VideoMetadata;

pub const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

const OEMBED_TIMEOUT: Duration = Duration::from_secs(15);

pub fn oembed_url(reference: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(OEMBED_ENDPOINT, &[("url", reference), ("format", "json")])
}

/// Fetches title, author and thumbnail for an already validated reference.
pub fn fetch_metadata(
    client: &dyn HttpClient,
    reference: &str,
) -> Result<VideoMetadata, DownloadError> {
    let url = oembed_url(reference)
        .map_err(|e| DownloadError::MetadataUnavailable(e.to_string()))?;
    log::debug!("Fetching oEmbed metadata from {}", url);

    let response = client
        .get(&url, Some(OEMBED_TIMEOUT))
        .map_err(|e| DownloadError::MetadataUnavailable(e.to_string()))?;
    if !response.is_success() {
        return Err(DownloadError::MetadataUnavailable(response.status.to_string()));
    }

    let metadata: VideoMetadata = response
        .json()
        .map_err(|e| DownloadError::MetadataUnavailable(format!("unexpected response: {e}")))?;
    log::info!("Loaded metadata for \"{}\" by {}", metadata.title, metadata.author_name);
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeClient;
    use crate::http::TransportError;

    const VIDEO: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    const OEMBED: &str = "https://www.youtube.com/oembed?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3DdQw4w9WgXcQ&format=json";
    const BODY: &str = r#"{
        "title": "Never Gonna Give You Up",
        "author_name": "Rick Astley",
        "author_url": "https://www.youtube.com/@RickAstleyYT",
        "type": "video",
        "thumbnail_url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
        "thumbnail_width": 480,
        "thumbnail_height": 360
    }"#;

    #[test]
    fn reference_is_form_encoded() {
        assert_eq!(oembed_url(VIDEO).unwrap().as_str(), OEMBED);
    }

    #[test]
    fn parses_a_successful_response() {
        let client = FakeClient::new().on_get(OEMBED, 200, BODY);
        let metadata = fetch_metadata(&client, VIDEO).unwrap();
        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.author_name, "Rick Astley");
        assert_eq!(metadata.thumbnail_width, Some(480));
        assert_eq!(metadata.thumbnail_height, Some(360));
        assert_eq!(client.count("GET", OEMBED), 1);
    }

    #[test]
    fn same_response_gives_same_metadata() {
        let client = FakeClient::new().on_get(OEMBED, 200, BODY);
        let first = fetch_metadata(&client, VIDEO).unwrap();
        let second = fetch_metadata(&client, VIDEO).unwrap();
        assert_eq!(first, second);
        assert_eq!(client.count("GET", OEMBED), 2);
    }

    #[test]
    fn error_status_is_unavailable() {
        let client = FakeClient::new().on_get(OEMBED, 401, "Unauthorized");
        let err = fetch_metadata(&client, VIDEO).unwrap_err();
        assert_eq!(err, DownloadError::MetadataUnavailable("401 Unauthorized".to_string()));
    }

    #[test]
    fn unexpected_body_is_unavailable() {
        let client = FakeClient::new().on_get(OEMBED, 200, r#"{"title": 3}"#);
        assert!(matches!(
            fetch_metadata(&client, VIDEO),
            Err(DownloadError::MetadataUnavailable(_))
        ));
    }

    #[test]
    fn network_failure_is_unavailable() {
        let client = FakeClient::new().on_get_error(OEMBED, TransportError::Timeout);
        assert_eq!(
            fetch_metadata(&client, VIDEO),
            Err(DownloadError::MetadataUnavailable("request timed out".to_string()))
        );
    }
}
