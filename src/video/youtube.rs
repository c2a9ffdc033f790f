//! YouTube URL helpers.

use regex::Regex;
use std::sync::OnceLock;

fn domain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+").expect("valid regex")
    })
}

fn video_id_regexes() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            // watch?v=ID, /embed/ID, /v/ID
            r"(?:v=|/)([\w-]{11})(?:[?&/]|$)",
            // youtu.be/ID
            r"youtu\.be/([\w-]{11})(?:[?&]|$)",
            // /shorts/ID
            r"/shorts/([\w-]{11})(?:[?&]|$)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

/// Whether `url` points at a YouTube domain.
pub fn is_valid_youtube_url(url: &str) -> bool {
    domain_regex().is_match(url.trim())
}

/// Extract the 11-character video ID from a YouTube URL, if the URL has one.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    video_id_regexes()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Canonical watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// High-quality thumbnail URL for a video ID.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s", Some("dQw4w9WgXcQ")),
            ("https://youtu.be/dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://youtu.be/dQw4w9WgXcQ?si=abc", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/shorts/abcdefghijk", Some("abcdefghijk")),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("not-a-video-url", None),
            ("https://www.youtube.com/@somechannel", None),
        ];

        for (url, expected) in cases {
            assert_eq!(extract_video_id(url).as_deref(), expected, "url: {}", url);
        }
    }

    #[test]
    fn test_is_valid_youtube_url() {
        assert!(is_valid_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_valid_youtube_url("youtube.com/shorts/abcdefghijk"));
        assert!(is_valid_youtube_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(!is_valid_youtube_url("https://vimeo.com/12345"));
        assert!(!is_valid_youtube_url("not-a-video-url"));
        assert!(!is_valid_youtube_url("https://youtube.com/"));
    }

    #[test]
    fn test_derived_urls() {
        assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
        assert_eq!(thumbnail_url("abc"), "https://img.youtube.com/vi/abc/hqdefault.jpg");
    }
}
