use once_cell::sync::Lazy;
use regex::Regex;

// Scheme and www. are optional, the id is exactly 11 ASCII characters and may
// only be followed by further query or fragment content. Case folding is
// ASCII-only so the long s and the Kelvin sign do not pass for `s` and `k`.
static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i-u)^(https?://)?(www\.)?(youtube\.com/(watch\?v=|shorts/|live/)|youtu\.be/)[a-z0-9_-]{11}([&#?](?u:.*))?$",
    )
    .expect("YouTube URL pattern is valid")
});

/// Returns true when `input` looks like a link to a single YouTube video.
pub fn is_youtube_url(input: &str) -> bool {
    YOUTUBE_URL.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_path_form() {
        for prefix in [
            "https://www.youtube.com/watch?v=",
            "http://www.youtube.com/watch?v=",
            "www.youtube.com/watch?v=",
            "youtube.com/watch?v=",
            "https://youtube.com/shorts/",
            "youtube.com/live/",
            "https://www.youtube.com/live/",
            "https://youtu.be/",
            "youtu.be/",
        ] {
            let url = format!("{prefix}dQw4w9WgXcQ");
            assert!(is_youtube_url(&url), "{url} should be accepted");
        }
    }

    #[test]
    fn accepts_trailing_query_and_fragment() {
        assert!(is_youtube_url(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123&index=2"
        ));
        assert!(is_youtube_url("https://youtu.be/dQw4w9WgXcQ?t=42"));
        assert!(is_youtube_url("https://www.youtube.com/live/dQw4w9WgXcQ#chat"));
        assert!(is_youtube_url("youtube.com/shorts/a-b_c-d_e-f?feature=share"));
    }

    #[test]
    fn ignores_case() {
        assert!(is_youtube_url("HTTPS://WWW.YOUTUBE.COM/WATCH?V=DQW4W9WGXCQ"));
        assert!(is_youtube_url("Https://Youtu.Be/dQw4w9WgXcQ"));
    }

    #[test]
    fn rejects_wrong_id_length() {
        assert!(!is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXc"));
        assert!(!is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQQ"));
        assert!(!is_youtube_url("https://youtu.be/short"));
    }

    #[test]
    fn rejects_other_hosts_and_garbage() {
        assert!(!is_youtube_url(""));
        assert!(!is_youtube_url("dQw4w9WgXcQ"));
        assert!(!is_youtube_url("https://vimeo.com/watch?v=dQw4w9WgXcQ"));
        assert!(!is_youtube_url("https://m.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(!is_youtube_url("https://www.youtube.com/embed/dQw4w9WgXcQ"));
        assert!(!is_youtube_url("ftp://youtu.be/dQw4w9WgXcQ"));
        assert!(!is_youtube_url(" https://youtu.be/dQw4w9WgXcQ"));
    }

    #[test]
    fn rejects_non_ascii_id_characters() {
        assert!(!is_youtube_url("https://youtu.be/dQw4w9WgXcé"));
        assert!(!is_youtube_url("https://youtu.be/dQw4w9WgXc\u{017F}"));
        assert!(!is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXc\u{212A}"));
        assert!(!is_youtube_url("https://youtu.be/\u{212A}Qw4w9WgXcQ"));
        assert!(!is_youtube_url("http\u{017F}://youtu.be/dQw4w9WgXcQ"));
        assert!(is_youtube_url("https://youtu.be/dQw4w9WgXcQ?t=\u{212A}"));
    }
}
