//! Reddit post link parsing
//!
//! Accepts the link shapes people (and search results) actually produce:
//! - https://www.reddit.com/r/{sub}/comments/{id}/{slug}/
//! - https://www.reddit.com/r/{sub}/comments/{id}/{slug}/{comment}/
//! - https://old.reddit.com/comments/{id}
//! - https://redd.it/{id}

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::error::AppError;

/// A validated link to a single Reddit submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUrl {
    pub id: String,
    /// Canonical path without trailing slash, e.g. `/r/rust/comments/abc123/title`
    pub path: String,
}

fn comments_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<post>(?:/r/[A-Za-z0-9_]+)?/comments/(?P<id>[a-z0-9]+)(?:/[^/]+)?)(?:/[a-z0-9]+)?$",
        )
        .expect("static regex")
    })
}

fn is_base36_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

impl PostUrl {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        let url = Url::parse(trimmed)
            .map_err(|_| invalid(raw, "expected an absolute URL"))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(invalid(raw, "expected an http(s) URL"));
        }

        let host = url.host_str().unwrap_or("").to_ascii_lowercase();
        let path = url.path().trim_end_matches('/');
        let path = path.strip_suffix(".json").unwrap_or(path);

        if host == "redd.it" {
            let id = path.trim_start_matches('/');
            if !is_base36_id(id) {
                return Err(invalid(raw, "short link has no post id"));
            }
            return Ok(PostUrl {
                id: id.to_string(),
                path: format!("/comments/{}", id),
            });
        }

        if host != "reddit.com" && !host.ends_with(".reddit.com") {
            return Err(invalid(raw, "not a reddit.com link"));
        }

        let caps = comments_path_re()
            .captures(path)
            .ok_or_else(|| invalid(raw, "link does not point at a post"))?;

        // A comment permalink still names its post; the comment part is dropped
        Ok(PostUrl {
            id: caps["id"].to_string(),
            path: caps["post"].to_string(),
        })
    }

    /// JSON endpoint for this post relative to an API base such as `https://www.reddit.com`
    pub fn json_endpoint(&self, base_url: &str) -> String {
        format!("{}{}.json", base_url.trim_end_matches('/'), self.path)
    }
}

fn invalid(raw: &str, reason: &str) -> AppError {
    AppError::InvalidInput(format!("Invalid post URL '{}': {}", raw, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_permalink() {
        let url = PostUrl::parse(
            "https://www.reddit.com/r/AskSF/comments/1atv9qp/what_is_currently_the_best_restaurant/",
        )
        .unwrap();
        assert_eq!(url.id, "1atv9qp");
        assert_eq!(url.path, "/r/AskSF/comments/1atv9qp/what_is_currently_the_best_restaurant");
    }

    #[test]
    fn test_parse_strips_query_and_fragment() {
        let url = PostUrl::parse("https://old.reddit.com/r/rust/comments/abc123/?utm_source=share#c").unwrap();
        assert_eq!(url.path, "/r/rust/comments/abc123");
    }

    #[test]
    fn test_parse_without_subreddit_and_json_suffix() {
        let url = PostUrl::parse("https://reddit.com/comments/abc123.json").unwrap();
        assert_eq!(url.id, "abc123");
        assert_eq!(url.path, "/comments/abc123");
    }

    #[test]
    fn test_comment_permalink_resolves_to_post() {
        let url = PostUrl::parse("https://www.reddit.com/r/rust/comments/abc123/hello/kx9f2d1/?context=3").unwrap();
        assert_eq!(url.id, "abc123");
        assert_eq!(url.path, "/r/rust/comments/abc123/hello");

        let url = PostUrl::parse("https://www.reddit.com/r/rust/comments/abc123/hello").unwrap();
        assert_eq!(url.path, "/r/rust/comments/abc123/hello");
    }

    #[test]
    fn test_parse_short_link() {
        let url = PostUrl::parse("https://redd.it/1atv9qp").unwrap();
        assert_eq!(url.path, "/comments/1atv9qp");
    }

    #[test]
    fn test_rejects_invalid_links() {
        for raw in [
            "",
            "not a url",
            "/r/rust/comments/abc123",
            "ftp://www.reddit.com/r/rust/comments/abc123",
            "https://example.com/r/rust/comments/abc123",
            "https://notreddit.com/r/rust/comments/abc123",
            "https://www.reddit.com/r/rust/",
            "https://www.reddit.com/r/rust/comments/",
            "https://www.reddit.com/r/rust/comments/ABC!/x",
            "https://www.reddit.com/user/someone",
            "https://redd.it/",
        ] {
            let err = PostUrl::parse(raw).unwrap_err();
            assert_eq!(err.error_code(), "invalid_input", "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_json_endpoint() {
        let url = PostUrl::parse("https://www.reddit.com/r/rust/comments/abc123/hello/").unwrap();
        assert_eq!(
            url.json_endpoint("http://127.0.0.1:4000/"),
            "http://127.0.0.1:4000/r/rust/comments/abc123/hello.json"
        );
    }
}
