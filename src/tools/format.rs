//! Markdown rendering for CLI output

use chrono::{DateTime, Utc};

use crate::reddit::{CommentSummary, PostSummary};

const BODY_PREVIEW_CHARS: usize = 600;

fn format_created(created_utc: Option<f64>) -> Option<String> {
    let secs = created_utc?;
    DateTime::<Utc>::from_timestamp(secs as i64, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Quote every line so post text can't be mistaken for document structure
fn blockquote(text: &str) -> String {
    text.lines()
        .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}

pub fn posts_to_markdown(query: &str, posts: &[PostSummary]) -> String {
    let mut markdown = format!("# Reddit search · \"{}\" · {} posts\n\n", query, posts.len());

    if posts.is_empty() {
        markdown.push_str("No posts matched.\n");
        return markdown;
    }

    for (i, post) in posts.iter().enumerate() {
        markdown.push_str(&format!("{}. **{}**\n", i + 1, post.title));
        let mut meta = format!("   r/{} · ⬆ {} · 💬 {}", post.subreddit, post.score, post.num_comments);
        if let Some(date) = format_created(post.created_utc) {
            meta.push_str(&format!(" · {}", date));
        }
        markdown.push_str(&meta);
        markdown.push('\n');
        markdown.push_str(&format!("   {}\n\n", post.url));
    }

    markdown
}

pub fn comments_to_markdown(post_url: &str, comments: &[CommentSummary]) -> String {
    let mut markdown = format!("# Top comments · {} comments\n{}\n\n", comments.len(), post_url);

    if comments.is_empty() {
        markdown.push_str("No comments yet.\n");
        return markdown;
    }

    for comment in comments {
        markdown.push_str(&format!("u/{} · ⬆ {}\n", comment.author, comment.score));
        markdown.push_str(&blockquote(&truncate_chars(&comment.body, BODY_PREVIEW_CHARS)));
        markdown.push_str("\n\n");
    }

    markdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, created: Option<f64>) -> PostSummary {
        PostSummary {
            title: title.to_string(),
            subreddit: "FoodNYC".to_string(),
            url: "https://www.reddit.com/r/FoodNYC/comments/abc123/x/".to_string(),
            score: 120,
            num_comments: 45,
            created_utc: created,
        }
    }

    #[test]
    fn test_posts_markdown() {
        let markdown = posts_to_markdown("pizza", &[post("Joe's vs Prince St", Some(1_700_000_000.0))]);
        assert!(markdown.starts_with("# Reddit search · \"pizza\" · 1 posts"));
        assert!(markdown.contains("1. **Joe's vs Prince St**"));
        assert!(markdown.contains("r/FoodNYC · ⬆ 120 · 💬 45 · 2023-11-14"));
        assert!(markdown.contains("https://www.reddit.com/r/FoodNYC/comments/abc123/x/"));
    }

    #[test]
    fn test_empty_posts_markdown() {
        let markdown = posts_to_markdown("zzz", &[]);
        assert!(markdown.contains("0 posts"));
        assert!(markdown.contains("No posts matched."));
    }

    #[test]
    fn test_comment_bodies_are_quoted() {
        let comments = vec![CommentSummary {
            author: "slice_fan".to_string(),
            body: "# not a header\n\nsecond paragraph".to_string(),
            score: 88,
        }];
        let markdown = comments_to_markdown("https://redd.it/abc123", &comments);
        assert!(markdown.contains("u/slice_fan · ⬆ 88"));
        assert!(markdown.contains("> # not a header\n>\n> second paragraph"));
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "x".repeat(BODY_PREVIEW_CHARS + 50);
        let out = truncate_chars(&body, BODY_PREVIEW_CHARS);
        assert_eq!(out.chars().count(), BODY_PREVIEW_CHARS + 1);
        assert!(out.ends_with('…'));
    }
}
