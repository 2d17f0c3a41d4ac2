//! Builds the text sent to the embedding provider for a bookmark.
//!
//! Layout, one item per line:
//! 1. title
//! 2. url
//! 3. description (skipped when empty)
//! 4. each highlight
//! 5. tag names, space-joined (skipped when there are no tags)
//! 6. full content, cut so the whole text stays within `MAX_EMBED_TEXT_CHARS`
//!
//! The output is a pure function of the input fields.

use crate::bookmarks::Bookmark;

/// Upper bound on embedding text length (characters).
pub const MAX_EMBED_TEXT_CHARS: usize = 6000;

pub fn build_embedding_text(bookmark: &Bookmark) -> String {
    let mut text = String::new();

    push_line(&mut text, &bookmark.title);
    push_line(&mut text, &bookmark.url);

    if !bookmark.description.is_empty() {
        push_line(&mut text, &bookmark.description);
    }

    for highlight in &bookmark.highlights {
        push_line(&mut text, highlight);
    }

    if !bookmark.tags.is_empty() {
        push_line(&mut text, &bookmark.tags.join(" "));
    }

    if let Some(content) = bookmark.content.as_deref().filter(|c| !c.is_empty()) {
        let remaining = MAX_EMBED_TEXT_CHARS.saturating_sub(text.chars().count());
        text.extend(content.chars().take(remaining));
    }

    text
}

fn push_line(text: &mut String, line: &str) {
    text.push_str(line);
    text.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark() -> Bookmark {
        Bookmark {
            id: 7,
            title: "Rust async".to_string(),
            url: "https://example.com/async".to_string(),
            description: "An executor walkthrough".to_string(),
            highlights: vec!["futures are lazy".to_string(), "poll me".to_string()],
            tags: vec!["rust".to_string(), "concurrency".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_full_layout() {
        assert_eq!(
            build_embedding_text(&bookmark()),
            "Rust async\nhttps://example.com/async\nAn executor walkthrough\nfutures are lazy\npoll me\nrust concurrency\n"
        );
    }

    #[test]
    fn test_skips_empty_description_and_tags() {
        let b = Bookmark {
            description: String::new(),
            tags: vec![],
            highlights: vec![],
            ..bookmark()
        };
        assert_eq!(build_embedding_text(&b), "Rust async\nhttps://example.com/async\n");
    }

    #[test]
    fn test_empty_title_still_has_line() {
        let b = Bookmark {
            url: "https://x.y".to_string(),
            ..Default::default()
        };
        assert_eq!(build_embedding_text(&b), "\nhttps://x.y\n");
    }

    #[test]
    fn test_content_appended_last() {
        let b = Bookmark {
            content: Some("page body".to_string()),
            ..bookmark()
        };
        assert!(build_embedding_text(&b).ends_with("rust concurrency\npage body"));
    }

    #[test]
    fn test_content_truncated_to_max() {
        let b = Bookmark {
            content: Some("x".repeat(10_000)),
            ..bookmark()
        };
        let text = build_embedding_text(&b);
        assert_eq!(text.chars().count(), MAX_EMBED_TEXT_CHARS);
    }

    #[test]
    fn test_truncation_is_char_safe() {
        let b = Bookmark {
            content: Some("日本語".repeat(5_000)),
            ..bookmark()
        };
        let text = build_embedding_text(&b);
        assert_eq!(text.chars().count(), MAX_EMBED_TEXT_CHARS);
    }

    #[test]
    fn test_content_dropped_when_fields_exceed_max() {
        let b = Bookmark {
            description: "d".repeat(MAX_EMBED_TEXT_CHARS + 10),
            content: Some("tail".to_string()),
            ..bookmark()
        };
        assert!(!build_embedding_text(&b).contains("tail"));
    }

    #[test]
    fn test_deterministic() {
        let b = Bookmark {
            content: Some("body".repeat(2_000)),
            ..bookmark()
        };
        assert_eq!(build_embedding_text(&b), build_embedding_text(&b.clone()));
    }
}
