//! Topic Extractor - hashtags to topic keys
//!
//! A topic starts at `#` and runs over `[A-Za-z0-9_]` until the first
//! character outside that class. Topics are returned without the leading `#`,
//! in first-seen order, with exact duplicates removed. Matching is
//! case-sensitive: `#Hello` and `#hello` are different topics.
//!
//! # Example
//! ```
//! use yodelr::index::extract_topics;
//!
//! let topics = extract_topics("new #post of #topic about #post");
//! assert_eq!(topics, vec!["post", "topic"]);
//! ```

use crate::storage::Topic;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const TOPIC_PATTERN: &str = r"#([0-9A-Za-z_]+)";

fn topic_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(TOPIC_PATTERN).expect("topic pattern is a valid regex"))
}

/// Extract distinct topics from post text
///
/// O(length of text).
pub fn extract_topics(text: &str) -> Vec<Topic> {
    let mut seen: HashSet<&str> = HashSet::new();

    topic_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|topic| seen.insert(*topic))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_topic() {
        assert_eq!(extract_topics("This is a #message, with a topic."), vec!["message"]);
    }

    #[test]
    fn test_multiple_topics() {
        assert_eq!(
            extract_topics("This has #message with #multiple a #topic."),
            vec!["message", "multiple", "topic"]
        );
    }

    #[test]
    fn test_no_topic() {
        assert!(extract_topics("This has no topic!").is_empty());
        assert!(extract_topics("").is_empty());
    }

    #[test]
    fn test_duplicates_removed_in_first_seen_order() {
        assert_eq!(extract_topics("#a #b #a"), vec!["a", "b"]);
        assert_eq!(
            extract_topics("#full #topic #full #topic #full"),
            vec!["full", "topic"]
        );
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(
            extract_topics("#First and #first are #First"),
            vec!["First", "first"]
        );
    }

    #[test]
    fn test_token_boundaries() {
        // Stops at the first character outside [A-Za-z0-9_]
        assert_eq!(extract_topics("#snake_case-ok"), vec!["snake_case"]);
        assert_eq!(extract_topics("#abc123!"), vec!["abc123"]);
        // A bare marker is not a topic
        assert!(extract_topics("# alone ##").is_empty());
        // Non-ASCII letters end the token
        assert_eq!(extract_topics("#caféine"), vec!["caf"]);
    }

    #[test]
    fn test_marker_inside_word() {
        assert_eq!(extract_topics("mid#word"), vec!["word"]);
        assert_eq!(extract_topics("##double"), vec!["double"]);
    }

    #[test]
    fn test_deterministic() {
        let text = "My very #first #test post with #first again";
        assert_eq!(extract_topics(text), extract_topics(text));
    }
}
