//! Commit-message heuristics for spotting AI-assisted work.
//!
//! Each table is one independent signal. A message matches a table when any
//! phrase occurs as a substring of the lower-cased message.

use crate::model::AssistSignal;

pub const EXPLICIT_MENTIONS: &[&str] = &[
    "copilot",
    "github copilot",
    "ai-generated",
    "ai-assisted",
    "ai generated",
    "chatgpt",
    "gpt",
    "claude",
    "ai suggested",
    "auto-generated",
    "code completion",
    "ai completion",
    "suggested by ai",
];

pub const GENERATION_PHRASES: &[&str] = &[
    "generated boilerplate",
    "auto-complete",
    "scaffolded",
    "template generated",
    "bulk generation",
];

pub const DOCS_PHRASES: &[&str] = &[
    "added docstrings",
    "generated comments",
    "auto-documented",
    "documentation update",
    "comment generation",
];

pub const BULK_PHRASES: &[&str] = &["bulk", "mass", "multiple files"];

pub const EXPLICIT_WEIGHT: u32 = 3;
pub const GENERATION_WEIGHT: u32 = 2;
pub const DOCS_WEIGHT: u32 = 1;
pub const BULK_WEIGHT: u32 = 1;

/// Minimum score for a commit to count as likely assisted.
pub const ASSIST_THRESHOLD: u32 = 2;

pub fn score(message: &str) -> AssistSignal {
    let message = message.to_lowercase();
    let matches = |table: &[&str]| table.iter().any(|phrase| message.contains(phrase));

    let explicit_mention = matches(EXPLICIT_MENTIONS);
    let generation_pattern = matches(GENERATION_PHRASES);
    let docs_pattern = matches(DOCS_PHRASES);
    let bulk_pattern = matches(BULK_PHRASES);

    let score = u32::from(explicit_mention) * EXPLICIT_WEIGHT
        + u32::from(generation_pattern) * GENERATION_WEIGHT
        + u32::from(docs_pattern) * DOCS_WEIGHT
        + u32::from(bulk_pattern) * BULK_WEIGHT;

    AssistSignal {
        explicit_mention,
        generation_pattern,
        docs_pattern,
        bulk_pattern,
        score,
        likely_assisted: score >= ASSIST_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_messages_score_zero() {
        for msg in ["fix off-by-one in pager", "Refactor config loader", "bump deps", ""] {
            let s = score(msg);
            assert_eq!(s.score, 0, "{msg}");
            assert!(!s.likely_assisted);
        }
    }

    #[test]
    fn explicit_mention_alone_crosses_threshold() {
        let s = score("Refactor parser with Copilot");
        assert!(s.explicit_mention);
        assert!(!s.generation_pattern && !s.docs_pattern && !s.bulk_pattern);
        assert_eq!(s.score, 3);
        assert!(s.likely_assisted);
    }

    #[test]
    fn bulk_alone_stays_below_threshold() {
        let s = score("Bulk rename of test fixtures");
        assert!(s.bulk_pattern);
        assert_eq!(s.score, 1);
        assert!(!s.likely_assisted);
    }

    #[test]
    fn generation_alone_is_enough() {
        let s = score("scaffolded the settings page");
        assert_eq!(s.score, 2);
        assert!(s.likely_assisted);
    }

    #[test]
    fn docs_and_bulk_combine() {
        let s = score("Documentation update across multiple files");
        assert!(s.docs_pattern && s.bulk_pattern);
        assert_eq!(s.score, 2);
        assert!(s.likely_assisted);
    }

    #[test]
    fn categories_are_counted_once() {
        // "bulk generation" hits both the generation and bulk tables
        let s = score("bulk generation of bulk fixtures");
        assert_eq!(s.score, GENERATION_WEIGHT + BULK_WEIGHT);
    }

    #[test]
    fn every_category_adds_up() {
        let s = score("ChatGPT scaffolded handlers, added docstrings, mass rename");
        assert_eq!(s.score, 7);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(score("AI-GENERATED migration"), score("ai-generated migration"));
    }
}
