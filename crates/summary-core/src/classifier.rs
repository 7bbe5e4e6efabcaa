//! Keyword heuristics that turn a complaint email into a [`ClassificationRecord`].
//!
//! The keyword lists are ordered and matching is first-match-wins in list
//! order, not in text order. Reordering a list changes the output.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::models::{ClassificationRecord, Status};

/// Complaint phrases, returned verbatim as the problem when present.
pub const COMPLAINT_KEYWORDS: &[&str] = &[
    "slow internet",
    "no internet",
    "disconnect",
    "packet loss",
    "latency",
    "speed",
    "downtime",
    "buffering",
    "not working",
    "service issue",
    "complaint",
];

/// Resolution actions; the first one found anchors the solution snippet.
pub const SOLUTION_KEYWORDS: &[&str] = &[
    "restarted",
    "reset",
    "replaced",
    "engineer",
    "technician",
    "scheduled",
    "ticket",
    "refund",
    "credited",
    "resolved",
    "fixed",
    "investigating",
    "monitoring",
    "escalated",
];

/// Checked before [`UNRESOLVED_INDICATORS`].
pub const RESOLVED_INDICATORS: &[&str] = &["resolved", "fixed", "closed", "issue solved", "working now"];

pub const UNRESOLVED_INDICATORS: &[&str] = &[
    "pending",
    "ongoing",
    "still",
    "not resolved",
    "escalated",
    "awaiting",
    "investigating",
];

/// Maximum snippet reach, in characters past the match, when no period follows.
pub const SNIPPET_REACH: usize = 120;

pub const UNKNOWN_CLIENT: &str = "Unknown";
pub const NO_PROBLEM: &str = "No specific problem detected";
pub const NO_SOLUTION: &str = "No solution mentioned";

const ISSUE_TOPIC_PATTERN: &str = r"(internet|wifi|broadband|connection|speed|latency|disconnect|packet)";
const DISPLAY_NAME_PATTERN: &str = r#""?([^"<]+)"?\s*<[^>]+>"#;
const LOCAL_PART_PATTERN: &str = r"([^@]+)@";

static ISSUE_TOPIC: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(ISSUE_TOPIC_PATTERN).ok());
static DISPLAY_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(DISPLAY_NAME_PATTERN).ok());
static LOCAL_PART: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(LOCAL_PART_PATTERN).ok());

/// Internal classification failures. These never leave [`classify`].
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("pattern unavailable: {0}")]
    Pattern(&'static str),

    #[error("snippet bounds {start}..{end} fall outside the text")]
    Bounds { start: usize, end: usize },
}

/// Text fields of one message. Missing fields are empty strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyInput<'a> {
    pub subject: &'a str,
    pub body: &'a str,
    pub from: &'a str,
}

impl ClassificationRecord {
    /// The record substituted for any message that could not be classified.
    pub fn parse_error() -> Self {
        Self {
            client_name: "Parse Error".to_string(),
            problem: "Failed to parse email content".to_string(),
            solution: "N/A".to_string(),
            status: Status::Unknown,
        }
    }
}

/// Classify a message. Never fails; internal errors yield
/// [`ClassificationRecord::parse_error`].
pub fn classify(input: ClassifyInput<'_>) -> ClassificationRecord {
    or_parse_error(try_classify(input))
}

fn or_parse_error(result: Result<ClassificationRecord, ClassifyError>) -> ClassificationRecord {
    result.unwrap_or_else(|err| {
        warn!(error = %err, "Falling back to parse error record");
        ClassificationRecord::parse_error()
    })
}

fn try_classify(input: ClassifyInput<'_>) -> Result<ClassificationRecord, ClassifyError> {
    let text = format!("{}\n{}", input.subject, input.body).to_lowercase();

    let problem = match COMPLAINT_KEYWORDS.iter().find(|k| text.contains(*k)) {
        Some(keyword) => (*keyword).to_string(),
        None => extract_problem(&text)?,
    };
    let solution = extract_solution(&text)?;
    let status = infer_status(&text);
    let client_name = parse_client_name(input.from)?;

    Ok(ClassificationRecord {
        client_name: or_sentinel(client_name, UNKNOWN_CLIENT),
        problem: or_sentinel(problem, NO_PROBLEM),
        solution: or_sentinel(solution, NO_SOLUTION),
        status,
    })
}

fn or_sentinel(value: String, sentinel: &str) -> String {
    if value.is_empty() {
        sentinel.to_string()
    } else {
        value
    }
}

/// Fallback problem: the line around the first issue-topic word.
fn extract_problem(text: &str) -> Result<String, ClassifyError> {
    let pattern = ISSUE_TOPIC.as_ref().ok_or(ClassifyError::Pattern("issue topic"))?;
    match pattern.find(text) {
        Some(m) => snippet_at(text, m.start()).map(str::to_string),
        None => Ok(String::new()),
    }
}

fn extract_solution(text: &str) -> Result<String, ClassifyError> {
    for keyword in SOLUTION_KEYWORDS {
        if let Some(pos) = text.find(keyword) {
            return snippet_at(text, pos).map(str::to_string);
        }
    }
    Ok(String::new())
}

/// Slice from the start of the line holding `pos` to the next period, or
/// [`SNIPPET_REACH`] characters past `pos` when no period follows.
fn snippet_at(text: &str, pos: usize) -> Result<&str, ClassifyError> {
    let head = text.get(..pos).ok_or(ClassifyError::Bounds { start: 0, end: pos })?;
    let start = head.rfind('\n').unwrap_or(0);

    let tail = text.get(pos..).ok_or(ClassifyError::Bounds { start: pos, end: text.len() })?;
    let end = match tail.find('.') {
        Some(offset) => pos + offset,
        None => tail
            .char_indices()
            .nth(SNIPPET_REACH)
            .map_or(text.len(), |(offset, _)| pos + offset),
    };

    text.get(start..end)
        .map(str::trim)
        .ok_or(ClassifyError::Bounds { start, end })
}

fn infer_status(text: &str) -> Status {
    if RESOLVED_INDICATORS.iter().any(|k| text.contains(k)) {
        Status::Resolved
    } else if UNRESOLVED_INDICATORS.iter().any(|k| text.contains(k)) {
        Status::Unresolved
    } else {
        Status::Unknown
    }
}

/// Display name before an angle-bracketed address, else the local part.
fn parse_client_name(from: &str) -> Result<String, ClassifyError> {
    let display = DISPLAY_NAME.as_ref().ok_or(ClassifyError::Pattern("display name"))?;
    let local = LOCAL_PART.as_ref().ok_or(ClassifyError::Pattern("local part"))?;

    let captured = display
        .captures(from)
        .or_else(|| local.captures(from))
        .and_then(|caps| caps.get(1));

    Ok(captured.map(|m| m.as_str().trim().to_string()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(subject: &str, body: &str, from: &str) -> ClassificationRecord {
        classify(ClassifyInput { subject, body, from })
    }

    #[test]
    fn test_complaint_keyword_and_display_name() {
        let record = run("Slow internet again", "", "Jane Doe <jane@x.com>");
        assert!(record.problem.contains("slow internet"));
        assert_eq!(record.client_name, "Jane Doe");
        assert_eq!(record.solution, NO_SOLUTION);
        assert_eq!(record.status, Status::Unknown);
    }

    #[test]
    fn test_complaint_list_order_beats_text_order() {
        // "latency" appears first in the text, but "packet loss" is earlier in the list.
        let record = run("latency and packet loss", "", "");
        assert_eq!(record.problem, "packet loss");
    }

    #[test]
    fn test_bare_address_uses_local_part() {
        let record = run("hello", "", "noreply@x.com");
        assert_eq!(record.client_name, "noreply");
    }

    #[test]
    fn test_quoted_display_name() {
        let record = run("hello", "", "\"Rahim Uddin\" <rahim@isp.example>");
        assert_eq!(record.client_name, "Rahim Uddin");
    }

    #[test]
    fn test_missing_sender_gets_sentinel() {
        let record = run("hello", "", "Unknown Sender");
        assert_eq!(record.client_name, UNKNOWN_CLIENT);
        let record = run("hello", "", "");
        assert_eq!(record.client_name, UNKNOWN_CLIENT);
    }

    #[test]
    fn test_resolved_beats_unresolved() {
        let record = run("Ticket update", "It was pending but is now resolved", "");
        assert_eq!(record.status, Status::Resolved);
    }

    #[test]
    fn test_unresolved_status() {
        let record = run("Outage", "The issue is still ongoing", "");
        assert_eq!(record.status, Status::Unresolved);
    }

    #[test]
    fn test_solution_snippet_ends_at_period() {
        let record = run(
            "Connection down",
            "Our engineer will visit tomorrow. Thanks for waiting",
            "",
        );
        assert_eq!(record.solution, "our engineer will visit tomorrow");
    }

    #[test]
    fn test_solution_snippet_starts_at_line() {
        let record = run(
            "Update",
            "Dear customer,\nA technician was sent to your area. Regards",
            "",
        );
        assert_eq!(record.solution, "a technician was sent to your area");
    }

    #[test]
    fn test_solution_snippet_without_period_is_bounded() {
        let tail = "x".repeat(300);
        let body = format!("engineer {tail}");
        let record = run("", &body, "");
        // Line starts at the newline after the empty subject; 120 chars past the match.
        assert!(record.solution.starts_with("engineer"));
        assert_eq!(record.solution.chars().count(), SNIPPET_REACH);
    }

    #[test]
    fn test_solution_list_order() {
        // "ticket" is earlier in the list than "refund", so the snippet runs to the
        // period after "ticket" rather than the one after "refund".
        let record = run("", "Refund issued. Ticket closed.", "");
        assert_eq!(record.solution, "refund issued. ticket closed");
    }

    #[test]
    fn test_problem_fallback_snippet() {
        let record = run("Question", "My wifi keeps dropping at night. Please help.", "");
        assert_eq!(record.problem, "my wifi keeps dropping at night");
    }

    #[test]
    fn test_problem_sentinel_when_nothing_matches() {
        let record = run("Invoice", "Please find attached.", "billing@x.com");
        assert_eq!(record.problem, NO_PROBLEM);
        assert_eq!(record.solution, NO_SOLUTION);
        assert_eq!(record.status, Status::Unknown);
        assert_eq!(record.client_name, "billing");
    }

    #[test]
    fn test_topic_match_is_literal_on_lowercased_text() {
        // U+017F folds to 's' under case-insensitive matching; the topic
        // pattern runs on already-lowercased text and must not fold.
        let record = run("my \u{17f}peedtest failed.", "", "");
        assert_eq!(record.problem, NO_PROBLEM);
    }

    #[test]
    fn test_snippet_is_char_boundary_safe() {
        let body = format!("connection {}", "é".repeat(200));
        let record = run("", &body, "");
        assert!(record.problem.starts_with("connection"));
        assert_eq!(record.problem.chars().count(), SNIPPET_REACH);
    }

    #[test]
    fn test_internal_error_yields_parse_error_record() {
        let record = or_parse_error(Err(ClassifyError::Pattern("issue topic")));
        assert_eq!(record, ClassificationRecord::parse_error());
        assert_eq!(record.client_name, "Parse Error");
        assert_eq!(record.problem, "Failed to parse email content");
        assert_eq!(record.solution, "N/A");
        assert_eq!(record.status, Status::Unknown);
    }

    #[test]
    fn test_patterns_compile() {
        assert!(ISSUE_TOPIC.is_some());
        assert!(DISPLAY_NAME.is_some());
        assert!(LOCAL_PART.is_some());
    }

    proptest! {
        #[test]
        fn prop_classify_never_fails(subject in ".*", body in ".*", from in ".*") {
            let record = classify(ClassifyInput { subject: &subject, body: &body, from: &from });
            prop_assert_ne!(&record, &ClassificationRecord::parse_error());
            prop_assert!(!record.problem.is_empty());
            prop_assert!(!record.solution.is_empty());
            prop_assert!(!record.client_name.is_empty());
        }

        #[test]
        fn prop_classify_is_deterministic(subject in ".*", body in ".*") {
            let input = ClassifyInput { subject: &subject, body: &body, from: "" };
            prop_assert_eq!(classify(input), classify(input));
        }
    }
}
