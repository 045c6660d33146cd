//! Pure title and identifier parsing.
//!
//! Session titles carry an optional numeric task tag in the form
//! `[<digits>] <label>`, and new sessions derive their title from the
//! branch name. Everything here is deterministic and infallible:
//! unparseable input degrades to a tag-less trimmed label.

/// A title split into its optional numeric tag and the remaining label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub task_id: Option<String>,
    pub label: String,
}

/// Parse an optional `[<digits>] <label>` tag out of a free-text title.
///
/// Returns the tag and the remainder, or no tag and the whole trimmed
/// string when the pattern does not match.
pub fn parse_title_tag(title: &str) -> ParsedTitle {
    let trimmed = title.trim();

    if let Some(rest) = trimmed.strip_prefix('[')
        && let Some(close) = rest.find(']')
    {
        let digits = &rest[..close];
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return ParsedTitle {
                task_id: Some(digits.to_string()),
                label: rest[close + 1..].trim().to_string(),
            };
        }
    }

    ParsedTitle {
        task_id: None,
        label: trimmed.to_string(),
    }
}

/// Derive a human title from a branch name.
///
/// Takes the last path segment of the branch, extracts the first run of
/// 3+ digits as the task id, and title-cases the remaining words:
/// `feature/142-fix-login` becomes `[142] Fix Login`.
pub fn title_from_branch(branch: &str) -> String {
    let slug = branch.rsplit('/').next().unwrap_or(branch);
    let (task_id, label) = extract_task_and_label(slug);
    match task_id {
        Some(task) => format!("[{}] {}", task, label),
        None => label,
    }
}

/// Strip a `refs/heads/` prefix and surrounding whitespace from a branch ref.
pub fn clean_branch_name(branch: &str) -> String {
    let trimmed = branch.trim();
    trimmed
        .strip_prefix("refs/heads/")
        .unwrap_or(trimmed)
        .to_string()
}

fn extract_task_and_label(slug: &str) -> (Option<String>, String) {
    let bytes = slug.as_bytes();
    let mut digit_range: Option<(usize, usize)> = None;

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start >= 3 {
                digit_range = Some((start, i));
                break;
            }
        } else {
            i += 1;
        }
    }

    let mut remainder = slug.to_string();
    let task_id = digit_range.map(|(start, end)| {
        let task = remainder[start..end].to_string();
        remainder.replace_range(start..end, " ");
        task
    });

    let label = title_case_words(&remainder, &['-', '_']);
    let label = if label.is_empty() {
        // Nothing but the tag and separators; fall back to the whole slug.
        title_case_words(slug, &['/', '-', '_'])
    } else {
        label
    };

    (task_id, label)
}

fn title_case_words(text: &str, separators: &[char]) -> String {
    text.replace(separators, " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>()
                        + chars.as_str().to_lowercase().as_str()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_title() {
        let parsed = parse_title_tag("[77] Refactor parser");
        assert_eq!(parsed.task_id.as_deref(), Some("77"));
        assert_eq!(parsed.label, "Refactor parser");
    }

    #[test]
    fn test_parse_untagged_title() {
        let parsed = parse_title_tag("No tag here");
        assert_eq!(parsed.task_id, None);
        assert_eq!(parsed.label, "No tag here");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let parsed = parse_title_tag("   [142]   Fix Login  ");
        assert_eq!(parsed.task_id.as_deref(), Some("142"));
        assert_eq!(parsed.label, "Fix Login");
    }

    #[test]
    fn test_parse_non_numeric_bracket_is_not_a_tag() {
        let parsed = parse_title_tag("[wip] Fix Login");
        assert_eq!(parsed.task_id, None);
        assert_eq!(parsed.label, "[wip] Fix Login");
    }

    #[test]
    fn test_parse_empty_bracket_is_not_a_tag() {
        let parsed = parse_title_tag("[] nothing");
        assert_eq!(parsed.task_id, None);
        assert_eq!(parsed.label, "[] nothing");
    }

    #[test]
    fn test_title_from_branch_with_task_id() {
        assert_eq!(title_from_branch("feature/142-fix-login"), "[142] Fix Login");
    }

    #[test]
    fn test_title_from_branch_without_task_id() {
        assert_eq!(title_from_branch("feature/fix-login"), "Fix Login");
    }

    #[test]
    fn test_title_from_branch_short_digit_run_is_not_an_id() {
        // Fewer than 3 digits stays part of the label.
        assert_eq!(title_from_branch("fix-v2-login"), "Fix V2 Login");
    }

    #[test]
    fn test_title_from_branch_digits_only_slug() {
        // The digit run is the whole slug, so the label falls back to it.
        assert_eq!(title_from_branch("feature/1234"), "[1234] 1234");
    }

    #[test]
    fn test_title_from_branch_underscores() {
        assert_eq!(title_from_branch("bugfix/901_fix_crash"), "[901] Fix Crash");
    }

    #[test]
    fn test_title_from_branch_no_slash() {
        assert_eq!(title_from_branch("142-fix-login"), "[142] Fix Login");
    }

    #[test]
    fn test_clean_branch_name() {
        assert_eq!(clean_branch_name("refs/heads/feature/x"), "feature/x");
        assert_eq!(clean_branch_name("  feature/x  "), "feature/x");
        assert_eq!(clean_branch_name("feature/x"), "feature/x");
    }
}
