//! Splitting a combined unified-diff blob back into per-file sections.
//!
//! The backend returns one blob with standard `diff --git a/<path> b/<path>`
//! section headers. Views cross-reference sections against the file-status
//! list by path, independent of ordering in either.

/// The lines of one file's section within a combined unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSection {
    pub path: String,
    pub text: String,
}

/// Split a combined unified diff into per-file sections by header matching.
///
/// Content before the first header (normally none) is ignored. Each
/// section's text includes its header line and runs up to the next header.
pub fn split_by_file(unified: &str) -> Vec<FileSection> {
    let mut sections: Vec<FileSection> = Vec::new();
    let mut current: Option<FileSection> = None;

    for line in unified.lines() {
        if let Some(path) = header_path(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(FileSection {
                path,
                text: String::new(),
            });
        }
        if let Some(section) = current.as_mut() {
            section.text.push_str(line);
            section.text.push('\n');
        }
    }

    if let Some(section) = current.take() {
        sections.push(section);
    }
    sections
}

/// Find the section for one file path, if present.
pub fn section_for_path<'a>(sections: &'a [FileSection], path: &str) -> Option<&'a FileSection> {
    sections.iter().find(|s| s.path == path)
}

/// Extract the new-side path from a `diff --git a/<path> b/<path>` header.
fn header_path(line: &str) -> Option<String> {
    let rest = line.strip_prefix("diff --git a/")?;
    let idx = rest.rfind(" b/")?;
    Some(rest[idx + 3..].to_string())
}
