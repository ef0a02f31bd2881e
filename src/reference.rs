//! Best-effort recovery of the clip label and marker color from reference
//! documents at the collection root. Absence or malformed content silently
//! falls back to the defaults; these reads must never fail a run.

use std::path::Path;

use quick_xml::{Reader, events::Event};
use tracing::debug;

use crate::foundation::error::FoldercutResult;

pub const DEFAULT_LABEL: &str = "Iris";
pub const DEFAULT_MARKER_COLOR: &str = "4294741314";

/// Previously exported sequence, checked for both label and marker color.
pub const REFERENCE_SEQUENCE_FILE: &str = "UTCached.xml";
/// Dedicated label document, checked for the label only.
pub const REFERENCE_LABEL_FILE: &str = "label.xml";

// Older exports carry this placeholder label; it is not a real label choice.
const PLACEHOLDER_LABEL: &str = "forest";

/// The clip label: first non-empty `<label2>` of the reference sequence, then
/// of the label document, skipping the legacy placeholder; else `default`.
pub fn detect_label(root: &Path, default: &str) -> String {
    for name in [REFERENCE_SEQUENCE_FILE, REFERENCE_LABEL_FILE] {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        match first_element_text(&path, b"label2", None) {
            Ok(Some(value)) => {
                if value.eq_ignore_ascii_case(PLACEHOLDER_LABEL)
                    && !default.eq_ignore_ascii_case(PLACEHOLDER_LABEL)
                {
                    continue;
                }
                return value;
            }
            Ok(None) => continue,
            Err(err) => {
                debug!(path = %path.display(), %err, "reference document unreadable");
                continue;
            }
        }
    }
    default.to_string()
}

/// The marker color: first `<pproColor>` inside a `<marker>` of the reference
/// sequence; else `default`.
pub fn detect_marker_color(root: &Path, default: &str) -> String {
    let path = root.join(REFERENCE_SEQUENCE_FILE);
    if !path.exists() {
        return default.to_string();
    }
    match first_element_text(&path, b"pproColor", Some(b"marker")) {
        Ok(Some(value)) => value,
        Ok(None) => default.to_string(),
        Err(err) => {
            debug!(path = %path.display(), %err, "reference document unreadable");
            default.to_string()
        }
    }
}

/// Trimmed text of the first `target` element (optionally requiring its direct
/// parent), or `None` when the first match is empty or no match exists.
fn first_element_text(
    path: &Path,
    target: &[u8],
    required_parent: Option<&[u8]>,
) -> FoldercutResult<Option<String>> {
    let mut reader = Reader::from_file(path)?;
    let mut buf = Vec::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut capturing = false;
    let mut text = String::new();

    let parent_ok = |stack: &[Vec<u8>]| match required_parent {
        Some(parent) => stack.last().map(|s| s.as_slice()) == Some(parent),
        None => true,
    };

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                if !capturing && name == target && parent_ok(&stack) {
                    capturing = true;
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                // A self-closing first match has no text to offer.
                if !capturing && e.name().as_ref() == target && parent_ok(&stack) {
                    return Ok(None);
                }
            }
            Event::Text(t) if capturing => text.push_str(&t.unescape()?),
            Event::End(e) => {
                stack.pop();
                if capturing && e.name().as_ref() == target {
                    let trimmed = text.trim();
                    return Ok((!trimmed.is_empty()).then(|| trimmed.to_string()));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn label_comes_from_the_reference_sequence_first() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            REFERENCE_SEQUENCE_FILE,
            "<sequence><labels><label2>Aurora</label2></labels></sequence>",
        );
        write(dir.path(), REFERENCE_LABEL_FILE, "<labels><label2>Other</label2></labels>");
        assert_eq!(detect_label(dir.path(), DEFAULT_LABEL), "Aurora");
    }

    #[test]
    fn placeholder_label_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            REFERENCE_SEQUENCE_FILE,
            "<sequence><labels><label2>Forest</label2></labels></sequence>",
        );
        write(dir.path(), REFERENCE_LABEL_FILE, "<labels><label2>Cedar</label2></labels>");
        assert_eq!(detect_label(dir.path(), DEFAULT_LABEL), "Cedar");
    }

    #[test]
    fn missing_or_malformed_documents_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_label(dir.path(), DEFAULT_LABEL), DEFAULT_LABEL);

        write(dir.path(), REFERENCE_SEQUENCE_FILE, "<sequence><label2>");
        assert_eq!(detect_label(dir.path(), DEFAULT_LABEL), DEFAULT_LABEL);
        assert_eq!(
            detect_marker_color(dir.path(), DEFAULT_MARKER_COLOR),
            DEFAULT_MARKER_COLOR
        );
    }

    #[test]
    fn marker_color_requires_a_marker_parent() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            REFERENCE_SEQUENCE_FILE,
            "<sequence><pproColor>111</pproColor>\
             <marker><pproColor>42</pproColor></marker></sequence>",
        );
        assert_eq!(detect_marker_color(dir.path(), DEFAULT_MARKER_COLOR), "42");
    }

    #[test]
    fn empty_first_match_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            REFERENCE_SEQUENCE_FILE,
            "<sequence><labels><label2/></labels><labels><label2>Late</label2></labels></sequence>",
        );
        assert_eq!(detect_label(dir.path(), DEFAULT_LABEL), DEFAULT_LABEL);
    }
}
