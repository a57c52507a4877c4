//! Post-processing shared by every import source.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use super::ImportError;
use crate::cv::CvPatch;

/// How entry ids in an imported patch are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Every entry gets a fresh `<prefix>-api-<millis>-<index>` id.
    Fresh,
    /// Ids are kept unless empty or repeated; those are replaced.
    KeepUnique,
}

/// Wraps plain text in a paragraph. Values that already look like markup
/// (trimmed, starting with `<` and ending with `>`) pass through unchanged.
pub fn ensure_html_format(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let trimmed = text.trim();
    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        return text.to_string();
    }
    format!("<p>{text}</p>")
}

/// Normalizes rich-text fields to HTML and assigns entry ids.
pub fn format_imported(mut patch: CvPatch, ids: IdPolicy) -> CvPatch {
    let stamp = Utc::now().timestamp_millis();

    if let Some(summary) = patch.summary.as_mut() {
        *summary = ensure_html_format(summary);
    }

    if let Some(experience) = patch.experience.as_mut() {
        let mut assign = IdAssigner::new("exp", stamp, ids);
        for (index, entry) in experience.iter_mut().enumerate() {
            entry.description = ensure_html_format(&entry.description);
            entry.id = assign.id_for(index, &entry.id);
        }
    }

    if let Some(sections) = patch.custom_sections.as_mut() {
        let mut assign = IdAssigner::new("custom", stamp, ids);
        for (index, entry) in sections.iter_mut().enumerate() {
            entry.description = ensure_html_format(&entry.description);
            entry.id = assign.id_for(index, &entry.id);
        }
    }

    patch
}

struct IdAssigner {
    prefix: &'static str,
    stamp: i64,
    policy: IdPolicy,
    seen: HashSet<String>,
}

impl IdAssigner {
    fn new(prefix: &'static str, stamp: i64, policy: IdPolicy) -> Self {
        Self {
            prefix,
            stamp,
            policy,
            seen: HashSet::new(),
        }
    }

    fn id_for(&mut self, index: usize, current: &str) -> String {
        let id = match self.policy {
            IdPolicy::Fresh => format!("{}-api-{}-{index}", self.prefix, self.stamp),
            IdPolicy::KeepUnique if !current.is_empty() && !self.seen.contains(current) => {
                current.to_string()
            }
            IdPolicy::KeepUnique => format!("{}-{}", self.prefix, Uuid::new_v4()),
        };
        self.seen.insert(id.clone());
        id
    }
}

/// Decodes a CV-shaped JSON document from a model response.
pub fn parse_cv_patch(text: &str) -> Result<CvPatch, ImportError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(ImportError::EmptyResponse);
    }
    Ok(serde_json::from_str(text)?)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::{CustomSectionEntry, ExperienceEntry};

    #[test]
    fn test_ensure_html_format() {
        assert_eq!(ensure_html_format("Hello"), "<p>Hello</p>");
        assert_eq!(ensure_html_format("<p>Hi</p>"), "<p>Hi</p>");
        assert_eq!(ensure_html_format("  <ul><li>x</li></ul> "), "  <ul><li>x</li></ul> ");
        assert_eq!(ensure_html_format(""), "");
    }

    #[test]
    fn test_fresh_ids_for_ai_entries() {
        let patch = CvPatch {
            summary: Some("Plain summary".into()),
            experience: Some(vec![
                ExperienceEntry {
                    id: "exp-1".into(),
                    description: "Did things".into(),
                    ..Default::default()
                },
                ExperienceEntry::default(),
            ]),
            ..Default::default()
        };
        let formatted = format_imported(patch, IdPolicy::Fresh);
        assert_eq!(formatted.summary.as_deref(), Some("<p>Plain summary</p>"));
        let experience = formatted.experience.unwrap();
        assert!(experience[0].id.starts_with("exp-api-"));
        assert!(experience[0].id.ends_with("-0"));
        assert!(experience[1].id.ends_with("-1"));
        assert_eq!(experience[0].description, "<p>Did things</p>");
        assert_eq!(experience[1].description, "");
    }

    #[test]
    fn test_keep_unique_replaces_missing_and_duplicate_ids() {
        let patch = CvPatch {
            custom_sections: Some(vec![
                CustomSectionEntry {
                    id: "custom-1".into(),
                    ..Default::default()
                },
                CustomSectionEntry {
                    id: "custom-1".into(),
                    ..Default::default()
                },
                CustomSectionEntry::default(),
            ]),
            ..Default::default()
        };
        let sections = format_imported(patch, IdPolicy::KeepUnique)
            .custom_sections
            .unwrap();
        assert_eq!(sections[0].id, "custom-1");
        assert_ne!(sections[1].id, "custom-1");
        assert!(sections[2].id.starts_with("custom-"));
        assert_ne!(sections[1].id, sections[2].id);
    }

    #[test]
    fn test_parse_cv_patch_with_fences() {
        let patch = parse_cv_patch("```json\n{\"summary\": \"x\"}\n```").unwrap();
        assert_eq!(patch.summary.as_deref(), Some("x"));
        let patch = parse_cv_patch("```\n{\"summary\": \"y\"}\n```").unwrap();
        assert_eq!(patch.summary.as_deref(), Some("y"));
    }

    #[test]
    fn test_parse_cv_patch_rejects_malformed() {
        assert!(matches!(
            parse_cv_patch("{\"summary\": "),
            Err(ImportError::Parse(_))
        ));
        assert!(matches!(parse_cv_patch("  "), Err(ImportError::EmptyResponse)));
    }
}
