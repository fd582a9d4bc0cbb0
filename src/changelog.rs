//! Staged concept files and the append-only changelog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What a changelog entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// A concept file was written
    Create,
    /// A primary classification was replaced
    Remap,
}

/// One changelog entry. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub action: ChangeAction,
    /// Affected file or search path
    #[serde(alias = "file")]
    pub path: String,
    pub classification_path: String,
    pub timestamp: DateTime<Utc>,
    /// sha256 of the written content (or of the new classification for remaps)
    pub checksum: String,
}

/// A concept file creation waiting to be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedChange {
    #[serde(rename = "type")]
    pub kind: ChangeAction,
    /// Target file, relative to the workspace base
    pub file: String,
    pub classification_path: String,
    pub content: String,
    pub checksum: String,
    pub timestamp: DateTime<Utc>,
}

impl StagedChange {
    /// Stage `<content_dir>/<classification>.md` with the default template
    pub fn create(classification_path: &str, content_dir: &str) -> Self {
        let content = concept_template(classification_path);
        let dir = content_dir.trim_end_matches('/');
        let file = if dir.is_empty() {
            format!("{classification_path}.md")
        } else {
            format!("{dir}/{classification_path}.md")
        };
        Self {
            kind: ChangeAction::Create,
            file,
            classification_path: classification_path.to_string(),
            checksum: compute_checksum(&content),
            content,
            timestamp: Utc::now(),
        }
    }

    /// The changelog entry recorded once this change is written
    pub fn to_entry(&self) -> ChangelogEntry {
        ChangelogEntry {
            action: self.kind,
            path: self.file.clone(),
            classification_path: self.classification_path.clone(),
            timestamp: self.timestamp,
            checksum: self.checksum.clone(),
        }
    }
}

impl ChangelogEntry {
    pub fn remap(search_path: &str, classification_path: &str) -> Self {
        Self {
            action: ChangeAction::Remap,
            path: search_path.to_string(),
            classification_path: classification_path.to_string(),
            timestamp: Utc::now(),
            checksum: compute_checksum(classification_path),
        }
    }
}

/// Compute SHA-256 hash of content
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Default body for a new concept file
pub fn concept_template(classification_path: &str) -> String {
    let (parent, concept) = match classification_path.rsplit_once('/') {
        Some((parent, concept)) => (parent, concept),
        None => ("", classification_path),
    };
    let spaced = concept.replace('_', " ");

    let mut content = format!("# {}\n\n", title_case(&spaced));
    if !parent.is_empty() {
        content.push_str(&format!("[[{concept}]]{{is_a: {parent}}}\n\n"));
    }
    content.push_str("## Definition\n\n");
    content.push_str(&format!("_{spaced} is a concept._\n\n"));
    content.push_str("## Related\n\n");
    content.push_str("<!-- Add related concepts here -->\n");
    content
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
