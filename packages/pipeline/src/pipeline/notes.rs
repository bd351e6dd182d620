//! Note writer: filename derivation, collision handling, rendering.
//!
//! A note looks like:
//!
//! ```text
//! ---
//! url: "https://example.com/x"
//! author: "Ada"
//! ---
//!
//! # Title
//!
//! summary body
//!
//! ---
//! #inbox #tag
//! *Source: https://example.com/x*
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use tracing::debug;

use crate::error::WriteError;
use crate::types::content::NoteMetadata;
use crate::types::summary::SummaryResult;

/// Maximum number of title words kept in a filename.
pub const DEFAULT_FILENAME_WORDS: usize = 4;

/// Tag every note carries, ahead of the generated ones.
pub const INBOX_TAG: &str = "inbox";

lazy_static! {
    static ref STOP_WORDS: HashSet<&'static str> = [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
        "of", "with", "by", "from", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "do", "does", "did", "will", "would",
        "could", "should", "may", "might", "must", "this", "that", "these",
        "those", "it", "its", "as", "if", "how", "why", "what", "when", "where",
        "who", "which", "your", "my", "our", "their", "his", "her", "we", "you",
        "they", "i", "me", "us", "him", "them", "about", "into", "through",
        "during", "before", "after", "above", "below", "between", "under",
        "again", "further", "then", "once", "here", "there", "all", "each",
        "few", "more", "most", "other", "some", "such", "no", "nor", "not",
        "only", "own", "same", "so", "than", "too", "very", "just", "can",
    ]
    .into_iter()
    .collect();
}

fn is_separator(c: char) -> bool {
    matches!(
        c,
        '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '-' | '–' | '—'
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Derive a filename stem from a title.
///
/// Keeps the first `max_words` words that are not stop words and are longer
/// than two characters, capitalized and joined with `-`. Falls back to the
/// first raw words when nothing survives, and to `untitled` for a blank title.
pub fn extract_keywords(title: &str, max_words: usize) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if is_separator(c) { ' ' } else { c })
        .collect::<String>()
        .to_lowercase();
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut selected: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !STOP_WORDS.contains(w) && w.chars().count() > 2)
        .take(max_words)
        .collect();
    if selected.is_empty() {
        selected = words.iter().copied().take(max_words).collect();
    }
    if selected.is_empty() {
        return "untitled".to_string();
    }

    selected
        .into_iter()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("-")
}

/// First free path among `stem.md`, `stem-1.md`, `stem-2.md`, ...
pub fn resolve_collision(dir: &Path, stem: &str) -> PathBuf {
    let candidate = dir.join(format!("{stem}.md"));
    if !candidate.exists() {
        return candidate;
    }

    (1u64..)
        .map(|n| dir.join(format!("{stem}-{n}.md")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Everything that goes into one note.
#[derive(Debug, Clone, Copy)]
pub struct NoteInput<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub summary: &'a SummaryResult,
    pub metadata: &'a NoteMetadata,
    pub note: &'a str,
}

/// Render the note document.
pub fn render_note(input: &NoteInput<'_>) -> String {
    let mut frontmatter = vec!["---".to_string(), format!("url: \"{}\"", input.url)];
    if let Some(author) = input.metadata.author.as_deref().filter(|a| !a.is_empty()) {
        frontmatter.push(format!("author: \"{author}\""));
    }
    if let Some(date) = input.metadata.date.as_deref().filter(|d| !d.is_empty()) {
        frontmatter.push(format!("date: \"{date}\""));
    }
    if !input.note.is_empty() {
        frontmatter.push(format!("note: \"{}\"", input.note.replace('"', "'")));
    }
    frontmatter.push("---".to_string());

    let tag_line = std::iter::once(INBOX_TAG)
        .chain(input.summary.tags.iter().map(String::as_str))
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ");

    let title = if input.title.trim().is_empty() {
        "Untitled"
    } else {
        input.title
    };

    format!(
        "{}\n\n# {}\n\n{}\n\n---\n{}\n*Source: {}*\n",
        frontmatter.join("\n"),
        title,
        input.summary.summary,
        tag_line,
        input.url
    )
}

/// Writes notes into a target directory.
#[derive(Debug, Clone)]
pub struct NoteWriter {
    target_dir: PathBuf,
    max_words: usize,
}

impl NoteWriter {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            max_words: DEFAULT_FILENAME_WORDS,
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Write one note and return its path.
    ///
    /// The whole document goes out in one write; an existing file is never
    /// overwritten.
    pub async fn write(&self, input: &NoteInput<'_>) -> Result<PathBuf, WriteError> {
        let stem = extract_keywords(input.title, self.max_words);
        let path = resolve_collision(&self.target_dir, &stem);
        let document = render_note(input);

        tokio::fs::write(&path, document)
            .await
            .map_err(|source| WriteError::Filesystem {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Wrote note");
        Ok(path)
    }
}
