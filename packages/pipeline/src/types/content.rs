//! Content returned by a fetch strategy.

/// Extracted text plus whatever metadata the source exposed.
///
/// Transient: only its effect on the note is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedContent {
    pub content: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

impl FetchedContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the publication date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Length of the content in characters, ignoring surrounding whitespace.
    pub fn trimmed_len(&self) -> usize {
        self.content.trim().chars().count()
    }

    /// Metadata for the note frontmatter.
    pub fn metadata(&self) -> NoteMetadata {
        NoteMetadata {
            author: self.author.clone(),
            date: self.date.clone(),
        }
    }
}

/// Optional frontmatter fields carried from the fetched source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMetadata {
    pub author: Option<String>,
    pub date: Option<String>,
}
