//! Gmail search query construction.
//!
//! This module provides a fluent [`QueryBuilder`] that accumulates search
//! predicates and renders them into Gmail's textual query grammar.
//!
//! # Example
//!
//! ```
//! use gmail_watch::QueryBuilder;
//!
//! let query = QueryBuilder::new()
//!     .from("noreply@example.com")
//!     .read(false)
//!     .with_subject("Your report is ready")
//!     .with_attachment()
//!     .newer_than("1d")
//!     .build();
//!
//! assert_eq!(
//!     query,
//!     r#"from:noreply@example.com is:unread subject:Your report is ready has:attachment newer_than:1d"#
//! );
//! ```
//!
//! Predicate text is inserted verbatim - no escaping is performed, so callers
//! are responsible for avoiding characters meaningful to Gmail's query grammar.

/// One atomic search predicate recognized by Gmail's search grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    /// Sender address: `from:<addr>`.
    From(String),
    /// Read state: `is:read` when true, `is:unread` when false.
    ReadState(bool),
    /// Subject line: `subject:<text>`.
    Subject(String),
    /// Quoted body/content literal: `"<text>"`.
    ContainsText(String),
    /// Presence of any attachment: `has:attachment`.
    HasAttachment,
    /// Attachment filename: `filename:<name>`.
    FilenameIs(String),
    /// Age bound: `newer_than:<span>` (e.g. `1d`, `2h`).
    NewerThan(String),
}

impl QueryToken {
    /// Renders this token in Gmail's query grammar.
    fn render(&self) -> String {
        match self {
            QueryToken::From(addr) => format!("from:{addr}"),
            QueryToken::ReadState(true) => "is:read".to_string(),
            QueryToken::ReadState(false) => "is:unread".to_string(),
            QueryToken::Subject(subject) => format!("subject:{subject}"),
            QueryToken::ContainsText(text) => format!("\"{text}\""),
            QueryToken::HasAttachment => "has:attachment".to_string(),
            QueryToken::FilenameIs(name) => format!("filename:{name}"),
            QueryToken::NewerThan(span) => format!("newer_than:{span}"),
        }
    }
}

/// Fluent accumulator for Gmail search predicates.
///
/// Each predicate method appends one [`QueryToken`] and returns the builder
/// for chaining; [`build`](Self::build) joins the rendered tokens with single
/// spaces, in insertion order. Tokens are not de-duplicated and conflicting
/// predicates are not rejected - query specificity is the caller's concern.
///
/// A builder value is owned by a single logical query construction; it is
/// plain data and can be cloned to branch a query.
///
/// # Example
///
/// ```
/// use gmail_watch::QueryBuilder;
///
/// let mut builder = QueryBuilder::new()
///     .from("a@b.com")
///     .read(true)
///     .with_subject("Hi");
///
/// assert_eq!(builder.build(), "from:a@b.com is:read subject:Hi");
/// // build() is non-mutating and idempotent
/// assert_eq!(builder.build(), "from:a@b.com is:read subject:Hi");
///
/// // clear() empties the token sequence for reuse
/// builder.clear();
/// assert_eq!(builder.build(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    tokens: Vec<QueryToken>,
}

impl QueryBuilder {
    /// Creates a new builder with an empty token sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `from:<addr>` predicate.
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.tokens.push(QueryToken::From(address.into()));
        self
    }

    /// Appends `is:read` when `is_read` is true, `is:unread` otherwise.
    #[must_use]
    pub fn read(mut self, is_read: bool) -> Self {
        self.tokens.push(QueryToken::ReadState(is_read));
        self
    }

    /// Appends a `subject:<text>` predicate.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.tokens.push(QueryToken::Subject(subject.into()));
        self
    }

    /// Appends a quoted content literal (`"<text>"`).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.tokens.push(QueryToken::ContainsText(text.into()));
        self
    }

    /// Appends a `has:attachment` predicate.
    #[must_use]
    pub fn with_attachment(mut self) -> Self {
        self.tokens.push(QueryToken::HasAttachment);
        self
    }

    /// Appends a `filename:<name>` predicate.
    #[must_use]
    pub fn with_file(mut self, file_name: impl Into<String>) -> Self {
        self.tokens.push(QueryToken::FilenameIs(file_name.into()));
        self
    }

    /// Appends a `newer_than:<span>` predicate (e.g. `1d`, `2h`).
    ///
    /// The span is inserted verbatim; Gmail accepts `d` (days), `m` (months)
    /// and `y` (years) suffixes.
    #[must_use]
    pub fn newer_than(mut self, span: impl Into<String>) -> Self {
        self.tokens.push(QueryToken::NewerThan(span.into()));
        self
    }

    /// Empties the token sequence so the builder value can be reused.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Returns the accumulated tokens in insertion order.
    #[must_use]
    pub fn tokens(&self) -> &[QueryToken] {
        &self.tokens
    }

    /// Renders the accumulated tokens into a single Gmail query string.
    ///
    /// Tokens are joined with single spaces in insertion order. This does not
    /// mutate the builder and yields identical output when called repeatedly
    /// without intervening mutation.
    #[must_use]
    pub fn build(&self) -> String {
        self.tokens
            .iter()
            .map(QueryToken::render)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_render_in_call_order() {
        let query = QueryBuilder::new()
            .from("a@b.com")
            .read(true)
            .with_subject("Hi")
            .build();

        assert_eq!(query, "from:a@b.com is:read subject:Hi");
    }

    #[test]
    fn test_build_is_idempotent() {
        let builder = QueryBuilder::new().from("a@b.com").with_attachment();

        let first = builder.build();
        let second = builder.build();
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_state_rendering() {
        assert_eq!(QueryBuilder::new().read(true).build(), "is:read");
        assert_eq!(QueryBuilder::new().read(false).build(), "is:unread");
    }

    #[test]
    fn test_all_token_forms() {
        let query = QueryBuilder::new()
            .from("sender@example.com")
            .read(false)
            .with_subject("A delivery has arrived")
            .with_text("tracking number")
            .with_attachment()
            .with_file("invoice-2024.pdf")
            .newer_than("1d")
            .build();

        assert_eq!(
            query,
            "from:sender@example.com is:unread subject:A delivery has arrived \
             \"tracking number\" has:attachment filename:invoice-2024.pdf newer_than:1d"
        );
    }

    #[test]
    fn test_text_is_quoted() {
        assert_eq!(
            QueryBuilder::new().with_text("exact phrase").build(),
            "\"exact phrase\""
        );
    }

    #[test]
    fn test_no_deduplication() {
        let query = QueryBuilder::new()
            .from("a@b.com")
            .from("a@b.com")
            .build();

        assert_eq!(query, "from:a@b.com from:a@b.com");
    }

    #[test]
    fn test_no_escaping() {
        // Token text is inserted verbatim, grammar characters included
        let query = QueryBuilder::new().with_subject("a:b \"c\"").build();
        assert_eq!(query, "subject:a:b \"c\"");
    }

    #[test]
    fn test_empty_builder_renders_empty() {
        assert_eq!(QueryBuilder::new().build(), "");
    }

    #[test]
    fn test_clear_resets_for_reuse() {
        let mut builder = QueryBuilder::new().from("a@b.com").read(true);
        assert_eq!(builder.build(), "from:a@b.com is:read");

        builder.clear();
        assert_eq!(builder.build(), "");

        let query = builder.with_subject("again").build();
        assert_eq!(query, "subject:again");
    }

    #[test]
    fn test_tokens_accessor() {
        let builder = QueryBuilder::new().from("a@b.com").with_attachment();
        assert_eq!(
            builder.tokens(),
            &[
                QueryToken::From("a@b.com".into()),
                QueryToken::HasAttachment
            ]
        );
    }
}
