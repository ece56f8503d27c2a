//! Article drafts and their validation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// An unpublished article as submitted by its author.
///
/// Fields use the wire names `title`, `body`, `authorId`, `postTime`. Absent
/// fields decode to empty/zero so that [`validate`] reports them, not the
/// decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleDraft {
    pub title: String,
    pub body: String,
    /// Author's ledger address (e.g. `0xABC...`).
    pub author_id: String,
    /// Unix seconds.
    pub post_time: i64,
}

impl ArticleDraft {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        author_id: impl Into<String>,
        post_time: i64,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            author_id: author_id.into(),
            post_time,
        }
    }
}

/// Draft fields, in the order they are checked and serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Body,
    AuthorId,
    PostTime,
}

impl DraftField {
    /// The field's name on the wire.
    pub const fn wire_name(self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Body => "body",
            DraftField::AuthorId => "authorId",
            DraftField::PostTime => "postTime",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A draft that passed [`validate`].
///
/// Only `validate` constructs this type, so holding one proves every field
/// is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft(ArticleDraft);

impl ValidDraft {
    pub fn draft(&self) -> &ArticleDraft {
        &self.0
    }

    pub fn into_inner(self) -> ArticleDraft {
        self.0
    }
}

impl AsRef<ArticleDraft> for ValidDraft {
    fn as_ref(&self) -> &ArticleDraft {
        &self.0
    }
}

/// Validate a draft.
///
/// Succeeds iff `title`, `body` and `authorId` are non-empty and `postTime`
/// is positive. The first failing field, in wire order, is reported.
pub fn validate(draft: ArticleDraft) -> Result<ValidDraft, ValidationError> {
    if draft.title.is_empty() {
        return Err(ValidationError::MissingField(DraftField::Title));
    }
    if draft.body.is_empty() {
        return Err(ValidationError::MissingField(DraftField::Body));
    }
    if draft.author_id.is_empty() {
        return Err(ValidationError::MissingField(DraftField::AuthorId));
    }
    if draft.post_time <= 0 {
        return Err(ValidationError::MissingField(DraftField::PostTime));
    }

    Ok(ValidDraft(draft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hello() -> ArticleDraft {
        ArticleDraft::new("Hello", "World", "0xABC", 1_700_000_000)
    }

    #[test]
    fn test_valid_draft() {
        let valid = validate(hello()).unwrap();
        assert_eq!(valid.draft().title, "Hello");
        assert_eq!(valid.into_inner(), hello());
    }

    #[test]
    fn test_empty_title() {
        let draft = ArticleDraft::new("", "x", "0x1", 1);
        assert_eq!(
            validate(draft),
            Err(ValidationError::MissingField(DraftField::Title))
        );
    }

    #[test]
    fn test_empty_body() {
        let draft = ArticleDraft::new("t", "", "0x1", 1);
        assert_eq!(
            validate(draft).unwrap_err().field(),
            DraftField::Body
        );
    }

    #[test]
    fn test_empty_author() {
        let draft = ArticleDraft::new("t", "b", "", 1);
        assert_eq!(
            validate(draft).unwrap_err().field(),
            DraftField::AuthorId
        );
    }

    #[test]
    fn test_non_positive_post_time() {
        for post_time in [0, -1, i64::MIN] {
            let draft = ArticleDraft::new("t", "b", "0x1", post_time);
            assert_eq!(
                validate(draft).unwrap_err().field(),
                DraftField::PostTime
            );
        }
    }

    #[test]
    fn test_first_missing_field_reported() {
        let err = validate(ArticleDraft::default()).unwrap_err();
        assert_eq!(err.field(), DraftField::Title);
        assert_eq!(err.to_string(), "missing field: title");
    }

    #[test]
    fn test_absent_fields_decode_to_defaults() {
        let draft: ArticleDraft = serde_json::from_str(r#"{"title":"only"}"#).unwrap();
        assert_eq!(draft.body, "");
        assert_eq!(draft.author_id, "");
        assert_eq!(draft.post_time, 0);
        assert_eq!(validate(draft).unwrap_err().field(), DraftField::Body);
    }

    #[test]
    fn test_wire_names() {
        let draft: ArticleDraft = serde_json::from_str(
            r#"{"title":"Hello","body":"World","authorId":"0xABC","postTime":1700000000}"#,
        )
        .unwrap();
        assert_eq!(draft, hello());
    }

    proptest! {
        #[test]
        fn validate_iff_all_fields_present(
            title in ".{0,8}",
            body in ".{0,8}",
            author in ".{0,8}",
            post_time in any::<i64>(),
        ) {
            let draft = ArticleDraft::new(title.clone(), body.clone(), author.clone(), post_time);
            let expected = !title.is_empty() && !body.is_empty() && !author.is_empty() && post_time > 0;
            prop_assert_eq!(validate(draft).is_ok(), expected);
        }
    }
}
