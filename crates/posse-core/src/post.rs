//! The normalized content unit handed to the distributor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors rejecting a [`PostDraft`] during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostError {
    #[error("post id must not be empty")]
    EmptyId,

    #[error("post body must not be empty")]
    EmptyBody,

    #[error("canonical url must not be empty")]
    MissingCanonicalUrl,

    /// The canonical url must be absolute (carry a scheme).
    #[error("canonical url is not absolute: {0}")]
    RelativeCanonicalUrl(String),
}

/// A reference to an attached media asset, by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub alt: Option<String>,
}

impl MediaRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// Unvalidated input for [`Post`] construction.
///
/// Plain struct with public fields; callers fill in what they have and the
/// distributor (or [`Post::try_from`]) validates it.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub id: String,
    pub title: String,
    pub body: String,
    pub canonical_url: String,
    pub media: Vec<MediaRef>,
}

/// A validated, immutable content unit.
///
/// Created once by the caller, then only referenced during syndication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    id: String,
    title: String,
    body: String,
    canonical_url: String,
    media: Vec<MediaRef>,
    created_at: DateTime<Utc>,
}

impl Post {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    pub fn media(&self) -> &[MediaRef] {
        &self.media
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl TryFrom<PostDraft> for Post {
    type Error = PostError;

    fn try_from(draft: PostDraft) -> Result<Self, Self::Error> {
        let id = draft.id.trim().to_string();
        if id.is_empty() {
            return Err(PostError::EmptyId);
        }

        let body = draft.body.trim().to_string();
        if body.is_empty() {
            return Err(PostError::EmptyBody);
        }

        let canonical_url = draft.canonical_url.trim().to_string();
        if canonical_url.is_empty() {
            return Err(PostError::MissingCanonicalUrl);
        }
        if !canonical_url.contains("://") {
            return Err(PostError::RelativeCanonicalUrl(canonical_url));
        }

        Ok(Post {
            id,
            title: draft.title.trim().to_string(),
            body,
            canonical_url,
            media: draft.media,
            created_at: Utc::now(),
        })
    }
}
