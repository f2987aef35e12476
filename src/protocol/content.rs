//! Content envelope returned by every capture and control operation.
//!
//! # Format
//!
//! ```json
//! [
//!   {"type": "text", "text": "Successfully clicked element: #go"},
//!   {"type": "image_url", "image_url": {"url": "data:image/png;base64,..."}}
//! ]
//! ```
//!
//! A part with any other `type` tag is rejected when parsed.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// ContentPart
// ============================================================================

/// One part of a [`Content`] envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// Plain text.
    #[serde(rename = "text")]
    Text {
        /// The text.
        text: String,
    },

    /// An image, by data URL or remote URL.
    #[serde(rename = "image_url")]
    Image {
        /// Image location.
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Returns the text if this is a text part.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. } => None,
        }
    }

    /// Returns the image URL if this is an image part.
    #[inline]
    #[must_use]
    pub fn as_image_url(&self) -> Option<&str> {
        match self {
            Self::Image { image_url } => Some(&image_url.url),
            Self::Text { .. } => None,
        }
    }
}

impl TryFrom<Value> for ContentPart {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::protocol("content part without a type tag"))?;

        match tag {
            "text" | "image_url" => Ok(serde_json::from_value(value)?),
            other => Err(Error::UnknownContentType {
                tag: other.to_string(),
            }),
        }
    }
}

/// Image location of an image part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// `data:` URL or remote URL.
    pub url: String,
    /// Optional detail hint for the consumer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// ============================================================================
// Content
// ============================================================================

/// Ordered sequence of content parts.
///
/// Successful operations always produce at least one part. Failures become
/// a single text part carrying the error message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(Vec<ContentPart>);

impl Content {
    /// Single text part.
    #[inline]
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self(vec![ContentPart::Text { text: text.into() }])
    }

    /// Single image part.
    #[inline]
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self(vec![ContentPart::Image {
            image_url: ImageUrl {
                url: url.into(),
                detail: None,
            },
        }])
    }

    /// Builds an envelope from parts.
    #[inline]
    #[must_use]
    pub fn from_parts(parts: Vec<ContentPart>) -> Self {
        Self(parts)
    }

    /// Parses an envelope, rejecting unknown part types.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownContentType`] for an unrecognized tag, or a protocol
    /// error when the value is not an array of parts.
    pub fn parse(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(Error::protocol("content envelope must be an array"));
        };
        items
            .into_iter()
            .map(ContentPart::try_from)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Returns the parts.
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &[ContentPart] {
        &self.0
    }

    /// Returns `true` when there are no parts.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenates all text parts.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.0
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Consumes the envelope, returning its parts.
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> Vec<ContentPart> {
        self.0
    }
}

// ============================================================================
// Tests
// ============================================================================
