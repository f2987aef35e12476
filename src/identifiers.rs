//! Type-safe identifier wrappers.
//!
//! Newtypes keep tab ids, automation node ids and bridge request ids from
//! being mixed up at compile time.
//!
//! | Type | Wraps | Origin |
//! |------|-------|--------|
//! | [`TabId`] | `NonZeroU32` | Browser `tabs` API |
//! | [`NodeId`] | `i64` | Automation channel (`DOM.*` commands) |
//! | [`RequestId`] | `Uuid` | Generated per bridge request |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// ============================================================================
// TabId
// ============================================================================

/// Identifier of a browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(NonZeroU32);

impl TabId {
    /// Creates a tab id, returning `None` for zero.
    #[inline]
    #[must_use]
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TabId {
    type Err = Error;

    /// Parses the string form used by tab-view actions (`"42"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| Error::invalid_tab_id(s))
    }
}

// ============================================================================
// NodeId
// ============================================================================

/// Automation-channel node handle.
///
/// Only meaningful inside the session that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    /// Wraps a raw node id.
    #[inline]
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// RequestId
// ============================================================================

/// Bridge request identifier used for response correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh random id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The reserved id of the READY handshake message.
    #[inline]
    #[must_use]
    pub const fn ready() -> Self {
        Self(Uuid::nil())
    }

    /// Returns `true` for the READY handshake id.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_id_rejects_zero() {
        assert!(TabId::new(0).is_none());
        assert_eq!(TabId::new(7).map(|t| t.as_u32()), Some(7));
    }

    #[test]
    fn test_tab_id_from_str() {
        let tab: TabId = "42".parse().expect("numeric id");
        assert_eq!(tab.as_u32(), 42);
        assert!("abc".parse::<TabId>().is_err());
        assert!("0".parse::<TabId>().is_err());
        assert!("-3".parse::<TabId>().is_err());
    }

    #[test]
    fn test_tab_id_serde_transparent() {
        let tab: TabId = serde_json::from_str("12").expect("parse");
        assert_eq!(serde_json::to_string(&tab).expect("serialize"), "12");
        assert!(serde_json::from_str::<TabId>("0").is_err());
    }

    #[test]
    fn test_request_id_ready() {
        assert!(RequestId::ready().is_ready());
        assert!(!RequestId::generate().is_ready());
    }
}
