//! Keyboard key definitions and utilities.
//!
//! Maps the key names accepted by `pressKey` onto the `key`/`code`/keyCode
//! triple the automation channel expects, and encodes modifier flags.
//!
//! # Example
//!
//! ```ignore
//! use tabpilot::browser::keyboard::{KeyStroke, Modifier, Modifiers};
//!
//! let stroke = KeyStroke::resolve("Enter");
//! assert_eq!(stroke.key_code, 13);
//!
//! let mods: Modifiers = [Modifier::Control, Modifier::Shift].into_iter().collect();
//! assert_eq!(mods.bits(), 10);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Key Enum
// ============================================================================

/// Named keys with fixed properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // ========================================================================
    // Navigation & Control
    // ========================================================================
    /// Enter/Return key
    Enter,
    /// Tab key
    Tab,
    /// Escape key
    Escape,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Space bar
    Space,

    // ========================================================================
    // Arrow Keys
    // ========================================================================
    /// Arrow Up
    ArrowUp,
    /// Arrow Down
    ArrowDown,
    /// Arrow Left
    ArrowLeft,
    /// Arrow Right
    ArrowRight,

    // ========================================================================
    // Page Navigation
    // ========================================================================
    /// Home key
    Home,
    /// End key
    End,
    /// Page Up key
    PageUp,
    /// Page Down key
    PageDown,
}

impl Key {
    /// Looks up a named key. Matching is exact, as on the DOM `key` property.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" => Self::Escape,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Space" | " " => Self::Space,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            _ => return None,
        };
        Some(key)
    }

    /// Returns the key properties: (key, code, keyCode, printable).
    #[must_use]
    pub fn properties(self) -> (&'static str, &'static str, u32, bool) {
        match self {
            Key::Enter => ("Enter", "Enter", 13, false),
            Key::Tab => ("Tab", "Tab", 9, false),
            Key::Escape => ("Escape", "Escape", 27, false),
            Key::Backspace => ("Backspace", "Backspace", 8, false),
            Key::Delete => ("Delete", "Delete", 46, false),
            Key::Space => (" ", "Space", 32, true),
            Key::ArrowUp => ("ArrowUp", "ArrowUp", 38, false),
            Key::ArrowDown => ("ArrowDown", "ArrowDown", 40, false),
            Key::ArrowLeft => ("ArrowLeft", "ArrowLeft", 37, false),
            Key::ArrowRight => ("ArrowRight", "ArrowRight", 39, false),
            Key::Home => ("Home", "Home", 36, false),
            Key::End => ("End", "End", 35, false),
            Key::PageUp => ("PageUp", "PageUp", 33, false),
            Key::PageDown => ("PageDown", "PageDown", 34, false),
        }
    }
}

// ============================================================================
// KeyStroke
// ============================================================================

/// Fully resolved key ready for `Input.dispatchKeyEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStroke {
    /// DOM `key` value.
    pub key: String,
    /// DOM `code` value.
    pub code: String,
    /// Legacy virtual key code, 0 when unknown.
    pub key_code: u32,
    /// Text for the `char` event, if the key is printable.
    pub text: Option<String>,
}

impl KeyStroke {
    /// Resolves a key name or a single character.
    ///
    /// Named keys use the fixed table. A single character maps to its
    /// uppercase char code, `Key{C}` for letters and `Digit{d}` for digits.
    /// Anything else passes through with key code 0.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        if let Some(key) = Key::from_name(name) {
            let (key_value, code, key_code, printable) = key.properties();
            return Self {
                key: key_value.to_string(),
                code: code.to_string(),
                key_code,
                text: printable.then(|| key_value.to_string()),
            };
        }

        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            let upper = ch.to_uppercase().next().unwrap_or(ch);
            let code = if ch.is_ascii_alphabetic() {
                format!("Key{upper}")
            } else if ch.is_ascii_digit() {
                format!("Digit{ch}")
            } else {
                String::new()
            };
            return Self {
                key: ch.to_string(),
                code,
                key_code: u32::from(upper),
                text: Some(ch.to_string()),
            };
        }

        Self {
            key: name.to_string(),
            code: name.to_string(),
            key_code: 0,
            text: None,
        }
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// A keyboard modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Alt / Option.
    Alt,
    /// Control.
    #[serde(alias = "Ctrl")]
    Control,
    /// Meta / Command.
    #[serde(alias = "Cmd", alias = "Command")]
    Meta,
    /// Shift.
    Shift,
}

impl Modifier {
    /// Bit value on the automation channel.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Alt => 1,
            Self::Control => 2,
            Self::Meta => 4,
            Self::Shift => 8,
        }
    }

    /// Select-all modifier for the platform this crate runs on.
    #[inline]
    #[must_use]
    pub const fn platform_select_all() -> Self {
        if cfg!(target_os = "macos") {
            Self::Meta
        } else {
            Self::Control
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Alt => "Alt",
            Self::Control => "Control",
            Self::Meta => "Meta",
            Self::Shift => "Shift",
        };
        f.write_str(name)
    }
}

/// Set of modifiers, encoded as a bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    /// Returns the bit field.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if `modifier` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    /// Returns `true` when Control or Meta is held, which suppresses text input.
    #[inline]
    #[must_use]
    pub const fn suppresses_text(self) -> bool {
        self.contains(Modifier::Control) || self.contains(Modifier::Meta)
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        Self(iter.into_iter().fold(0, |acc, m| acc | m.bit()))
    }
}

impl From<Modifier> for Modifiers {
    fn from(modifier: Modifier) -> Self {
        Self(modifier.bit())
    }
}

// ============================================================================
// Tests
// ============================================================================
