//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Maximum length of a player identifier
pub const PLAYER_ID_MAX_LEN: usize = 100;

/// Number of characters in a session code
pub const SESSION_CODE_LEN: usize = 4;

/// Characters a session code is drawn from (no `I` or `O`, which read like digits)
pub const SESSION_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Maximum length of a player or team name
pub const NAME_MAX_LEN: usize = 32;

/// Maximum size of a drawing payload in bytes (2 MiB)
pub const DRAWING_MAX_BYTES: usize = 2 * 1024 * 1024;

/// Player identifier value object.
///
/// Opaque and stable for the lifetime of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a new PlayerId.
    ///
    /// # Arguments
    ///
    /// * `id` - The connection identifier string
    ///
    /// # Returns
    ///
    /// A Result containing the PlayerId or an error if validation fails
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::PlayerIdEmpty);
        }
        let len = id.chars().count();
        if len > PLAYER_ID_MAX_LEN {
            return Err(ValueObjectError::PlayerIdTooLong {
                max: PLAYER_ID_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for PlayerId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session code value object.
///
/// Short, human-typeable code that players share to join a session.
/// Lower-case input is accepted and normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionCode(String);

impl SessionCode {
    /// Create a new SessionCode.
    pub fn new(code: String) -> Result<Self, ValueObjectError> {
        let code = code.trim().to_ascii_uppercase();
        let len = code.chars().count();
        if len != SESSION_CODE_LEN {
            return Err(ValueObjectError::SessionCodeInvalidLength {
                expected: SESSION_CODE_LEN,
                actual: len,
            });
        }
        if let Some(invalid) = code
            .chars()
            .find(|c| !c.is_ascii() || !SESSION_CODE_ALPHABET.contains(&(*c as u8)))
        {
            return Err(ValueObjectError::SessionCodeInvalidCharacter(invalid));
        }
        Ok(Self(code))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionCode {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_name(
    raw: String,
    empty: ValueObjectError,
    too_long: impl FnOnce(usize) -> ValueObjectError,
) -> Result<String, ValueObjectError> {
    let name = raw.trim().to_string();
    if name.is_empty() {
        return Err(empty);
    }
    let len = name.chars().count();
    if len > NAME_MAX_LEN {
        return Err(too_long(len));
    }
    Ok(name)
}

/// Display name chosen by a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    /// Create a new PlayerName. Surrounding whitespace is trimmed.
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        validate_name(name, ValueObjectError::PlayerNameEmpty, |actual| {
            ValueObjectError::PlayerNameTooLong {
                max: NAME_MAX_LEN,
                actual,
            }
        })
        .map(Self)
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of the team a player plays for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamName(String);

impl TeamName {
    /// Create a new TeamName. Surrounding whitespace is trimmed.
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        validate_name(name, ValueObjectError::TeamNameEmpty, |actual| {
            ValueObjectError::TeamNameTooLong {
                max: NAME_MAX_LEN,
                actual,
            }
        })
        .map(Self)
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short text description players draw to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prompt(String);

impl Prompt {
    /// Create a new Prompt.
    pub fn new(text: String) -> Result<Self, ValueObjectError> {
        if text.trim().is_empty() {
            return Err(ValueObjectError::PromptEmpty);
        }
        Ok(Self(text))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact, case-sensitive comparison against a guess.
    pub fn matches(&self, guess: &str) -> bool {
        self.0 == guess
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player-submitted drawing.
///
/// The payload format (data URL, stroke JSON, ...) belongs to the client; only its size is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawing(String);

impl Drawing {
    /// Create a new Drawing.
    pub fn new(payload: String) -> Result<Self, ValueObjectError> {
        if payload.is_empty() {
            return Err(ValueObjectError::DrawingEmpty);
        }
        if payload.len() > DRAWING_MAX_BYTES {
            return Err(ValueObjectError::DrawingTooLarge {
                max: DRAWING_MAX_BYTES,
                actual: payload.len(),
            });
        }
        Ok(Self(payload))
    }

    /// Get the inner payload.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (JST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
