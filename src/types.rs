//! Identifier and record types shared across the gateway
//!
//! Wire messages carry identifiers as raw byte strings. These newtypes pin
//! the sizes down once, at the boundary, so the rest of the crate never
//! handles an unchecked slice.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a subject public key in bytes.
pub const SUBJECT_KEY_LEN: usize = 32;

/// Length of an item or browser identifier in bytes.
pub const IDENTIFIER_LEN: usize = 16;

/// Errors raised when decoding identifiers from wire or cookie form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("{kind} must be {expected} bytes, got {actual}")]
    Length {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid base64 in {kind}: {message}")]
    Encoding { kind: &'static str, message: String },
    #[error("invalid identifier '{0}'")]
    Identifier(String),
}

/// Public key of the principal owning a set of data items
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectKey([u8; SUBJECT_KEY_LEN]);

impl SubjectKey {
    pub const fn new(bytes: [u8; SUBJECT_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let raw: [u8; SUBJECT_KEY_LEN] = bytes.try_into().map_err(|_| KeyError::Length {
            kind: "subject key",
            expected: SUBJECT_KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; SUBJECT_KEY_LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&BASE64.encode(self.0))
    }
}

impl fmt::Debug for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectKey({})", self)
    }
}

/// Identifier of a data item (and of a schema node)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        Uuid::from_slice(bytes)
            .map(Self)
            .map_err(|_| KeyError::Length {
                kind: "item identifier",
                expected: IDENTIFIER_LEN,
                actual: bytes.len(),
            })
    }

    /// Parse the hyphenated text form used in URLs and listings.
    pub fn parse(text: &str) -> Result<Self, KeyError> {
        Uuid::parse_str(text)
            .map(Self)
            .map_err(|_| KeyError::Identifier(text.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

/// Identifier a browser carries in its `userUUID` cookie
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrowserId(Uuid);

impl BrowserId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        self.0.as_bytes()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        Uuid::from_slice(bytes)
            .map(Self)
            .map_err(|_| KeyError::Length {
                kind: "browser identifier",
                expected: IDENTIFIER_LEN,
                actual: bytes.len(),
            })
    }

    /// Decode the cookie form: standard base64 of the 16 raw bytes.
    pub fn from_cookie(value: &str) -> Result<Self, KeyError> {
        let raw = BASE64.decode(value).map_err(|e| KeyError::Encoding {
            kind: "browser identifier",
            message: e.to_string(),
        })?;
        Self::from_slice(&raw)
    }

    pub fn to_cookie(&self) -> String {
        BASE64.encode(self.0.as_bytes())
    }
}

impl fmt::Debug for BrowserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BrowserId({})", self.0)
    }
}

/// Composite key matching an outstanding retrieve to its response.
///
/// Equivalent to the 48-byte concatenation subject ‖ item.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationKey {
    pub subject: SubjectKey,
    pub item: ItemId,
}

impl CorrelationKey {
    pub const LEN: usize = SUBJECT_KEY_LEN + IDENTIFIER_LEN;

    pub fn new(subject: SubjectKey, item: ItemId) -> Self {
        Self { subject, item }
    }

    /// Build a key from the raw fields of a wire message.
    pub fn from_wire(public_key: &[u8], data: &[u8]) -> Result<Self, KeyError> {
        Ok(Self {
            subject: SubjectKey::from_slice(public_key)?,
            item: ItemId::from_slice(data)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..SUBJECT_KEY_LEN].copy_from_slice(self.subject.as_bytes());
        out[SUBJECT_KEY_LEN..].copy_from_slice(self.item.as_uuid().as_bytes());
        out
    }
}

impl fmt::Debug for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CorrelationKey({} / {})", self.subject, self.item)
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject, self.item)
    }
}

/// Entitlement state of a stored item. Absent items have no record at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    /// Permission granted, payload not fetched yet (sentinel record)
    Granted,
    /// Real payload present, supplied or fetched from the authority
    Fetched,
}

impl ItemStatus {
    /// Status code exposed in the permissions listing.
    pub fn code(self) -> i32 {
        match self {
            ItemStatus::Granted => 1,
            ItemStatus::Fetched => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ItemStatus::Granted),
            2 => Some(ItemStatus::Fetched),
            _ => None,
        }
    }
}

/// Type tag written for a granted-but-not-fetched item.
pub const SENTINEL_MIME: &str = "Empty";

/// Payload written for a granted-but-not-fetched item.
pub const SENTINEL_PAYLOAD: [u8; 1] = [0];

/// A stored data item value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub mime: String,
    pub payload: Vec<u8>,
    pub status: ItemStatus,
}

impl ItemRecord {
    pub fn fetched(mime: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            payload: payload.into(),
            status: ItemStatus::Fetched,
        }
    }

    /// Placeholder recording that access was granted.
    pub fn granted() -> Self {
        Self {
            mime: SENTINEL_MIME.to_string(),
            payload: SENTINEL_PAYLOAD.to_vec(),
            status: ItemStatus::Granted,
        }
    }
}
