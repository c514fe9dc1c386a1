//! Change and token model for incremental synchronization.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use xavyo_schema::QName;

use crate::error::{ConnectorError, ConnectorResult};
use crate::operation::{AttributeSet, ResourceObject};
use crate::types::ChangeType;

/// Opaque watermark of a resource's change history.
///
/// The bytes are driver-defined. A token is only meaningful together with
/// the object class and resource that produced it, so tokens are never
/// compared by the framework and do not implement `PartialEq`.
#[derive(Clone)]
pub struct Token {
    bytes: Vec<u8>,
}

impl Token {
    /// Create a token from driver-defined bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Create a token from a monotonic sequence number.
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self::from_bytes(sequence.to_be_bytes())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read the token as a sequence number, if it was created from one.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        let bytes: [u8; 8] = self.bytes.as_slice().try_into().ok()?;
        Some(u64::from_be_bytes(bytes))
    }

    /// Persistable form (URL-safe base64).
    #[must_use]
    pub fn to_serialized(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.bytes)
    }

    /// Inverse of [`to_serialized`](Self::to_serialized).
    pub fn parse_serialized(serialized: &str) -> ConnectorResult<Self> {
        URL_SAFE_NO_PAD
            .decode(serialized.trim().trim_end_matches('='))
            .map(Self::from_bytes)
            .map_err(|e| ConnectorError::generic_framework_with_source("invalid serialized token", e))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.to_serialized()).finish()
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_serialized())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Token::parse_serialized(&s).map_err(serde::de::Error::custom)
    }
}

/// One detected change of a native object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub object_class: QName,
    /// Identifiers of the changed object.
    pub identifiers: AttributeSet,
    pub change_type: ChangeType,
    /// Current state of the object, when the resource supplies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<ResourceObject>,
    /// Position of this change; resuming from it skips everything up to and including it.
    pub token: Token,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Change {
    #[must_use]
    pub fn new(
        object_class: QName,
        identifiers: AttributeSet,
        change_type: ChangeType,
        token: Token,
    ) -> Self {
        Self {
            object_class,
            identifiers,
            change_type,
            current: None,
            token,
            timestamp: None,
        }
    }

    /// Attach the current object state.
    #[must_use]
    pub fn with_current(mut self, current: ResourceObject) -> Self {
        self.current = Some(current);
        self
    }

    /// Set when the change happened on the resource.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.change_type == ChangeType::Delete
    }
}
