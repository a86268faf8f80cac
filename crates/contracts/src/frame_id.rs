//! FrameId - Cheap-to-clone coordinate frame identifier
//!
//! Uses Arc<str> internally; every message header carries one and it is
//! cloned into each emitted frame.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Coordinate frame identifier with cheap cloning.
///
/// # Examples
/// ```
/// use contracts::FrameId;
///
/// let id: FrameId = "camera_left".into();
/// let id2 = id.clone();
/// assert_eq!(id, id2);
/// assert_eq!(id.as_str(), "camera_left");
/// ```
#[derive(Clone, Default)]
pub struct FrameId(Arc<str>);

impl FrameId {
    /// Create a new FrameId from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is the empty string (unset header)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for FrameId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for FrameId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FrameId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FrameId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for FrameId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({:?})", self.0)
    }
}

impl PartialEq for FrameId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for FrameId {}

impl PartialEq<str> for FrameId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for FrameId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

// Same as str hash so lookups by &str work in maps
impl Hash for FrameId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for FrameId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FrameId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_shares_storage() {
        let id1: FrameId = "camera_left".into();
        let id2 = id1.clone();
        assert_eq!(id1.as_str().as_ptr(), id2.as_str().as_ptr());
    }

    #[test]
    fn test_equality_with_strings() {
        let id: FrameId = "base_link".into();
        assert_eq!(id, "base_link");
        assert_eq!(id, FrameId::from(String::from("base_link")));
        assert!(!id.is_empty());
        assert!(FrameId::default().is_empty());
    }

    #[test]
    fn test_map_lookup_by_str() {
        let mut map: HashMap<FrameId, i32> = HashMap::new();
        map.insert("camera_left".into(), 1);
        assert_eq!(map.get("camera_left"), Some(&1));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id: FrameId = "camera_right".into();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"camera_right\"");
        let parsed: FrameId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
