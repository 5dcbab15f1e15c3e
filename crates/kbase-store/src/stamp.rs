//! Document version stamps
//!
//! A [`VersionStamp`] is the Blake3 hash of a document's bytes as they were
//! read. Comparing it with a fresh hash of the file detects writes made by
//! someone else in between.

use std::fmt::{self, Display, Formatter};

/// A 32-byte Blake3 hash of file contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionStamp([u8; 32]);

impl VersionStamp {
    /// Hash arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for VersionStamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Render an optional stamp, `absent` for files that did not exist
pub(crate) fn describe(stamp: Option<VersionStamp>) -> String {
    stamp.map_or_else(|| "absent".to_string(), |s| s.short())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_tracks_content() {
        let a = VersionStamp::compute(b"{}");
        let b = VersionStamp::compute(b"{}");
        let c = VersionStamp::compute(b"{ }");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.short().len(), 16);
        assert_eq!(a.to_string().len(), 64);
    }

    #[test]
    fn absent_description() {
        assert_eq!(describe(None), "absent");
    }
}
