#![deny(unsafe_code)]

use std::fmt;

/// A deterministic row fingerprint, rendered as lowercase hex.
///
/// Identity fingerprints name a logical record; content fingerprints name
/// its approximate numeric payload; a combined fingerprint is the
/// concatenation of the two.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn concat(&self, other: &Fingerprint) -> Fingerprint {
        Fingerprint(format!("{}{}", self.0, other.0))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
