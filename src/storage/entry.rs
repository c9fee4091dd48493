//! Entry Types
//!
//! Expiration instants and the textual entry format used for bulk loading.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Absolute expiration of an entry.
///
/// Variant order makes `Never` compare greater than every `At`, including
/// `At(u64::MAX)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expiry {
    At(u64),
    Never,
}

impl Expiry {
    /// Expiration for a TTL applied at `now`; a TTL of 0 never expires
    pub fn from_ttl(now: u64, ttl: u32) -> Self {
        if ttl == 0 {
            Expiry::Never
        } else {
            Expiry::At(now.saturating_add(u64::from(ttl)))
        }
    }

    /// An entry is expired once `now` reaches its expiration
    #[inline]
    pub fn is_expired(&self, now: u64) -> bool {
        match self {
            Expiry::At(t) => *t <= now,
            Expiry::Never => false,
        }
    }

    pub fn as_ticks(&self) -> Option<u64> {
        match self {
            Expiry::At(t) => Some(*t),
            Expiry::Never => None,
        }
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::At(t) => write!(f, "{}", t),
            Expiry::Never => f.write_str("never"),
        }
    }
}

/// One `(key, value, ttl)` triple for bulk loading.
///
/// Parses from `key=value` or `key=value:ttl`. A trailing `:<digits>` is read
/// as the TTL; anything else after the last `:` stays part of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySpec {
    pub key: String,
    pub value: String,
    pub ttl: u32,
}

impl EntrySpec {
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: u32) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }

    pub fn into_tuple(self) -> (String, String, u32) {
        (self.key, self.value, self.ttl)
    }
}

impl FromStr for EntrySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, rest) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidEntry(format!("missing '=' in {:?}", s)))?;
        if key.is_empty() {
            return Err(Error::InvalidEntry(format!("empty key in {:?}", s)));
        }

        let (value, ttl) = match rest.rsplit_once(':') {
            Some((value, ttl)) if !ttl.is_empty() && ttl.bytes().all(|b| b.is_ascii_digit()) => {
                let ttl = ttl
                    .parse::<u32>()
                    .map_err(|e| Error::InvalidEntry(format!("ttl {:?}: {}", ttl, e)))?;
                (value, ttl)
            }
            _ => (rest, 0),
        };

        Ok(Self::new(key, value, ttl))
    }
}

impl From<EntrySpec> for (String, String, u32) {
    fn from(spec: EntrySpec) -> Self {
        spec.into_tuple()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_sorts_last() {
        assert!(Expiry::At(u64::MAX) < Expiry::Never);
        assert!(Expiry::At(1) < Expiry::At(2));
        assert!(!Expiry::Never.is_expired(u64::MAX));
    }

    #[test]
    fn test_expiry_boundary() {
        let expiry = Expiry::from_ttl(10, 5);
        assert_eq!(expiry, Expiry::At(15));
        assert!(!expiry.is_expired(14));
        assert!(expiry.is_expired(15));
        assert_eq!(Expiry::from_ttl(10, 0), Expiry::Never);
        assert_eq!(Expiry::from_ttl(u64::MAX, 1), Expiry::At(u64::MAX));
    }

    #[test]
    fn test_parse_entry() {
        assert_eq!("a=k1:5".parse::<EntrySpec>(), Ok(EntrySpec::new("a", "k1", 5)));
        assert_eq!("a=k1".parse::<EntrySpec>(), Ok(EntrySpec::new("a", "k1", 0)));
        assert_eq!(
            "url=http://host".parse::<EntrySpec>(),
            Ok(EntrySpec::new("url", "http://host", 0))
        );
        assert_eq!("a=:3".parse::<EntrySpec>(), Ok(EntrySpec::new("a", "", 3)));
    }

    #[test]
    fn test_parse_entry_errors() {
        assert!(matches!("novalue".parse::<EntrySpec>(), Err(Error::InvalidEntry(_))));
        assert!(matches!("=v".parse::<EntrySpec>(), Err(Error::InvalidEntry(_))));
        assert!(matches!(
            "a=v:99999999999".parse::<EntrySpec>(),
            Err(Error::InvalidEntry(_))
        ));
    }
}
