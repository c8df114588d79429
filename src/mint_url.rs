//! Mint base url

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{ParseError, Url};

use crate::ensure;

/// Url Error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Url error
    #[error(transparent)]
    Url(#[from] ParseError),
    /// Invalid URL structure
    #[error("Invalid URL")]
    InvalidUrl,
}

/// A mint's base URL in canonical form
///
/// Mints are identified by their URL string, so two spellings of the same
/// mint must compare equal. Scheme and host are case insensitive and are
/// stored lowercased, the path keeps its case (it routes), and trailing
/// slashes carry no meaning and are dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MintUrl(String);

impl MintUrl {
    fn canonicalize(url: &str) -> Result<String, Error> {
        let url = url.trim().trim_end_matches('/');

        let (scheme, remainder) = url.split_once("://").ok_or(Error::InvalidUrl)?;

        let (host, path) = match remainder.split_once('/') {
            Some((host, path)) => (host, Some(path)),
            None => (remainder, None),
        };
        ensure!(!scheme.is_empty() && !host.is_empty(), Error::InvalidUrl);

        let mut canonical = format!(
            "{}://{}",
            scheme.to_ascii_lowercase(),
            host.to_ascii_lowercase()
        );
        if let Some(path) = path {
            canonical.push('/');
            canonical.push_str(path);
        }

        Ok(canonical)
    }

    /// Append path segments onto the URL
    pub fn join_paths(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = Url::parse(&self.0)?;

        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl)?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

impl FromStr for MintUrl {
    type Err = Error;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        Self::canonicalize(url).map(Self)
    }
}

impl fmt::Display for MintUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for MintUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MintUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_canonical_form() {
        // Scheme and host fold to lowercase, the path does not
        let url = MintUrl::from_str("HTTPS://Mint.Example.COM/Some/Path").unwrap();
        assert_eq!(url.to_string(), "https://mint.example.com/Some/Path");

        // Trailing slashes are dropped however many there are
        for spelling in [
            "https://mint.example.com",
            "https://mint.example.com/",
            "https://mint.example.com///",
        ] {
            let url = MintUrl::from_str(spelling).unwrap();
            assert_eq!(url.to_string(), "https://mint.example.com");
        }
    }

    #[test]
    fn test_spellings_of_same_mint_compare_equal() {
        let with_slash: MintUrl = "https://mint.minibits.cash/Bitcoin/".parse().unwrap();
        let without_slash: MintUrl = "https://mint.minibits.cash/Bitcoin".parse().unwrap();
        let cased: MintUrl = "https://MINT.minibits.cash/Bitcoin".parse().unwrap();

        assert_eq!(with_slash, without_slash);
        assert_eq!(with_slash, cased);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "   ", "no-scheme.example.com", "https://", "://host"] {
            assert!(MintUrl::from_str(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_join_paths() {
        let url: MintUrl = "https://mint.example.com".parse().unwrap();
        assert_eq!(
            url.join_paths(&["v1", "keysets"]).unwrap().to_string(),
            "https://mint.example.com/v1/keysets"
        );

        // A base path is kept in front of the joined segments
        let url: MintUrl = "https://mint.example.com/Bitcoin/".parse().unwrap();
        assert_eq!(
            url.join_paths(&["v1", "swap"]).unwrap().to_string(),
            "https://mint.example.com/Bitcoin/v1/swap"
        );
    }
}
