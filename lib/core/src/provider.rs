//! Identity-provider vocabulary.
//!
//! The gateway brokers login against a fixed set of external OAuth2
//! providers. Provider-specific endpoint and protocol differences live in
//! configuration; this enum is only the shared name space used in URLs,
//! tokens, session records, and audit events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An external OAuth2 identity provider supported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Kakao,
    Naver,
}

impl Provider {
    /// Returns the lowercase wire name of the provider, as it appears in
    /// URL paths and stored records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Kakao => "kakao",
            Self::Naver => "naver",
        }
    }

    /// All providers the gateway knows about.
    #[must_use]
    pub const fn all() -> [Provider; 3] {
        [Self::Google, Self::Kakao, Self::Naver]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProviderError {
    /// The name that failed to parse.
    pub name: String,
}

impl fmt::Display for ParseProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider: '{}'", self.name)
    }
}

impl std::error::Error for ParseProviderError {}

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "kakao" => Ok(Self::Kakao),
            "naver" => Ok(Self::Naver),
            other => Err(ParseProviderError {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_display_is_lowercase() {
        assert_eq!(Provider::Google.to_string(), "google");
        assert_eq!(Provider::Kakao.to_string(), "kakao");
        assert_eq!(Provider::Naver.to_string(), "naver");
    }

    #[test]
    fn provider_parse_roundtrip() {
        for provider in Provider::all() {
            let parsed: Provider = provider.as_str().parse().expect("should parse");
            assert_eq!(parsed, provider);
        }
    }

    #[test]
    fn provider_parse_unknown_fails() {
        let result: Result<Provider, _> = "github".parse();
        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("github"));
    }

    #[test]
    fn provider_serde_uses_wire_name() {
        let json = serde_json::to_string(&Provider::Naver).expect("serialize");
        assert_eq!(json, "\"naver\"");
        let parsed: Provider = serde_json::from_str("\"kakao\"").expect("deserialize");
        assert_eq!(parsed, Provider::Kakao);
    }
}
