// This file is part of the product Depo.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Namespaced metadata key in the textual form `namespace:name`.
///
/// Parsing never fails with an error: a raw string that does not match the
/// two-segment format simply yields no key. It is the collector's job to turn
/// that into a request-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaKey {
    namespace: String,
    name: String,
}

pub type MetadataMap = HashMap<MetaKey, String>;

impl MetaKey {
    pub fn parse(raw: &str) -> Option<MetaKey> {
        let (namespace, name) = raw.split_once(':')?;
        if !is_token(namespace) || !is_token(name) {
            return None;
        }
        Some(MetaKey {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> MetaKey {
        MetaKey {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

fn is_token(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[derive(Debug)]
pub struct MetaKeyError {
    message: String,
}

impl MetaKeyError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for MetaKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for MetaKeyError {}

/// Builds the metadata set for one upload from the raw query string.
///
/// The first value per key wins; later duplicates are ignored, not merged.
/// Any key that fails to parse rejects the whole request.
pub fn collect_metadata(query: &str) -> Result<MetadataMap, MetaKeyError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|err| MetaKeyError::new(format!("Invalid query string: {}", err)))?;

    let mut result = MetadataMap::new();
    for (raw_key, value) in pairs {
        let Some(key) = MetaKey::parse(&raw_key) else {
            return Err(MetaKeyError::new(format!(
                "Invalid meta data key format: {}",
                raw_key
            )));
        };
        result.entry(key).or_insert(value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_segment_keys() {
        let key = MetaKey::parse("mvn:groupId").expect("valid key");
        assert_eq!(key.namespace(), "mvn");
        assert_eq!(key.name(), "groupId");
        assert_eq!(key.to_string(), "mvn:groupId");
    }

    #[test]
    fn rejects_malformed_keys() {
        for raw in ["", "plain", ":name", "ns:", ":", "a:b:c", "a b:c", "ns:na me"] {
            assert!(MetaKey::parse(raw).is_none(), "should reject {:?}", raw);
        }
    }

    #[test]
    fn accepts_token_punctuation() {
        assert!(MetaKey::parse("osgi.bundle:symbolic-name").is_some());
        assert!(MetaKey::parse("deb_src:section").is_some());
    }

    #[test]
    fn first_value_wins_for_duplicate_keys() {
        let metadata = collect_metadata("ns:key=v1&ns:key=v2").expect("valid query");
        assert_eq!(metadata.len(), 1);
        assert_eq!(
            metadata.get(&MetaKey::new("ns", "key")).map(String::as_str),
            Some("v1")
        );
    }

    #[test]
    fn malformed_key_rejects_whole_request() {
        let err = collect_metadata("a:b=1&x=y").expect_err("x is not namespaced");
        assert_eq!(err.to_string(), "Invalid meta data key format: x");
    }

    #[test]
    fn empty_query_yields_empty_metadata() {
        let metadata = collect_metadata("").expect("empty query");
        assert!(metadata.is_empty());
    }

    #[test]
    fn percent_encoded_values_are_decoded() {
        let metadata = collect_metadata("mvn:artifactId=my%20artifact").expect("valid query");
        assert_eq!(
            metadata
                .get(&MetaKey::new("mvn", "artifactId"))
                .map(String::as_str),
            Some("my artifact")
        );
    }
}
