//! Results of the explorer lookups for a candidate contract.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// One entry of the explorer's `getsourcecode` result list.
///
/// Every field is optional because explorers disagree on the shape of this
/// payload, and unverified contracts often come back with empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCodeEntry {
    /// Flattened source, or `""`/`"null"` when unverified.
    pub source_code: Option<String>,
    /// Contract name as registered with the explorer.
    pub contract_name: Option<String>,
    /// Solidity/Vyper compiler version string.
    pub compiler_version: Option<String>,
}

impl SourceCodeEntry {
    /// Reads an entry field by field so that a single mistyped field does
    /// not discard the others.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_owned);
        Some(Self {
            source_code: text("SourceCode"),
            contract_name: text("ContractName"),
            compiler_version: text("CompilerVersion"),
        })
    }
}

/// Decides whether an explorer entry describes a verified contract.
pub fn is_verified(entry: Option<&SourceCodeEntry>) -> bool {
    let Some(entry) = entry else {
        return false;
    };
    let has_source = entry
        .source_code
        .as_deref()
        .map(str::trim)
        .is_some_and(|source| !source.is_empty() && source != "null");
    let has_name = entry.contract_name.as_deref().is_some_and(|name| !name.is_empty());
    has_source || has_name
}

/// Outcome of the source verification lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationRecord {
    /// Whether the contract source is publicly verified.
    pub verified: bool,
    /// Contract name, when the explorer returned a non-empty one.
    pub contract_name: Option<String>,
    /// Compiler version, when the explorer returned a non-empty one.
    pub compiler_version: Option<String>,
    /// The raw result entry, kept for diagnostics.
    pub raw_source_payload: Option<Value>,
}

impl VerificationRecord {
    /// A record for a contract that could not be shown to be verified.
    pub fn unverified() -> Self {
        Self::default()
    }

    /// Builds a record from the first result entry of a `getsourcecode` call.
    pub fn from_entry(raw: Option<&Value>) -> Self {
        let entry = raw.and_then(SourceCodeEntry::from_value);
        let non_empty = |field: Option<String>| field.filter(|s| !s.trim().is_empty());
        let verified = is_verified(entry.as_ref());
        let entry = entry.unwrap_or_default();
        Self {
            verified,
            contract_name: non_empty(entry.contract_name),
            compiler_version: non_empty(entry.compiler_version),
            raw_source_payload: raw.cloned(),
        }
    }
}

/// Social link kinds rendered in alerts, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialKind {
    /// Project website.
    Website,
    /// Twitter / X profile.
    Twitter,
    /// Discord invite.
    Discord,
    /// Telegram group or channel.
    Telegram,
}

impl SocialKind {
    /// All kinds in display order.
    pub const ALL: [SocialKind; 4] =
        [SocialKind::Website, SocialKind::Twitter, SocialKind::Discord, SocialKind::Telegram];

    /// Keys under which the explorer may report this link.
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            SocialKind::Website => &["website"],
            SocialKind::Twitter => &["twitter", "x"],
            SocialKind::Discord => &["discord"],
            SocialKind::Telegram => &["telegram"],
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            SocialKind::Website => "Website",
            SocialKind::Twitter => "Twitter",
            SocialKind::Discord => "Discord",
            SocialKind::Telegram => "Telegram",
        }
    }
}

/// Off-chain metadata about a contract. Empty is a valid state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Known social links, iterated in [`SocialKind`] order.
    pub social_links: BTreeMap<SocialKind, String>,
}

impl MetadataRecord {
    /// Extracts the known, non-empty links from a `links` object.
    pub fn from_links(links: Option<&Value>) -> Self {
        let Some(links) = links.and_then(Value::as_object) else {
            return Self::default();
        };
        let social_links = SocialKind::ALL
            .into_iter()
            .filter_map(|kind| {
                kind.keys()
                    .iter()
                    .filter_map(|key| links.get(*key).and_then(Value::as_str))
                    .map(str::trim)
                    .find(|url| !url.is_empty())
                    .map(|url| (kind, url.to_string()))
            })
            .collect();
        Self { social_links }
    }

    /// Returns `true` when no known link is present.
    pub fn is_empty(&self) -> bool {
        self.social_links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entry(source: Option<&str>, name: Option<&str>) -> SourceCodeEntry {
        SourceCodeEntry {
            source_code: source.map(str::to_owned),
            contract_name: name.map(str::to_owned),
            compiler_version: None,
        }
    }

    #[test]
    fn test_is_verified_truth_table() {
        assert!(is_verified(Some(&entry(Some("contract Foo {}"), None))));
        assert!(is_verified(Some(&entry(Some(""), Some("Foo")))));
        assert!(is_verified(Some(&entry(Some("null"), Some("Foo")))));
        assert!(is_verified(Some(&entry(None, Some("Foo")))));

        assert!(!is_verified(Some(&entry(Some(""), Some("")))));
        assert!(!is_verified(Some(&entry(Some("   \n"), None))));
        assert!(!is_verified(Some(&entry(Some(" null "), Some("")))));
        assert!(!is_verified(Some(&entry(None, None))));
        assert!(!is_verified(None));
    }

    #[test]
    fn test_source_code_entry_from_value_tolerates_bad_fields() {
        let value = json!({ "SourceCode": 42, "ContractName": "Foo", "CompilerVersion": null });
        let entry = SourceCodeEntry::from_value(&value).unwrap();

        assert_eq!(entry.source_code, None);
        assert_eq!(entry.contract_name.as_deref(), Some("Foo"));
        assert_eq!(entry.compiler_version, None);

        assert!(SourceCodeEntry::from_value(&json!("not an object")).is_none());
    }

    #[test]
    fn test_verification_record_from_entry() {
        let raw = json!({
            "SourceCode": "pragma solidity ^0.8.0;",
            "ContractName": "Token",
            "CompilerVersion": "v0.8.24+commit.e11b9ed9"
        });
        let record = VerificationRecord::from_entry(Some(&raw));

        assert!(record.verified);
        assert_eq!(record.contract_name.as_deref(), Some("Token"));
        assert_eq!(record.compiler_version.as_deref(), Some("v0.8.24+commit.e11b9ed9"));
        assert_eq!(record.raw_source_payload, Some(raw));
    }

    #[test]
    fn test_verification_record_blank_fields_become_none() {
        let raw = json!({ "SourceCode": "", "ContractName": "", "CompilerVersion": "" });
        let record = VerificationRecord::from_entry(Some(&raw));

        assert!(!record.verified);
        assert_eq!(record.contract_name, None);
        assert_eq!(record.compiler_version, None);
    }

    #[test]
    fn test_verification_record_missing_result() {
        assert_eq!(
            VerificationRecord::from_entry(None),
            VerificationRecord::unverified()
        );
    }

    #[test]
    fn test_metadata_from_links_keeps_known_kinds_in_order() {
        let links = json!({
            "telegram": "https://t.me/foo",
            "github": "https://github.com/foo",
            "x": "https://x.com/foo",
            "website": "https://foo.xyz",
            "discord": ""
        });
        let metadata = MetadataRecord::from_links(Some(&links));

        let kinds: Vec<_> = metadata.social_links.keys().copied().collect();
        assert_eq!(kinds, vec![SocialKind::Website, SocialKind::Twitter, SocialKind::Telegram]);
        assert_eq!(metadata.social_links[&SocialKind::Twitter], "https://x.com/foo");
    }

    #[test]
    fn test_metadata_from_missing_links_is_empty() {
        assert!(MetadataRecord::from_links(None).is_empty());
        assert!(MetadataRecord::from_links(Some(&json!(null))).is_empty());
        assert!(MetadataRecord::from_links(Some(&json!({ "website": null }))).is_empty());
    }
}
