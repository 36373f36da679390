//! The JSON documents held by the blob sub-store.
//!
//! Optional fields are skipped when absent so a document's canonical
//! serialization, and with it the blob id, is stable.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The details of one "vulnerability affects package" fact: aliases, version
/// ranges, fix state, and packaging qualifiers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AffectedPackageBlob {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cves: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifiers: Option<AffectedPackageQualifiers>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<AffectedRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AffectedPackageQualifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm_modularity: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platform_cpes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AffectedRange {
    pub version: AffectedVersion,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AffectedVersion {
    /// The version scheme the constraint is expressed in (semver, rpm, deb, …).
    #[serde(default, skip_serializing_if = "String::is_empty", rename = "type")]
    pub version_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub constraint: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<FixDetail>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub url: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// The detailed vulnerability document referenced by a vulnerability handle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityBlob {
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigners: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub severities: Vec<Severity>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Severity {
    /// The severity scheme (CVSS_V3, HML, …).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scheme: String,

    /// The severity value under the scheme; shape depends on the scheme.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub value: serde_json::Value,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
}
