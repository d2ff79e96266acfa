use serde::{Deserialize, Serialize};

/// Placeholder a provider uses for the zone apex
pub const APEX: &str = "@";

/// DNS record type as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// Canonical name record
    Cname,
    /// Anything else (AAAA, MX, TXT, ...)
    Other(String),
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        match value.trim() {
            "A" => Self::A,
            "CNAME" => Self::Cname,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::A => "A".to_string(),
            RecordType::Cname => "CNAME".to_string(),
            RecordType::Other(other) => other,
        }
    }
}

/// A single resource record inside a provider zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Leaf name relative to the zone (`@` for the apex)
    pub name: String,

    /// Record type
    pub record_type: RecordType,
}

impl ZoneRecord {
    /// Create a record
    #[must_use]
    pub fn new(name: impl Into<String>, record_type: impl Into<RecordType>) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
        }
    }

    /// Returns true for A and CNAME records that are not the zone apex
    #[must_use]
    pub fn is_probe_target(&self) -> bool {
        matches!(self.record_type, RecordType::A | RecordType::Cname) && self.name != APEX
    }

    /// Join the leaf name with its zone
    #[must_use]
    pub fn fqdn(&self, zone: &str) -> String {
        format!("{}.{}", self.name, zone)
    }
}

/// Apply the selection policy to every record of one zone.
pub fn probe_targets<'a, I>(records: I, zone: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a ZoneRecord>,
{
    records
        .into_iter()
        .filter(|r| r.is_probe_target())
        .map(|r| r.fqdn(zone))
        .collect()
}
