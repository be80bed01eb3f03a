//! Domain types shared by the resolver, the reconciler and the boundary
//!
//! - [`Hostname`]: validated caller hostname, the cache key
//! - [`Zone`]: apex name plus the provider's zone identifier
//! - [`RecordName`]: hostname relative to its zone (`@` at the apex)
//! - [`ExistingRecord`] / [`DesiredRecord`]: observed and wanted state

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Maximum length of a domain name in presentation form (RFC 1035)
const MAX_NAME_LEN: usize = 253;

/// Maximum length of a single label (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// A validated, fully-qualified hostname without its trailing dot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hostname(String);

impl Hostname {
    /// Validate a caller-supplied hostname
    ///
    /// One trailing dot is accepted and stripped. Labels may contain ASCII
    /// alphanumerics, `-` and `_` (for names such as `_acme-challenge`),
    /// and may not start or end with a hyphen. At least two labels are
    /// required: a bare TLD can never be a caller's hostname.
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.strip_suffix('.').unwrap_or(raw);

        if name.is_empty() {
            return Err(Error::invalid_input("hostname cannot be empty"));
        }

        if name.len() > MAX_NAME_LEN {
            return Err(Error::invalid_input(format!(
                "hostname too long: {} chars (max {})",
                name.len(),
                MAX_NAME_LEN
            )));
        }

        let mut labels = 0usize;
        for label in name.split('.') {
            labels += 1;

            if label.is_empty() {
                return Err(Error::invalid_input(format!(
                    "hostname has empty label: '{}'",
                    raw
                )));
            }

            if label.len() > MAX_LABEL_LEN {
                return Err(Error::invalid_input(format!(
                    "label too long: {} chars (max {}). Label: '{}'",
                    label.len(),
                    MAX_LABEL_LEN,
                    label
                )));
            }

            if !label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(Error::invalid_input(format!(
                    "label contains invalid characters: '{}'",
                    label
                )));
            }

            if label.starts_with('-') || label.ends_with('-') {
                return Err(Error::invalid_input(format!(
                    "label cannot start or end with hyphen: '{}'",
                    label
                )));
            }
        }

        if labels < 2 {
            return Err(Error::invalid_input(format!(
                "hostname must have at least two labels: '{}'",
                raw
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Labels from left to right
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn label_count(&self) -> usize {
        self.labels().count()
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Hostname {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// DNS record types dnshook publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
    #[serde(rename = "TXT")]
    Txt,
}

impl RecordType {
    /// Wire name as providers expect it
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Txt => "TXT",
        }
    }

    /// A for IPv4, AAAA for IPv6
    pub fn for_ip(ip: &std::net::IpAddr) -> Self {
        match ip {
            std::net::IpAddr::V4(_) => RecordType::A,
            std::net::IpAddr::V6(_) => RecordType::Aaaa,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque provider zone identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque provider record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved zone: its apex name and the provider's id for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Apex name without trailing dot (e.g. `example.com`)
    pub name: String,
    pub id: ZoneId,
}

/// Hostname relative to its zone
///
/// `@` at the apex, otherwise the labels left of the zone suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordName(String);

impl RecordName {
    /// Owner name used for the zone apex
    pub const APEX: &'static str = "@";

    /// Relativize `hostname` against `zone_name`
    pub fn relative_to(hostname: &Hostname, zone_name: &str) -> Result<Self> {
        let host = hostname.as_str();
        if host == zone_name {
            return Ok(Self(Self::APEX.to_string()));
        }

        host.strip_suffix(zone_name)
            .and_then(|prefix| prefix.strip_suffix('.'))
            .filter(|prefix| !prefix.is_empty())
            .map(|prefix| Self(prefix.to_string()))
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "{} is not inside zone {}",
                    hostname, zone_name
                ))
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_apex(&self) -> bool {
        self.0 == Self::APEX
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record as the provider currently holds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRecord {
    pub id: RecordId,
    pub content: String,
    pub ttl: u32,
}

/// A (type, value) pair the caller wants published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    pub record_type: RecordType,
    pub value: String,
}

impl DesiredRecord {
    pub fn new(record_type: RecordType, value: impl Into<String>) -> Self {
        Self {
            record_type,
            value: value.into(),
        }
    }

    /// A or AAAA record for an address
    pub fn for_ip(ip: std::net::IpAddr) -> Self {
        Self::new(RecordType::for_ip(&ip), ip.to_string())
    }

    pub fn txt(value: impl Into<String>) -> Self {
        Self::new(RecordType::Txt, value)
    }
}

/// What a reconciliation did to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No record existed; one was created
    Created,
    /// The primary record was rewritten
    Updated {
        /// Content before the update
        previous: String,
    },
    /// The primary record already held the desired value
    Unchanged,
    /// Existing records were deleted and a fresh one created
    Replaced {
        /// Number of records deleted before the create
        deleted: usize,
    },
    /// All records for the name/type were deleted
    Cleared {
        /// Number of records deleted
        deleted: usize,
    },
}

impl ReconcileOutcome {
    /// Whether any provider write was applied
    pub fn applied(&self) -> bool {
        match self {
            ReconcileOutcome::Unchanged => false,
            ReconcileOutcome::Cleared { deleted } => *deleted > 0,
            _ => true,
        }
    }
}
