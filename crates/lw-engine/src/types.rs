//! Core access-log entry and parse accounting types.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// How many failure descriptions a [`ParsingStats`] snapshot retains.
///
/// The error *count* is always exact; only the human-readable list is
/// capped so a pathological file cannot balloon the stats object.
pub const MAX_RECORDED_FAILURES: usize = 10;

// ── HTTP Method ───────────────────────────────────────────────

/// HTTP request method from the request line.
///
/// Unrecognized verbs (WebDAV extensions, typos) are kept verbatim in
/// `Other` rather than failing the line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Other(String),
}

impl HttpMethod {
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Other(token) => token,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::from_token(&token))
    }
}

// ── Log Entry ─────────────────────────────────────────────────

/// One successfully parsed access-log record.
///
/// Immutable once built: the parser constructs it, the aggregator only
/// reads it. Status code and response size are always present (CLF `-`
/// sizes map to 0); referrer, user agent, and response time degrade to
/// `None` when the format does not carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub ip_address: Ipv4Addr,
    /// Instant plus the offset the line itself declared (UTC when the
    /// line had none and the resolver fell back).
    pub timestamp: DateTime<FixedOffset>,
    pub method: HttpMethod,
    pub path: String,
    /// Protocol token as written, e.g. "HTTP/1.1".
    pub protocol: String,
    pub status_code: u16,
    /// Bytes; CLF `-` is recorded as 0.
    pub response_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Seconds; only Extended-format lines carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

impl LogEntry {
    /// 4xx or 5xx response.
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }
}

// ── Parse Failures ────────────────────────────────────────────

/// Why a line could not be mapped to a [`LogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// No format pattern matched the line structure.
    MalformedStructure,
    /// Timestamp unparseable or offset outside UTC-12:00..UTC+14:00.
    InvalidTimestamp,
    /// Status code not an integer in 100..=599.
    InvalidStatusCode,
    /// Client address is not a dotted-quad IPv4 address.
    InvalidIp,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedStructure => "malformed-structure",
            Self::InvalidTimestamp => "invalid-timestamp",
            Self::InvalidStatusCode => "invalid-status-code",
            Self::InvalidIp => "invalid-ip",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line that failed to parse, with enough context to report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseFailure {
    /// 1-based line number in the source file.
    pub line_number: usize,
    /// The raw line text as handed to the parser.
    pub line: String,
    pub reason: FailureReason,
    /// Offending token or expected shape, for operator-facing messages.
    pub detail: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reason, self.detail)
    }
}

// ── Parsing Stats ─────────────────────────────────────────────

/// Accounting for one parse pass, snapshotted at end-of-stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsingStats {
    pub parsed_count: u64,
    pub error_count: u64,
    /// parsed / (parsed + errors); 0.0 when no lines were seen.
    pub success_rate: f64,
    /// First [`MAX_RECORDED_FAILURES`] failures as "Line N: reason: detail".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ParsingStats {
    pub fn new(parsed_count: u64, error_count: u64, errors: Vec<String>) -> Self {
        let attempted = parsed_count + error_count;
        let success_rate = if attempted > 0 {
            parsed_count as f64 / attempted as f64
        } else {
            0.0
        };
        Self {
            parsed_count,
            error_count,
            success_rate,
            errors,
        }
    }
}
