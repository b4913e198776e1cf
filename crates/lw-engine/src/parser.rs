//! Access-log line parsing for Common, Combined, and Extended formats.
//!
//! The three formats are prefix-compatible supersets of each other, so
//! matching runs most-specific-first and the first structural hit wins;
//! no scoring across formats is needed. Field validation happens after
//! the structural match and maps each problem to a [`FailureReason`].

use regex::{Captures, Regex};
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use crate::timestamp;
use crate::types::{FailureReason, HttpMethod, LogEntry, ParseFailure};

// Extended: Combined plus a trailing response time in milliseconds.
static RE_EXTENDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\S+) \S+ \S+ \[([^\]]+)\] "(\S+) (\S+) (\S+)" (\d+) (\d+|-) "([^"]*)" "([^"]*)" (\d+)$"#,
    )
    .unwrap()
});

// Combined: Common plus quoted referrer and user agent.
static RE_COMBINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\S+) \S+ \S+ \[([^\]]+)\] "(\S+) (\S+) (\S+)" (\d+) (\d+|-) "([^"]*)" "([^"]*)"$"#)
        .unwrap()
});

// Common Log Format: the baseline shape.
static RE_COMMON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\S+) \S+ \S+ \[([^\]]+)\] "(\S+) (\S+) (\S+)" (\d+) (\d+|-)$"#).unwrap()
});

/// Parse one raw line into a [`LogEntry`].
///
/// `line_number` is 1-based and only used for failure reporting. Blank
/// and comment lines are the caller's concern; this function treats every
/// input as a candidate record.
pub fn parse_line(line: &str, line_number: usize) -> Result<LogEntry, ParseFailure> {
    if let Some(caps) = RE_EXTENDED.captures(line) {
        return entry_from_captures(&caps, line, line_number);
    }
    if let Some(caps) = RE_COMBINED.captures(line) {
        return entry_from_captures(&caps, line, line_number);
    }
    if let Some(caps) = RE_COMMON.captures(line) {
        return entry_from_captures(&caps, line, line_number);
    }
    Err(fail(
        line,
        line_number,
        FailureReason::MalformedStructure,
        format!("no supported log format matched: {line:.100}"),
    ))
}

/// Build an entry from a structural match. Groups 1..=7 are shared by all
/// three formats; 8/9 (referrer, user agent) and 10 (response time) exist
/// only for the richer ones.
fn entry_from_captures(
    caps: &Captures<'_>,
    line: &str,
    line_number: usize,
) -> Result<LogEntry, ParseFailure> {
    let ip_address: Ipv4Addr = caps[1].parse().map_err(|_| {
        fail(
            line,
            line_number,
            FailureReason::InvalidIp,
            format!("client address {:?} is not a dotted-quad IPv4 address", &caps[1]),
        )
    })?;

    let status_code = parse_status(&caps[6])
        .map_err(|detail| fail(line, line_number, FailureReason::InvalidStatusCode, detail))?;

    let resolved = timestamp::resolve(&caps[2])
        .map_err(|e| fail(line, line_number, FailureReason::InvalidTimestamp, e.to_string()))?;
    if resolved.fallback {
        tracing::debug!(line = line_number, "timestamp carried no offset, assuming UTC");
    }

    let response_size = parse_size(&caps[7])
        .map_err(|detail| fail(line, line_number, FailureReason::MalformedStructure, detail))?;

    let response_time = match caps.get(10) {
        Some(m) => Some(parse_response_time(m.as_str()).map_err(|detail| {
            fail(line, line_number, FailureReason::MalformedStructure, detail)
        })?),
        None => None,
    };

    Ok(LogEntry {
        ip_address,
        timestamp: resolved.timestamp,
        method: HttpMethod::from_token(&caps[3]),
        path: caps[4].to_string(),
        protocol: caps[5].to_string(),
        status_code,
        response_size,
        referrer: caps.get(8).and_then(|m| optional_field(m.as_str())),
        user_agent: caps.get(9).and_then(|m| optional_field(m.as_str())),
        response_time,
    })
}

fn parse_status(token: &str) -> Result<u16, String> {
    match token.parse::<u16>() {
        Ok(code) if (100..=599).contains(&code) => Ok(code),
        _ => Err(format!("status code {token:?} outside 100..=599")),
    }
}

/// CLF writes `-` for responses without a body; that counts as 0 bytes.
fn parse_size(token: &str) -> Result<u64, String> {
    if token == "-" {
        return Ok(0);
    }
    token
        .parse()
        .map_err(|_| format!("response size {token:?} does not fit an unsigned integer"))
}

/// The Extended trailer is milliseconds; entries store seconds.
fn parse_response_time(token: &str) -> Result<f64, String> {
    token
        .parse::<f64>()
        .map(|millis| millis / 1000.0)
        .map_err(|_| format!("response time {token:?} is not numeric"))
}

/// `-` and empty quoted fields both mean "absent".
fn optional_field(token: &str) -> Option<String> {
    if token.is_empty() || token == "-" {
        None
    } else {
        Some(token.to_string())
    }
}

fn fail(
    line: &str,
    line_number: usize,
    reason: FailureReason,
    detail: impl Into<String>,
) -> ParseFailure {
    ParseFailure {
        line_number,
        line: line.to_string(),
        reason,
        detail: detail.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMON_LINE: &str =
        r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /api/users HTTP/1.1" 200 1234"#;
    const COMBINED_LINE: &str = r#"10.0.0.5 - frank [10/Oct/2023:13:55:36 +0000] "POST /login HTTP/1.1" 401 0 "https://example.com/" "Mozilla/5.0""#;
    const EXTENDED_LINE: &str = r#"10.0.0.5 - - [10/Oct/2023:13:55:36 +0000] "GET /api/users HTTP/1.1" 200 1234 "-" "curl/8.0" 250"#;

    #[test]
    fn parses_common_format() {
        let entry = parse_line(COMMON_LINE, 1).unwrap();
        assert_eq!(entry.ip_address, "127.0.0.1".parse::<Ipv4Addr>().unwrap());
        assert_eq!(entry.method, HttpMethod::Get);
        assert_eq!(entry.path, "/api/users");
        assert_eq!(entry.protocol, "HTTP/1.1");
        assert_eq!(entry.status_code, 200);
        assert_eq!(entry.response_size, 1234);
        assert_eq!(entry.referrer, None);
        assert_eq!(entry.user_agent, None);
        assert_eq!(entry.response_time, None);
    }

    #[test]
    fn parses_combined_format() {
        let entry = parse_line(COMBINED_LINE, 1).unwrap();
        assert_eq!(entry.method, HttpMethod::Post);
        assert_eq!(entry.status_code, 401);
        assert_eq!(entry.referrer.as_deref(), Some("https://example.com/"));
        assert_eq!(entry.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(entry.response_time, None);
    }

    #[test]
    fn parses_extended_format_with_millisecond_trailer() {
        let entry = parse_line(EXTENDED_LINE, 1).unwrap();
        assert_eq!(entry.referrer, None); // "-" degrades to absent
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(entry.response_time, Some(0.25));
    }

    #[test]
    fn extended_wins_over_combined() {
        // The trailer distinguishes the formats; it must not be mistaken
        // for part of a Combined line.
        let entry = parse_line(EXTENDED_LINE, 1).unwrap();
        assert!(entry.response_time.is_some());
    }

    #[test]
    fn dash_size_is_zero() {
        let line = r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "HEAD / HTTP/1.1" 304 -"#;
        let entry = parse_line(line, 1).unwrap();
        assert_eq!(entry.response_size, 0);
        assert_eq!(entry.method, HttpMethod::Head);
    }

    #[test]
    fn empty_quoted_fields_are_absent() {
        let line = r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 5 "" """#;
        let entry = parse_line(line, 1).unwrap();
        assert_eq!(entry.referrer, None);
        assert_eq!(entry.user_agent, None);
    }

    #[test]
    fn unknown_method_is_kept() {
        let line = r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "PROPFIND /dav HTTP/1.1" 207 96"#;
        let entry = parse_line(line, 1).unwrap();
        assert_eq!(entry.method, HttpMethod::Other("PROPFIND".into()));
    }

    #[test]
    fn octet_out_of_range_is_invalid_ip() {
        let line = r#"999.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 5"#;
        let failure = parse_line(line, 7).unwrap_err();
        assert_eq!(failure.reason, FailureReason::InvalidIp);
        assert_eq!(failure.line_number, 7);
        assert!(failure.detail.contains("999.0.0.1"));
    }

    #[test]
    fn hostname_client_is_invalid_ip() {
        let line = r#"host.example.com - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 5"#;
        let failure = parse_line(line, 1).unwrap_err();
        assert_eq!(failure.reason, FailureReason::InvalidIp);
    }

    #[test]
    fn status_outside_range_is_invalid_status() {
        for status in ["600", "99", "12345"] {
            let line = format!(
                r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" {status} 5"#
            );
            let failure = parse_line(&line, 1).unwrap_err();
            assert_eq!(failure.reason, FailureReason::InvalidStatusCode, "{status}");
        }
    }

    #[test]
    fn out_of_range_offset_is_invalid_timestamp() {
        let line = r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +1500] "GET / HTTP/1.1" 200 5"#;
        let failure = parse_line(line, 1).unwrap_err();
        assert_eq!(failure.reason, FailureReason::InvalidTimestamp);
        assert!(failure.detail.contains("+1500"), "{}", failure.detail);
    }

    #[test]
    fn unparseable_line_is_malformed() {
        let failure = parse_line("definitely not a log line", 3).unwrap_err();
        assert_eq!(failure.reason, FailureReason::MalformedStructure);
        assert_eq!(failure.line_number, 3);
        assert_eq!(failure.line, "definitely not a log line");
    }

    #[test]
    fn request_with_embedded_space_is_malformed() {
        // Three-token request line is part of the structure; spaces in the
        // path break it.
        let line = r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /a b HTTP/1.1" 200 5"#;
        let failure = parse_line(line, 1).unwrap_err();
        assert_eq!(failure.reason, FailureReason::MalformedStructure);
    }

    #[test]
    fn naive_timestamp_parses_with_utc_fallback() {
        let line = r#"127.0.0.1 - - [10/Oct/2023:13:55:36] "GET / HTTP/1.1" 200 5"#;
        let entry = parse_line(line, 1).unwrap();
        assert_eq!(entry.timestamp.offset().local_minus_utc(), 0);
    }

    #[test]
    fn validation_checks_ip_before_timestamp() {
        // Both fields are bad; the reported reason follows validation order.
        let line = r#"bad-host - - [10/Oct/2023:13:55:36 +9900] "GET / HTTP/1.1" 200 5"#;
        let failure = parse_line(line, 1).unwrap_err();
        assert_eq!(failure.reason, FailureReason::InvalidIp);
    }
}
