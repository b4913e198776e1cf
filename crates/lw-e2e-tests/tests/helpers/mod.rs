//! Shared fixtures for the end-to-end tests: realistic access-log lines
//! and temp-file plumbing.

use std::io::Write;
use tempfile::NamedTempFile;

pub const COMMON_OK: &str =
    r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /api/users HTTP/1.1" 200 1234"#;
pub const COMMON_ERR: &str =
    r#"192.168.1.100 - - [10/Oct/2023:13:56:15 +0000] "POST /login HTTP/1.1" 401 0"#;
pub const COMBINED: &str = r#"10.0.0.5 - frank [10/Oct/2023:14:02:07 +0200] "GET /index.html HTTP/1.1" 200 5120 "https://example.com/" "Mozilla/5.0 (X11; Linux x86_64)""#;
pub const EXTENDED: &str = r#"10.0.0.6 - - [10/Oct/2023:22:12:44 -0500] "GET /api/orders HTTP/1.1" 200 2048 "-" "curl/8.0" 250"#;
pub const BOT: &str = r#"66.249.66.1 - - [10/Oct/2023:03:17:09 +0000] "GET /robots.txt HTTP/1.1" 200 64 "-" "Googlebot/2.1 (+http://www.google.com/bot.html)""#;
pub const MALFORMED: &str = "definitely not an access log line";
pub const BAD_OFFSET: &str =
    r#"127.0.0.1 - - [10/Oct/2023:13:55:36 +1500] "GET / HTTP/1.1" 200 5"#;

/// Write the lines to a fresh temp file, one per line.
pub fn write_log(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

/// A file with `ok` parseable lines and `bad` malformed ones interleaved.
pub fn write_mixed_log(ok: usize, bad: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..ok.max(bad) {
        if i < ok {
            writeln!(
                file,
                r#"10.0.0.{} - - [10/Oct/2023:{:02}:00:00 +0000] "GET /page/{} HTTP/1.1" 200 {}"#,
                i % 250 + 1,
                i % 24,
                i % 7,
                i * 10
            )
            .unwrap();
        }
        if i < bad {
            writeln!(file, "corrupt line {i}").unwrap();
        }
    }
    file.flush().unwrap();
    file
}
