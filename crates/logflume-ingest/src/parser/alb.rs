//! Application Load Balancer access-log grammar.
//!
//! Recognizes the space-separated ALB access-log entry format (29
//! fields, the request triplet split into method/URI/protocol, plus the
//! optional trailing connection trace id) and serializes each matched
//! line as one JSON record followed by a newline.

use std::io::{BufRead, Write};

use regex::{Captures, Regex};
use serde::Serialize;

use logflume_core::error::{Error, Result};

use super::{LineError, LogParser, ParseSummary};

const ALB_PATTERN: &str = concat!(
    r#"^(?P<type>[!-~]+) "#,
    r#"(?P<time>[!-~]+) "#,
    r#"(?P<elb>[!-~]+) "#,
    r#"(?P<client_port>[!-~]+) "#,
    r#"(?P<target_port>[!-~]+) "#,
    r#"(?P<request_processing_time>[\d.-]+) "#,
    r#"(?P<target_processing_time>[\d.-]+) "#,
    r#"(?P<response_processing_time>[\d.-]+) "#,
    r#"(?P<elb_status_code>\d{1,3}|-) "#,
    r#"(?P<target_status_code>\d{1,3}|-) "#,
    r#"(?P<received_bytes>\d+|-) "#,
    r#"(?P<sent_bytes>\d+|-) "#,
    r#""(?P<method>[A-Z-]+) (?P<request_uri>[!-~]+) (?P<protocol>[!-~]+)" "#,
    r#""(?P<user_agent>[^"]*)" "#,
    r#"(?P<ssl_cipher>[!-~]+) "#,
    r#"(?P<ssl_protocol>[!-~]+) "#,
    r#"(?P<target_group_arn>[!-~]+) "#,
    r#""(?P<trace_id>[^"]*)" "#,
    r#""(?P<domain_name>[^"]*)" "#,
    r#""(?P<chosen_cert_arn>[^"]*)" "#,
    r#"(?P<matched_rule_priority>[\d-]+) "#,
    r#"(?P<request_creation_time>[!-~]+) "#,
    r#""(?P<actions_executed>[^"]*)" "#,
    r#""(?P<redirect_url>[^"]*)" "#,
    r#""(?P<error_reason>[^"]*)" "#,
    r#""(?P<target_port_list>[^"]*)" "#,
    r#""(?P<target_status_code_list>[^"]*)" "#,
    r#""(?P<classification>[^"]*)" "#,
    r#""(?P<classification_reason>[^"]*)""#,
    r#"(?: (?P<conn_trace_id>[!-~]+))?$"#,
);

/// One recognized access-log entry, borrowed from the source line.
#[derive(Debug, Serialize)]
struct AlbRecord<'a> {
    #[serde(rename = "type")]
    entry_type: &'a str,
    time: &'a str,
    elb: &'a str,
    client_port: &'a str,
    target_port: &'a str,
    request_processing_time: &'a str,
    target_processing_time: &'a str,
    response_processing_time: &'a str,
    elb_status_code: &'a str,
    target_status_code: &'a str,
    received_bytes: &'a str,
    sent_bytes: &'a str,
    method: &'a str,
    request_uri: &'a str,
    protocol: &'a str,
    user_agent: &'a str,
    ssl_cipher: &'a str,
    ssl_protocol: &'a str,
    target_group_arn: &'a str,
    trace_id: &'a str,
    domain_name: &'a str,
    chosen_cert_arn: &'a str,
    matched_rule_priority: &'a str,
    request_creation_time: &'a str,
    actions_executed: &'a str,
    redirect_url: &'a str,
    error_reason: &'a str,
    target_port_list: &'a str,
    target_status_code_list: &'a str,
    classification: &'a str,
    classification_reason: &'a str,
    conn_trace_id: &'a str,
}

fn field<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("-", |m| m.as_str())
}

impl<'a> AlbRecord<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        Self {
            entry_type: field(caps, "type"),
            time: field(caps, "time"),
            elb: field(caps, "elb"),
            client_port: field(caps, "client_port"),
            target_port: field(caps, "target_port"),
            request_processing_time: field(caps, "request_processing_time"),
            target_processing_time: field(caps, "target_processing_time"),
            response_processing_time: field(caps, "response_processing_time"),
            elb_status_code: field(caps, "elb_status_code"),
            target_status_code: field(caps, "target_status_code"),
            received_bytes: field(caps, "received_bytes"),
            sent_bytes: field(caps, "sent_bytes"),
            method: field(caps, "method"),
            request_uri: field(caps, "request_uri"),
            protocol: field(caps, "protocol"),
            user_agent: field(caps, "user_agent"),
            ssl_cipher: field(caps, "ssl_cipher"),
            ssl_protocol: field(caps, "ssl_protocol"),
            target_group_arn: field(caps, "target_group_arn"),
            trace_id: field(caps, "trace_id"),
            domain_name: field(caps, "domain_name"),
            chosen_cert_arn: field(caps, "chosen_cert_arn"),
            matched_rule_priority: field(caps, "matched_rule_priority"),
            request_creation_time: field(caps, "request_creation_time"),
            actions_executed: field(caps, "actions_executed"),
            redirect_url: field(caps, "redirect_url"),
            error_reason: field(caps, "error_reason"),
            target_port_list: field(caps, "target_port_list"),
            target_status_code_list: field(caps, "target_status_code_list"),
            classification: field(caps, "classification"),
            classification_reason: field(caps, "classification_reason"),
            conn_trace_id: field(caps, "conn_trace_id"),
        }
    }
}

/// ALB access-log parser with default options (no custom line-matching
/// rules).
#[derive(Debug)]
pub struct AlbParser {
    pattern: Regex,
}

impl AlbParser {
    /// Creates a parser for the ALB access-log grammar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            // The pattern is a compile-time constant; it always compiles.
            pattern: Regex::new(ALB_PATTERN).expect("ALB grammar pattern compiles"),
        }
    }
}

impl Default for AlbParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for AlbParser {
    fn parse(
        &self,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
        source: &str,
    ) -> Result<ParseSummary> {
        let mut summary = ParseSummary::new(source);
        let mut raw_line = Vec::new();

        loop {
            raw_line.clear();
            let read = input
                .read_until(b'\n', &mut raw_line)
                .map_err(|e| Error::decompression(source, format!("stream decode failed: {e}")))?;
            if read == 0 {
                break;
            }

            let line = String::from_utf8_lossy(&raw_line);
            let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
            if line.is_empty() {
                continue;
            }
            summary.total += 1;

            if let Some(caps) = self.pattern.captures(line) {
                let record = AlbRecord::from_captures(&caps);
                serde_json::to_writer(&mut *out, &record)
                    .map_err(|e| Error::parse(source, format!("record serialization failed: {e}")))?;
                out.write_all(b"\n")
                    .map_err(|e| Error::parse(source, format!("buffer append failed: {e}")))?;
                summary.matched += 1;
            } else {
                summary.unmatched += 1;
                summary.errors.push(LineError {
                    line_number: summary.total,
                    record: line.to_string(),
                });
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HTTP_LINE: &str = r#"http 2018-07-02T22:23:00.186641Z app/my-loadbalancer/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.000 0.001 0.000 200 200 34 366 "GET http://www.example.com:80/ HTTP/1.1" "curl/7.46.0" - - arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337262-36d228ad5d99923122bbe354" "-" "-" 0 2018-07-02T22:22:48.364000Z "forward" "-" "-" "10.0.0.1:80" "200" "-" "-""#;

    const HTTPS_LINE: &str = r#"https 2018-07-02T22:23:00.186641Z app/my-loadbalancer/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.086 0.048 0.037 200 200 0 57 "GET https://www.example.com:443/ HTTP/1.1" "curl/7.46.0" ECDHE-RSA-AES128-GCM-SHA256 TLSv1.2 arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337281-1d84f3d73c47ec4e58577259" "www.example.com" "arn:aws:acm:us-east-2:123456789012:certificate/12345678-1234-1234-1234-123456789012" 1 2018-07-02T22:22:48.364000Z "authenticate,forward" "-" "-" "10.0.0.1:80" "200" "-" "-" TID_dc57cebed65b444ebc8177bb698fe166"#;

    fn parse_lines(lines: &str) -> (ParseSummary, Vec<u8>) {
        let parser = AlbParser::new();
        let mut out = Vec::new();
        let summary = parser
            .parse(&mut Cursor::new(lines.as_bytes()), &mut out, "test.log.gz")
            .expect("parse should succeed");
        (summary, out)
    }

    #[test]
    fn test_http_entry_matches() {
        let (summary, out) = parse_lines(HTTP_LINE);

        assert_eq!(summary.total, 1);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.unmatched, 0);
        assert!(summary.errors.is_empty());

        let record: serde_json::Value =
            serde_json::from_slice(out.strip_suffix(b"\n").expect("newline-terminated"))
                .expect("valid JSON record");
        assert_eq!(record["type"], "http");
        assert_eq!(record["method"], "GET");
        assert_eq!(record["request_uri"], "http://www.example.com:80/");
        assert_eq!(record["elb_status_code"], "200");
        assert_eq!(record["ssl_cipher"], "-");
        assert_eq!(record["conn_trace_id"], "-");
    }

    #[test]
    fn test_https_entry_with_connection_trace_id() {
        let (summary, out) = parse_lines(HTTPS_LINE);

        assert_eq!(summary.matched, 1);
        let record: serde_json::Value =
            serde_json::from_slice(&out[..out.len() - 1]).expect("valid JSON record");
        assert_eq!(record["type"], "https");
        assert_eq!(record["ssl_protocol"], "TLSv1.2");
        assert_eq!(record["domain_name"], "www.example.com");
        assert_eq!(record["actions_executed"], "authenticate,forward");
        assert_eq!(record["conn_trace_id"], "TID_dc57cebed65b444ebc8177bb698fe166");
    }

    #[test]
    fn test_unmatched_line_is_embedded_not_fatal() {
        let input = format!("{HTTP_LINE}\nthis is not an access log line\n{HTTPS_LINE}\n");
        let (summary, out) = parse_lines(&input);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].line_number, 2);
        assert_eq!(summary.errors[0].record, "this is not an access log line");

        // Only matched lines reach the buffer.
        assert_eq!(out.split(|&b| b == b'\n').filter(|s| !s.is_empty()).count(), 2);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let input = format!("\n{HTTP_LINE}\n\n");
        let (summary, _) = parse_lines(&input);

        assert_eq!(summary.total, 1);
        assert_eq!(summary.matched, 1);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let input = format!("{HTTP_LINE}\n{HTTPS_LINE}\n");
        let (_, first) = parse_lines(&input);
        let (_, second) = parse_lines(&input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_stream_yields_empty_summary_and_no_output() {
        let (summary, out) = parse_lines("");
        assert_eq!(summary.total, 0);
        assert!(out.is_empty());
    }
}
