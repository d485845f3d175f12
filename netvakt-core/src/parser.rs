//! Capture-line parser.
//!
//! Turns one `|`-separated line of capture-tool field output into a
//! [`FlowRecord`]. Positional fields, in order: frame timestamp
//! (epoch seconds), source IP, destination IP, TCP source/destination
//! port, UDP source/destination port, IP protocol number, frame length,
//! TCP flags.
//!
//! Lines that fail the required-field checks are dropped silently
//! (`Ok(None)`); a malformed timestamp is a parse error local to that
//! line, to be logged and dropped by the caller.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::flow::{FlowRecord, Protocol};

/// Field separator the capture tool is asked to emit.
pub const FIELD_SEPARATOR: char = '|';

/// The null address that marks a record as unusable.
const NULL_ADDR: &str = "0.0.0.0";

/// Minimum number of fields for a line to be considered at all.
const MIN_FIELDS: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("frame timestamp is not epoch seconds: {0:?}")]
    Timestamp(String),
}

/// Parse one capture line. Pure; no side effects.
pub fn parse_line(line: &str) -> Result<Option<FlowRecord>, ParseError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < MIN_FIELDS {
        return Ok(None);
    }

    let source_ip = fields[1].trim();
    let dest_ip = fields[2].trim();
    if source_ip.is_empty() || dest_ip.is_empty() || source_ip == NULL_ADDR || dest_ip == NULL_ADDR
    {
        return Ok(None);
    }

    let captured_at = parse_timestamp(fields[0])?;

    // TCP port if present, else UDP, else 0.
    let source_port = port(&fields, 3).or_else(|| port(&fields, 5)).unwrap_or(0);
    let dest_port = port(&fields, 4).or_else(|| port(&fields, 6)).unwrap_or(0);

    let mut protocol = field(&fields, 7)
        .and_then(|p| p.parse::<u8>().ok())
        .map(Protocol::from_ip_proto)
        .unwrap_or(Protocol::Unknown);
    // Well-known destination ports override the numeric mapping.
    if let Some(known) = Protocol::from_well_known_port(dest_port) {
        protocol = known;
    }

    let size = field(&fields, 8)
        .and_then(|l| l.parse::<u64>().ok())
        .unwrap_or(0);

    let tcp_flags = field(&fields, 9).map(str::to_string);

    Ok(Some(FlowRecord {
        source_ip: source_ip.to_string(),
        dest_ip: dest_ip.to_string(),
        source_port,
        dest_port,
        protocol,
        size,
        tcp_flags,
        captured_at,
    }))
}

fn field<'a>(fields: &[&'a str], idx: usize) -> Option<&'a str> {
    fields
        .get(idx)
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
}

fn port(fields: &[&str], idx: usize) -> Option<u16> {
    field(fields, idx).and_then(|p| p.parse::<u16>().ok())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let epoch: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ParseError::Timestamp(raw.to_string()))?;
    if !epoch.is_finite() {
        return Err(ParseError::Timestamp(raw.to_string()));
    }
    DateTime::from_timestamp(epoch.trunc() as i64, (epoch.fract().abs() * 1e9) as u32)
        .ok_or_else(|| ParseError::Timestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_https_flow_with_port_override() {
        let record = parse_line("1700000000.0|185.220.101.1|8.8.8.8|0|443|0|0|6|512|")
            .unwrap()
            .unwrap();
        assert_eq!(record.source_ip, "185.220.101.1");
        assert_eq!(record.dest_ip, "8.8.8.8");
        assert_eq!(record.source_port, 0);
        assert_eq!(record.dest_port, 443);
        assert_eq!(record.protocol, Protocol::Https);
        assert_eq!(record.size, 512);
        assert_eq!(record.tcp_flags, None);
        assert_eq!(record.captured_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn override_applies_even_when_numeric_says_udp() {
        let record = parse_line("1700000000.0|1.2.3.4|5.6.7.8||53|40000|53|17|80|")
            .unwrap()
            .unwrap();
        assert_eq!(record.protocol, Protocol::Dns);
        assert_eq!(record.source_port, 40000);
        assert_eq!(record.dest_port, 53);
    }

    #[test]
    fn tcp_port_takes_precedence_over_udp() {
        let record = parse_line("1700000000.0|1.2.3.4|5.6.7.8|1234|5678|9999|8888|6|100|")
            .unwrap()
            .unwrap();
        assert_eq!(record.source_port, 1234);
        assert_eq!(record.dest_port, 5678);
    }

    #[test]
    fn too_few_fields_is_silently_dropped() {
        assert_eq!(parse_line("1700000000.0|1.2.3.4|5.6.7.8|80"), Ok(None));
        assert_eq!(parse_line(""), Ok(None));
    }

    #[test]
    fn null_address_is_silently_dropped() {
        assert_eq!(
            parse_line("1700000000.0|0.0.0.0|8.8.8.8|0|443|0|0|6|512|"),
            Ok(None)
        );
        assert_eq!(
            parse_line("1700000000.0|8.8.8.8|0.0.0.0|0|443|0|0|6|512|"),
            Ok(None)
        );
        assert_eq!(parse_line("1700000000.0||8.8.8.8|0|443|0|0|6|512|"), Ok(None));
    }

    #[test]
    fn malformed_timestamp_is_a_local_error() {
        assert!(matches!(
            parse_line("not-a-ts|1.2.3.4|5.6.7.8|0|443|0|0|6|512|"),
            Err(ParseError::Timestamp(_))
        ));
        assert!(matches!(
            parse_line("|1.2.3.4|5.6.7.8|0|443|0|0|6|512|"),
            Err(ParseError::Timestamp(_))
        ));
    }

    #[test]
    fn garbage_numerics_degrade_to_defaults() {
        let record = parse_line("1700000000.5|1.2.3.4|5.6.7.8|junk|junk|||junk|junk|PSH,ACK")
            .unwrap()
            .unwrap();
        assert_eq!(record.source_port, 0);
        assert_eq!(record.dest_port, 0);
        assert_eq!(record.protocol, Protocol::Unknown);
        assert_eq!(record.size, 0);
        assert_eq!(record.tcp_flags.as_deref(), Some("PSH,ACK"));
    }

    #[test]
    fn fractional_timestamp_is_preserved() {
        let record = parse_line("1700000000.25|1.2.3.4|5.6.7.8|0|80|0|0|6|60|")
            .unwrap()
            .unwrap();
        assert_eq!(record.captured_at.timestamp(), 1_700_000_000);
        assert_eq!(record.captured_at.timestamp_subsec_millis(), 250);
        assert_eq!(record.protocol, Protocol::Http);
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_lines(line in "\\PC{0,120}") {
            let _ = parse_line(&line);
        }

        #[test]
        fn valid_addresses_always_parse(
            ts in 0u32..=2_000_000_000u32,
            sport in any::<u16>(),
            dport in any::<u16>(),
            proto in any::<u8>(),
            len in 0u64..1_000_000,
        ) {
            let line = format!("{ts}.0|192.0.2.1|198.51.100.2|{sport}|{dport}|||{proto}|{len}|");
            let record = parse_line(&line).unwrap().unwrap();
            prop_assert_eq!(record.source_port, sport);
            prop_assert_eq!(record.dest_port, dport);
            prop_assert_eq!(record.size, len);
        }
    }
}
