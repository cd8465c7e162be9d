//! Session YAML extraction and cleanup
//!
//! iRacing writes the session block as Windows-1252 text padded with NULs, occasionally
//! followed by a stray `...` document marker, and sometimes containing control characters
//! from driver or team names. This module turns that block into text a YAML parser accepts.

use super::SessionInfo;
use crate::{ByteSource, Result, TelemetryError};
use std::borrow::Cow;
use tracing::{debug, trace};

/// Code points for Windows-1252 bytes 0x80..=0x9F. Unassigned bytes map to the matching C1
/// control, which [`clean_session_yaml`] later strips.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Read, clean and parse the session block at `offset`.
///
/// A zero-length block yields an empty [`SessionInfo`].
pub fn read_session_info<S: ByteSource + ?Sized>(
    source: &mut S,
    offset: i32,
    len: i32,
) -> Result<SessionInfo> {
    if len <= 0 {
        debug!("No session info block");
        return Ok(SessionInfo::default());
    }

    let block = source
        .read_vec_at(len as usize, offset as u64)
        .map_err(|e| TelemetryError::read_failed("session info", e))?;

    let yaml = clean_session_yaml(&decode_text(&block));
    trace!(raw_len = len, cleaned_len = yaml.len(), "session info block");

    if yaml.is_empty() {
        return Ok(SessionInfo::default());
    }
    SessionInfo::parse(&yaml)
}

/// Decode the block as UTF-8, falling back to Windows-1252 when it is not valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| windows_1252_char(b)).collect()),
    }
}

fn windows_1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => WINDOWS_1252_HIGH[(byte - 0x80) as usize],
        _ => char::from(byte),
    }
}

/// Trim NUL padding, a trailing `.` marker and surrounding whitespace, then drop control
/// characters other than newline, carriage return and tab.
pub fn clean_session_yaml(raw: &str) -> String {
    raw.trim_end_matches('\0')
        .trim_end_matches('.')
        .trim()
        .chars()
        .filter(|&ch| !ch.is_control() || matches!(ch, '\n' | '\r' | '\t'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySource;

    #[test]
    fn trims_padding_and_document_end() {
        let raw = "---\nWeekendInfo:\n  TrackName: spa\n...\n\0\0\0";
        assert_eq!(clean_session_yaml(raw), "---\nWeekendInfo:\n  TrackName: spa\n...");

        let raw = "WeekendInfo:\n  TrackName: spa\n...\0\0";
        assert_eq!(clean_session_yaml(raw), "WeekendInfo:\n  TrackName: spa");
    }

    #[test]
    fn strips_control_characters_but_keeps_whitespace() {
        let cleaned = clean_session_yaml("Key:\x01 val\x1Fue\r\n\tNext: 1");
        assert_eq!(cleaned, "Key: value\r\n\tNext: 1");
    }

    #[test]
    fn windows_1252_fallback_maps_high_bytes() {
        let bytes = b"TeamName: Caf\xE9 \x80 \x93Racing\x94";
        assert_eq!(decode_text(bytes), "TeamName: Café € \u{201C}Racing\u{201D}");
        assert!(matches!(decode_text("Ünïcode".as_bytes()), Cow::Borrowed(_)));
    }

    #[test]
    fn empty_or_padding_only_blocks_yield_defaults() -> anyhow::Result<()> {
        let mut source = MemorySource::new(vec![0u8; 64]);
        assert_eq!(read_session_info(&mut source, 0, 0)?, SessionInfo::default());
        assert_eq!(read_session_info(&mut source, 0, 32)?, SessionInfo::default());
        Ok(())
    }

    #[test]
    fn truncated_blocks_fail_to_read() {
        let mut source = MemorySource::new(b"WeekendInfo:\n".to_vec());
        let err = read_session_info(&mut source, 0, 100).unwrap_err();
        assert!(matches!(err, TelemetryError::Source { .. }));
    }

    #[test]
    fn latin1_names_parse_into_session_info() -> anyhow::Result<()> {
        let mut block = b"DriverInfo:\n DriverCarIdx: 0\n Drivers:\n - CarIdx: 0\n   UserName: Jos\xE9 P\xE9rez\n".to_vec();
        block.extend_from_slice(&[0, 0, 0]);
        let len = block.len() as i32;
        let mut source = MemorySource::new(block);

        let session = read_session_info(&mut source, 0, len)?;
        let driver = session.driver().ok_or_else(|| anyhow::anyhow!("driver should resolve"))?;
        assert_eq!(driver.user_name, "José Pérez");
        Ok(())
    }
}
