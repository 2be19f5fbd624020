use std::time::Duration;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

pub const PREFIX_SEPARATOR: u8 = b'_';

pub const COMMENT_MARKER: &[u8] = b"//";

/// Bytes shown on each side of a JSON error offset in error snapshots.
pub const SNAPSHOT_RADIUS: usize = 24;

#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}
