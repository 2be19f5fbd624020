use std::borrow::Cow;
use std::collections::HashSet;

use memchr::memchr;
use smol_str::SmolStr;

use crate::constants::PREFIX_SEPARATOR;

/// Strips surrounding whitespace and the enclosing quotes from a raw quoted
/// token. A missing closing quote is tolerated.
pub fn unquote(token: &str) -> &str {
    let trimmed = token.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    trimmed.strip_suffix('"').unwrap_or(trimmed)
}

/// Resolves `\"`, `\n` and `\t`. Any other backslash is kept as written.
pub fn unescape(value: &str) -> Cow<'_, str> {
    let bytes = value.as_bytes();
    let Some(first) = memchr(b'\\', bytes) else {
        return Cow::Borrowed(value);
    };

    let mut out = String::with_capacity(value.len());
    out.push_str(&value[..first]);
    let mut idx = first;
    let mut start = first;
    while idx < bytes.len() {
        if bytes[idx] != b'\\' {
            idx += 1;
            continue;
        }
        let replacement = match bytes.get(idx + 1) {
            Some(b'"') => '"',
            Some(b'n') => '\n',
            Some(b't') => '\t',
            _ => {
                idx += 1;
                continue;
            }
        };
        out.push_str(&value[start..idx]);
        out.push(replacement);
        idx += 2;
        start = idx;
    }
    out.push_str(&value[start..]);
    Cow::Owned(out)
}

/// Logical value of a raw quoted token.
pub fn unquote_and_unescape(token: &str) -> Cow<'_, str> {
    unescape(unquote(token))
}

/// Inverse of [`unescape`] for writing KeyValues strings.
pub fn escape_key_values_into(out: &mut String, value: &str) {
    let bytes = value.as_bytes();
    let mut start = 0;
    for (idx, byte) in bytes.iter().enumerate() {
        let escaped = match byte {
            b'\n' => "\\n",
            b'\t' => "\\t",
            b'"' => "\\\"",
            _ => continue,
        };
        if start < idx {
            out.push_str(&value[start..idx]);
        }
        out.push_str(escaped);
        start = idx + 1;
    }
    if start < bytes.len() {
        out.push_str(&value[start..]);
    }
}

pub fn write_key_values_quoted(out: &mut String, value: &str) {
    out.push('"');
    escape_key_values_into(out, value);
    out.push('"');
}

/// Appends `value` as a quoted JSON string.
pub fn write_json_quoted(out: &mut Vec<u8>, value: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    out.push(b'"');
    let bytes = value.as_bytes();
    let mut start = 0;
    for (idx, &byte) in bytes.iter().enumerate() {
        let escaped: &[u8] = match byte {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x08 => b"\\b",
            0x0c => b"\\f",
            0x00..=0x1f => {
                out.extend_from_slice(&bytes[start..idx]);
                out.extend_from_slice(b"\\u00");
                out.push(HEX[(byte >> 4) as usize]);
                out.push(HEX[(byte & 0x0f) as usize]);
                start = idx + 1;
                continue;
            }
            _ => continue,
        };
        out.extend_from_slice(&bytes[start..idx]);
        out.extend_from_slice(escaped);
        start = idx + 1;
    }
    out.extend_from_slice(&bytes[start..]);
    out.push(b'"');
}

/// Length of a leading `digits_` run when a non-empty remainder follows it.
fn disambiguation_prefix_len(key: &str) -> Option<usize> {
    let bytes = key.as_bytes();
    let digits = bytes.iter().take_while(|byte| byte.is_ascii_digit()).count();
    if digits == 0 || bytes.get(digits) != Some(&PREFIX_SEPARATOR) {
        return None;
    }
    let prefix_len = digits + 1;
    if prefix_len == bytes.len() {
        return None;
    }
    Some(prefix_len)
}

pub fn has_disambiguation_prefix(key: &str) -> bool {
    disambiguation_prefix_len(key).is_some()
}

/// Removes the numeric `n_` tag added to repeated keys in object notation.
pub fn strip_disambiguation_prefix(key: &str) -> &str {
    match disambiguation_prefix_len(key) {
        Some(len) => &key[len..],
        None => key,
    }
}

pub fn write_disambiguated_key(out: &mut String, counter: usize, key: &str) {
    let mut buffer = itoa::Buffer::new();
    out.push_str(buffer.format(counter));
    out.push(PREFIX_SEPARATOR as char);
    out.push_str(key);
}

/// Keys already emitted in one object-notation container.
///
/// A repeated key, or one that already looks tagged, is written as
/// `{counter}_{key}`. `counter` is the level's string count when the key is
/// read, so tags are unique within a container and stripping is lossless.
#[derive(Debug, Default)]
pub struct KeyScope {
    seen: HashSet<SmolStr>,
}

impl KeyScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted_key<'k>(&mut self, counter: usize, key: &'k str) -> Cow<'k, str> {
        let repeated = !self.seen.insert(SmolStr::new(key));
        if !repeated && !has_disambiguation_prefix(key) {
            return Cow::Borrowed(key);
        }
        let mut out = String::with_capacity(key.len() + 4);
        write_disambiguated_key(&mut out, counter, key);
        Cow::Owned(out)
    }
}
