use std::borrow::Cow;

use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::constants::SNAPSHOT_RADIUS;
use crate::decode::scanner::{Scanner, Token, TokenKind};
use crate::text::string::{unescape, write_json_quoted, KeyScope};
use crate::{Error, Result};

/// String count and emitted keys of one open brace.
#[derive(Debug, Default)]
struct Level {
    count: usize,
    keys: KeyScope,
}

/// Streams KeyValues tokens straight into an equivalent JSON object.
///
/// No tree is built and nothing is validated: comments and invalid tokens
/// are dropped, a stray `}` at the outermost level is ignored, and an
/// unclosed brace leaves the output unbalanced. Repeated keys within one
/// object are tagged with the level's string counter, see
/// [`strip_disambiguation_prefix`](crate::strip_disambiguation_prefix).
pub fn key_values_to_json(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 4 + 2);
    let mut stack: SmallVec<[Level; 16]> = smallvec![Level::default()];
    let mut scanner = Scanner::new(input);

    out.push(b'{');
    while let Some(token) = scanner.next_token() {
        match token.kind {
            TokenKind::Push => {
                out.extend_from_slice(b":{");
                stack.push(Level::default());
            }
            TokenKind::Pop => {
                if stack.len() < 2 {
                    continue;
                }
                stack.pop();
                out.push(b'}');
                if let Some(top) = stack.last_mut() {
                    top.count += 1;
                }
            }
            TokenKind::QuotedString { terminated: true } | TokenKind::UnquotedString => {
                let Some(top) = stack.last_mut() else {
                    continue;
                };
                write_string(&mut out, top, &token);
            }
            TokenKind::QuotedString { terminated: false }
            | TokenKind::Comment
            | TokenKind::Invalid => {}
        }
    }
    out.push(b'}');

    debug!(input = input.len(), output = out.len(), depth = stack.len(), "transcoded key values to json");
    out
}

fn write_string(out: &mut Vec<u8>, level: &mut Level, token: &Token<'_>) {
    let raw = String::from_utf8_lossy(token.content());
    let text = match token.kind {
        TokenKind::QuotedString { .. } => unescape(&raw).into_owned(),
        _ => raw.into_owned(),
    };

    let counter = level.count;
    if counter > 0 {
        out.push(if counter % 2 == 0 { b',' } else { b':' });
    }
    level.count += 1;

    if counter % 2 == 0 {
        let key = level.keys.emitted_key(counter, text.trim());
        write_json_quoted(out, &key);
    } else {
        write_json_quoted(out, &text);
    }
}

/// Transcodes `input` and parses the result as a JSON document.
pub fn json_from_key_values(input: &[u8]) -> Result<serde_json::Value> {
    let json = key_values_to_json(input);
    serde_json::from_slice(&json).map_err(|err| {
        let offset = offset_of(&json, err.line(), err.column());
        debug!(offset, "transcoded json rejected");
        Error::json(format!("{err} near `{}`", snapshot(&json, offset)))
    })
}

/// Byte offset of a 1-based line and column pair as reported by serde_json.
fn offset_of(text: &[u8], line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        memchr::memchr_iter(b'\n', text)
            .nth(line - 2)
            .map_or(text.len(), |idx| idx + 1)
    };
    (line_start + column.saturating_sub(1)).min(text.len())
}

fn snapshot(text: &[u8], offset: usize) -> Cow<'_, str> {
    let start = offset.saturating_sub(SNAPSHOT_RADIUS);
    let end = offset.saturating_add(SNAPSHOT_RADIUS).min(text.len());
    String::from_utf8_lossy(&text[start..end])
}
