use tracing::debug;

use crate::decode::position::LineTracker;
use crate::encode::writer::Writer;
use crate::text::string::strip_disambiguation_prefix;
use crate::{Error, Result, WriteOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// The outer `{` that wraps the whole document.
    Open,
    KeyOrClose,
    Key,
    Colon,
    Value,
    CommaOrClose,
    End,
}

pub fn json_to_key_values(input: &[u8]) -> Result<Vec<u8>> {
    json_to_key_values_with_options(input, &WriteOptions::default())
}

/// Rewrites an object-notation document as KeyValues text.
///
/// The outer braces are dropped, tagged keys are restored with
/// [`strip_disambiguation_prefix`] and every scalar becomes a quoted value.
/// Arrays have no KeyValues form and are rejected.
pub fn json_to_key_values_with_options(input: &[u8], options: &WriteOptions) -> Result<Vec<u8>> {
    let mut walker = Walker {
        input,
        pos: 0,
        depth: 0,
        writer: Writer::with_capacity(options.clone(), input.len()),
    };
    walker.run()?;
    let out = walker.writer.finish().into_bytes();
    debug!(input = input.len(), output = out.len(), "transcoded json to key values");
    Ok(out)
}

struct Walker<'a> {
    input: &'a [u8],
    pos: usize,
    /// Open objects including the outer wrapper.
    depth: usize,
    writer: Writer,
}

impl Walker<'_> {
    fn run(&mut self) -> Result<()> {
        let mut expect = Expect::Open;
        loop {
            self.skip_whitespace();
            let Some(&byte) = self.input.get(self.pos) else {
                return match expect {
                    Expect::End => Ok(()),
                    Expect::Open => Err(self.fail("expected `{` at start of document")),
                    _ => Err(self.fail("unexpected end of input, unbalanced braces")),
                };
            };
            expect = match (expect, byte) {
                (Expect::Open, b'{') => {
                    self.pos += 1;
                    self.depth = 1;
                    Expect::KeyOrClose
                }
                (Expect::Open, _) => return Err(self.fail("expected `{` at start of document")),
                (Expect::KeyOrClose, b'}') | (Expect::CommaOrClose, b'}') => self.close_object(),
                (Expect::KeyOrClose, b'"') | (Expect::Key, b'"') => {
                    let start = self.pos;
                    let key = self.read_string()?;
                    let key = strip_disambiguation_prefix(&key);
                    if key.trim().is_empty() {
                        return Err(self.fail_at(start, "empty key"));
                    }
                    self.check_quotable(start, key)?;
                    self.writer.write_key(key, self.depth - 1);
                    Expect::Colon
                }
                (Expect::Colon, b':') => {
                    self.pos += 1;
                    Expect::Value
                }
                (Expect::CommaOrClose, b',') => {
                    self.pos += 1;
                    Expect::Key
                }
                (Expect::Value, b'"') => {
                    let start = self.pos;
                    let value = self.read_string()?;
                    self.check_quotable(start, &value)?;
                    self.writer.write_value(&value);
                    Expect::CommaOrClose
                }
                (Expect::Value, b'{') => {
                    self.pos += 1;
                    self.writer.open_container(self.depth - 1);
                    self.depth += 1;
                    Expect::KeyOrClose
                }
                (Expect::Value, b'[') => {
                    return Err(self.fail("arrays have no key values equivalent"))
                }
                (Expect::Value, _) => {
                    let scalar = self.read_scalar()?;
                    self.writer.write_value(&scalar);
                    Expect::CommaOrClose
                }
                (Expect::End, _) => return Err(self.fail("trailing content after document")),
                (_, b'}') => return Err(self.fail("unbalanced `}`")),
                (_, other) => {
                    return Err(self.fail(format!("unexpected `{}`", char::from(other))))
                }
            };
        }
    }

    fn close_object(&mut self) -> Expect {
        self.pos += 1;
        self.depth -= 1;
        if self.depth == 0 {
            return Expect::End;
        }
        self.writer.close_container(self.depth - 1);
        Expect::CommaOrClose
    }

    fn skip_whitespace(&mut self) {
        while let Some(byte) = self.input.get(self.pos) {
            if !matches!(byte, b' ' | b'\t' | b'\n' | b'\r') {
                break;
            }
            self.pos += 1;
        }
    }

    /// Decodes the JSON string starting at the current `"`.
    fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let mut idx = start + 1;
        loop {
            match self.input.get(idx) {
                None => return Err(self.fail_at(start, "unterminated string")),
                Some(b'\\') => idx += 2,
                Some(b'"') => break,
                Some(_) => idx += 1,
            }
        }
        let raw = &self.input[start..=idx];
        self.pos = idx + 1;
        serde_json::from_slice::<String>(raw)
            .map_err(|err| self.fail_at(start, format!("invalid string: {err}")))
    }

    /// A trailing backslash would escape the closing quote.
    fn check_quotable(&self, start: usize, text: &str) -> Result<()> {
        if text.ends_with('\\') {
            return Err(self.fail_at(start, "string ends with `\\`, which cannot be quoted"));
        }
        Ok(())
    }

    /// Reads a number, `true`, `false` or `null` and returns its text.
    fn read_scalar(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.input[start..]
            .iter()
            .position(|byte| matches!(byte, b',' | b'}' | b']' | b' ' | b'\t' | b'\n' | b'\r'))
            .unwrap_or(self.input.len() - start);
        let raw = &self.input[start..start + len];
        let scalar = match serde_json::from_slice::<serde_json::Value>(raw) {
            Ok(value) if !value.is_object() && !value.is_array() && !value.is_string() => raw,
            _ => return Err(self.fail("expected a string, object or scalar value")),
        };
        self.pos = start + len;
        Ok(String::from_utf8_lossy(scalar).into_owned())
    }

    fn fail(&self, message: impl Into<String>) -> Error {
        self.fail_at(self.pos, message)
    }

    fn fail_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::json(message).with_location(LineTracker::new().locate(self.input, offset))
    }
}
