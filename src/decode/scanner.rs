use memchr::memchr;
use tracing::trace;

use crate::constants::{is_whitespace, COMMENT_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Push,
    Pop,
    /// `terminated` is false when the input ended before a closing quote.
    QuotedString { terminated: bool },
    UnquotedString,
    Comment,
    Invalid,
}

/// Half-open byte range into the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Span,
    pub text: &'a [u8],
}

impl<'a> Token<'a> {
    /// Payload without delimiters: quotes are dropped from quoted strings,
    /// the `//` marker and any trailing `\r` from comments.
    pub fn content(&self) -> &'a [u8] {
        match self.kind {
            TokenKind::QuotedString { terminated } => {
                let end = if terminated {
                    self.text.len().saturating_sub(1)
                } else {
                    self.text.len()
                };
                self.text.get(1..end.max(1)).unwrap_or(&[])
            }
            TokenKind::Comment => {
                let body = &self.text[COMMENT_MARKER.len()..];
                body.strip_suffix(b"\r").unwrap_or(body)
            }
            _ => self.text,
        }
    }
}

pub struct Scanner<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, position: 0 }
    }

    /// Offset of the next significant byte, without consuming anything.
    pub fn peek_start(&self) -> usize {
        let mut idx = self.position;
        while idx < self.input.len() && is_whitespace(self.input[idx]) {
            idx += 1;
        }
        idx
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let start = self.peek_start();
        self.position = start;
        let byte = *self.input.get(start)?;

        let (kind, end) = match byte {
            b'{' => (TokenKind::Push, start + 1),
            b'}' => (TokenKind::Pop, start + 1),
            b'"' => self.scan_quoted(start),
            b'/' if self.input[start..].starts_with(COMMENT_MARKER) => {
                let end = memchr(b'\n', &self.input[start..])
                    .map(|offset| start + offset)
                    .unwrap_or(self.input.len());
                (TokenKind::Comment, end)
            }
            _ => match self.unquoted_char_len(start) {
                Some(_) => (TokenKind::UnquotedString, self.scan_unquoted(start)),
                None => (TokenKind::Invalid, start + char_len_at(self.input, start)),
            },
        };

        self.position = end;
        let token = Token {
            kind,
            span: Span { start, end },
            text: &self.input[start..end],
        };
        trace!(?kind, start, end, "token");
        Some(token)
    }

    fn scan_quoted(&self, start: usize) -> (TokenKind, usize) {
        let mut from = start + 1;
        while let Some(offset) = memchr(b'"', &self.input[from..]) {
            let idx = from + offset;
            if self.input[idx - 1] != b'\\' {
                return (TokenKind::QuotedString { terminated: true }, idx + 1);
            }
            from = idx + 1;
        }
        (
            TokenKind::QuotedString { terminated: false },
            self.input.len(),
        )
    }

    fn scan_unquoted(&self, start: usize) -> usize {
        let mut idx = start;
        while let Some(len) = self.unquoted_char_len(idx) {
            idx += len;
        }
        idx
    }

    /// Byte length of the identifier character at `idx`, if there is one.
    fn unquoted_char_len(&self, idx: usize) -> Option<usize> {
        let byte = *self.input.get(idx)?;
        if byte.is_ascii() {
            return (byte.is_ascii_alphanumeric() || byte == b'_').then_some(1);
        }
        let ch = decode_char_at(self.input, idx)?;
        ch.is_alphanumeric().then(|| ch.len_utf8())
    }
}

fn decode_char_at(input: &[u8], idx: usize) -> Option<char> {
    let end = (idx + 4).min(input.len());
    let window = &input[idx..end];
    let valid = match std::str::from_utf8(window) {
        Ok(text) => text,
        Err(err) => std::str::from_utf8(&window[..err.valid_up_to()]).ok()?,
    };
    valid.chars().next()
}

fn char_len_at(input: &[u8], idx: usize) -> usize {
    decode_char_at(input, idx).map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(input.as_bytes());
        std::iter::from_fn(|| scanner.next_token())
            .map(|token| token.kind)
            .collect()
    }

    #[rstest::rstest]
    fn test_scan_structural_tokens() {
        assert_eq!(
            kinds("world { }"),
            vec![TokenKind::UnquotedString, TokenKind::Push, TokenKind::Pop]
        );
    }

    #[rstest::rstest]
    fn test_scan_quoted_string() {
        let mut scanner = Scanner::new(br#"  "hello world" next"#);
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::QuotedString { terminated: true });
        assert_eq!(token.span, Span { start: 2, end: 15 });
        assert_eq!(token.content(), b"hello world");
        assert_eq!(scanner.next_token().unwrap().text, b"next");
        assert!(scanner.next_token().is_none());
    }

    #[rstest::rstest]
    fn test_scan_escaped_quote() {
        let mut scanner = Scanner::new(br#""say \"hi\"" x"#);
        let token = scanner.next_token().unwrap();
        assert_eq!(token.content(), br#"say \"hi\""#);
    }

    #[rstest::rstest]
    fn test_scan_unterminated_quote() {
        let mut scanner = Scanner::new(b"\"open { }");
        let token = scanner.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::QuotedString { terminated: false });
        assert_eq!(token.span.end, 9);
        assert_eq!(token.content(), b"open { }");
        assert!(scanner.next_token().is_none());
    }

    #[rstest::rstest]
    fn test_scan_comment() {
        let mut scanner = Scanner::new(b"// first\r\nkey // tail");
        let comment = scanner.next_token().unwrap();
        assert_eq!(comment.kind, TokenKind::Comment);
        assert_eq!(comment.content(), b" first");
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::UnquotedString);
        let tail = scanner.next_token().unwrap();
        assert_eq!(tail.kind, TokenKind::Comment);
        assert_eq!(tail.content(), b" tail");
    }

    #[rstest::rstest]
    fn test_scan_invalid() {
        assert_eq!(
            kinds("a / b"),
            vec![
                TokenKind::UnquotedString,
                TokenKind::Invalid,
                TokenKind::UnquotedString
            ]
        );
        assert_eq!(kinds("€"), vec![TokenKind::Invalid]);
        assert_eq!(kinds("-1"), vec![TokenKind::Invalid, TokenKind::UnquotedString]);
    }

    #[rstest::rstest]
    fn test_scan_unicode_identifier() {
        let mut scanner = Scanner::new("größe_1 x".as_bytes());
        assert_eq!(scanner.next_token().unwrap().text, "größe_1".as_bytes());
    }

    #[rstest::rstest]
    fn test_whitespace_only_has_no_tokens() {
        assert!(kinds(" \t\r\n ").is_empty());
        assert!(kinds("").is_empty());
    }
}
