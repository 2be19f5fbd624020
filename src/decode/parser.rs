//! Grammar state machine that turns the token stream into nodes.
//!
//! ```text
//! Entry      := T T
//! Container  := T + Recursion -
//! Recursion  := ε | Entry Recursion | Container Recursion
//! Document   := Recursion
//! ```
//!
//! `T` is a quoted or unquoted string, `+` a push (`{`) and `-` a pop (`}`).

use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::arena::{Document, NodeId};
use crate::constants::COMMENT_MARKER;
use crate::text::string::unquote_and_unescape;
use crate::value::Value;
use crate::{Error, ErrorKind, Location, Result};

use super::position::LineTracker;
use super::progress::{emit, ParseControl, ProgressSink, ProgressThrottle};
use super::scanner::{Scanner, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No pending key.
    Base,
    /// A key has been read and awaits its value or a push.
    Elevated,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Synthetic bottom frame collecting root-level nodes.
    Wrapper,
    Node(NodeId),
}

pub(crate) struct Cooperation<'s> {
    pub control: &'s ParseControl,
    pub sink: &'s mut dyn ProgressSink,
    pub throttle: Option<ProgressThrottle>,
    pub interruptable: bool,
}

impl Cooperation<'_> {
    fn enabled(&self) -> bool {
        self.interruptable || self.throttle.is_some()
    }
}

pub(crate) struct TreeBuilder<'a, 'd> {
    input: &'a str,
    document: &'d mut Document,
    container: NodeId,
    parse_comments: bool,
    state: State,
    stack: Vec<Frame>,
    wrapper_children: Vec<NodeId>,
    pending_key: Option<SmolStr>,
    pending_comment: Option<String>,
    structural_seen: bool,
    lines: LineTracker,
}

impl<'a, 'd> TreeBuilder<'a, 'd> {
    pub(crate) fn new(
        input: &'a str,
        document: &'d mut Document,
        container: NodeId,
        parse_comments: bool,
    ) -> Self {
        Self {
            input,
            document,
            container,
            parse_comments,
            state: State::Base,
            stack: vec![Frame::Wrapper],
            wrapper_children: Vec::new(),
            pending_key: None,
            pending_comment: None,
            structural_seen: false,
            lines: LineTracker::new(),
        }
    }

    /// Runs the whole parse. On failure every node allocated by this call
    /// is dropped and the container is left as it was.
    pub(crate) fn run(mut self, cooperation: &mut Cooperation<'_>) -> Result<usize> {
        if !self.document.contains(self.container) {
            return Err(Error::parse(ErrorKind::Unspecified, self.locate(0)));
        }
        let mark = self.document.mark();
        match self.consume(cooperation) {
            Ok(()) => {
                let count = self.wrapper_children.len();
                for child in std::mem::take(&mut self.wrapper_children) {
                    self.document.attach(self.container, child);
                }
                Ok(count)
            }
            Err(err) => {
                self.document.truncate(mark);
                debug!(kind = ?err.kind, line = ?err.line(), column = ?err.column(), "parse failed");
                Err(err)
            }
        }
    }

    fn consume(&mut self, cooperation: &mut Cooperation<'_>) -> Result<()> {
        let input = self.input;
        let bytes = input.as_bytes();
        let total = bytes.len();
        let mut scanner = Scanner::new(bytes);

        while let Some(token) = scanner.next_token() {
            self.handle_token(&token)?;
            self.lines.advance_to(bytes, token.span.end);

            if cooperation.enabled() {
                let consumed = token.span.end;
                if let Some(throttle) = cooperation.throttle.as_mut() {
                    throttle.report(cooperation.sink, consumed, total);
                }
                cooperation.sink.yield_now();
                if cooperation.control.is_cancelled() {
                    return Err(self.error(ErrorKind::OperationCancelled, consumed));
                }
            }
        }

        if !self.structural_seen {
            return Err(self.error(ErrorKind::NoContent, total));
        }
        if self.stack.len() > 1 {
            return Err(self.error(ErrorKind::UnmatchedBrace, total));
        }
        if self.state == State::Elevated {
            return Err(self.error(ErrorKind::IncompleteNode, total));
        }
        if cooperation.throttle.is_some() {
            emit(cooperation.sink, total, total);
        }
        Ok(())
    }

    fn handle_token(&mut self, token: &Token<'a>) -> Result<()> {
        let start = token.span.start;
        match token.kind {
            TokenKind::Comment => {
                if self.parse_comments {
                    self.buffer_comment(token);
                }
                Ok(())
            }
            TokenKind::Invalid | TokenKind::QuotedString { terminated: false } => {
                Err(self.fail(ErrorKind::InvalidToken, start))
            }
            TokenKind::Push => {
                self.structural_seen = true;
                self.handle_push(start)
            }
            TokenKind::Pop => {
                self.structural_seen = true;
                self.handle_pop(start)
            }
            TokenKind::QuotedString { terminated: true } => {
                self.structural_seen = true;
                let raw = self.slice(token);
                let value = unquote_and_unescape(raw);
                self.handle_string(&value, start)
            }
            TokenKind::UnquotedString => {
                self.structural_seen = true;
                let raw = self.slice(token);
                self.handle_string(raw, start)
            }
        }
    }

    fn handle_push(&mut self, offset: usize) -> Result<()> {
        match self.state {
            State::Base => Err(self.fail(ErrorKind::UnnamedNode, offset)),
            State::Elevated => {
                let key = self.pending_key.take().unwrap_or_default();
                let node = self.create_node(key, None, offset)?;
                self.stack.push(Frame::Node(node));
                self.state = State::Base;
                Ok(())
            }
            State::Fail => Err(self.fail(ErrorKind::Unspecified, offset)),
        }
    }

    fn handle_pop(&mut self, offset: usize) -> Result<()> {
        match self.state {
            State::Base => {
                if self.stack.len() < 2 {
                    return Err(self.fail(ErrorKind::StackUnderflow, offset));
                }
                self.stack.pop();
                Ok(())
            }
            State::Elevated => Err(self.fail(ErrorKind::IncompleteNode, offset)),
            State::Fail => Err(self.fail(ErrorKind::Unspecified, offset)),
        }
    }

    fn handle_string(&mut self, text: &str, offset: usize) -> Result<()> {
        match self.state {
            State::Base => {
                let key = text.trim();
                if key.is_empty() {
                    return Err(self.fail(ErrorKind::UnnamedNode, offset));
                }
                self.pending_key = Some(SmolStr::new(key));
                self.state = State::Elevated;
                Ok(())
            }
            State::Elevated => {
                let key = self.pending_key.take().unwrap_or_default();
                self.create_node(key, Some(Value::String(text.to_string())), offset)?;
                self.state = State::Base;
                Ok(())
            }
            State::Fail => Err(self.fail(ErrorKind::Unspecified, offset)),
        }
    }

    fn create_node(&mut self, key: SmolStr, value: Option<Value>, offset: usize) -> Result<NodeId> {
        let parent = match self.stack.last() {
            Some(Frame::Node(parent)) => *parent,
            Some(Frame::Wrapper) | None => self.container,
        };
        trace!(key = key.as_str(), container = value.is_none(), "node");
        let Some(node) = self.document.push_detached(key, value, parent) else {
            return Err(self.fail(ErrorKind::Unspecified, offset));
        };
        match self.stack.last() {
            Some(Frame::Node(parent)) => self.document.attach(*parent, node),
            Some(Frame::Wrapper) | None => self.wrapper_children.push(node),
        }
        if let Some(comment) = self.pending_comment.take() {
            if let Some(created) = self.document.get_mut(node) {
                created.set_comment(Some(comment));
            }
        }
        Ok(node)
    }

    fn buffer_comment(&mut self, token: &Token<'a>) {
        let start = token.span.start + COMMENT_MARKER.len();
        let end = start + token.content().len();
        let text = self.input.get(start..end).unwrap_or_default();
        match self.pending_comment.as_mut() {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(text);
            }
            None => self.pending_comment = Some(text.to_string()),
        }
    }

    fn slice(&self, token: &Token<'a>) -> &'a str {
        self.input
            .get(token.span.start..token.span.end)
            .unwrap_or_default()
    }

    fn fail(&mut self, kind: ErrorKind, offset: usize) -> Error {
        self.state = State::Fail;
        self.error(kind, offset)
    }

    fn error(&mut self, kind: ErrorKind, offset: usize) -> Error {
        Error::parse(kind, self.locate(offset))
    }

    fn locate(&mut self, offset: usize) -> Location {
        self.lines.locate(self.input.as_bytes(), offset)
    }
}

/// Reports a UTF-8 failure in byte input as an invalid token.
pub(crate) fn invalid_utf8(input: &[u8], offset: usize) -> Error {
    Error::parse(
        ErrorKind::InvalidToken,
        LineTracker::new().locate(input, offset),
    )
}
