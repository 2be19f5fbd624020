pub mod parser;
pub mod position;
pub mod progress;
pub mod scanner;

use std::io::Read;
use std::sync::Arc;

use tracing::debug;

use crate::arena::{Document, NodeId};
use crate::{Error, ErrorKind, Location, ParseOptions, Result};

use self::parser::{invalid_utf8, Cooperation, TreeBuilder};
use self::progress::{NoProgress, ParseControl, ProgressSink, ProgressThrottle};

/// Tree-building KeyValues parser.
///
/// A parser keeps the error of its most recent failed call and exposes a
/// shared [`ParseControl`] through which another thread (or the progress
/// sink itself) can cancel a running parse.
#[derive(Debug)]
pub struct Parser {
    options: ParseOptions,
    control: Arc<ParseControl>,
    last_error: Option<Error>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        let control = Arc::new(ParseControl::new(options.interruptable));
        Self {
            options,
            control,
            last_error: None,
        }
    }

    /// Current options. `interruptable` is read from the live flag in
    /// [`ParseControl`], which the control handle may have changed.
    pub fn options(&self) -> ParseOptions {
        ParseOptions {
            interruptable: self.control.is_interruptable(),
            ..self.options.clone()
        }
    }

    pub fn control(&self) -> Arc<ParseControl> {
        Arc::clone(&self.control)
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn set_send_progress_updates(&mut self, send_progress_updates: bool) {
        self.options.send_progress_updates = send_progress_updates;
    }

    pub fn set_parse_comments(&mut self, parse_comments: bool) {
        self.options.parse_comments = parse_comments;
    }

    /// Rejected (returns `false`) while a parse is in flight.
    pub fn set_interruptable(&self, interruptable: bool) -> bool {
        self.control.set_interruptable(interruptable)
    }

    pub fn is_interruptable(&self) -> bool {
        self.control.is_interruptable()
    }

    /// Parses `source` and appends its top-level nodes to `container`.
    /// On error `document` is left exactly as it was.
    pub fn parse(&mut self, source: &str, document: &mut Document, container: NodeId) -> Result<()> {
        self.parse_with_progress(source, document, container, &mut NoProgress)
    }

    pub fn parse_with_progress(
        &mut self,
        source: &str,
        document: &mut Document,
        container: NodeId,
        sink: &mut dyn ProgressSink,
    ) -> Result<()> {
        let result = self.run(source, document, container, sink);
        self.record(result)
    }

    pub fn parse_slice(
        &mut self,
        source: &[u8],
        document: &mut Document,
        container: NodeId,
    ) -> Result<()> {
        self.parse_slice_with_progress(source, document, container, &mut NoProgress)
    }

    pub fn parse_slice_with_progress(
        &mut self,
        source: &[u8],
        document: &mut Document,
        container: NodeId,
        sink: &mut dyn ProgressSink,
    ) -> Result<()> {
        let result = match std::str::from_utf8(source) {
            Ok(text) => self.run(text, document, container, sink),
            Err(err) => Err(invalid_utf8(source, err.valid_up_to())),
        };
        self.record(result)
    }

    fn run(
        &self,
        source: &str,
        document: &mut Document,
        container: NodeId,
        sink: &mut dyn ProgressSink,
    ) -> Result<()> {
        if !self.control.begin() {
            return Err(Error::parse(
                ErrorKind::Unspecified,
                Location {
                    offset: 0,
                    line: 1,
                    column: 0,
                },
            ));
        }

        debug!(bytes = source.len(), "parsing key values");
        let mut cooperation = Cooperation {
            control: &self.control,
            sink,
            throttle: self
                .options
                .send_progress_updates
                .then(|| ProgressThrottle::new(self.options.progress_interval)),
            interruptable: self.control.is_interruptable(),
        };
        let builder = TreeBuilder::new(source, document, container, self.options.parse_comments);
        let result = builder.run(&mut cooperation);
        self.control.finish();

        let count = result?;
        debug!(nodes = count, "parsed key values");
        Ok(())
    }

    fn record(&mut self, result: Result<()>) -> Result<()> {
        match &result {
            Ok(()) => self.last_error = None,
            Err(err) => self.last_error = Some(err.clone()),
        }
        result
    }
}

pub fn from_str(input: &str, options: &ParseOptions) -> Result<Document> {
    let mut document = Document::new();
    let root = document.root();
    Parser::with_options(options.clone()).parse(input, &mut document, root)?;
    Ok(document)
}

pub fn from_slice(input: &[u8], options: &ParseOptions) -> Result<Document> {
    let mut document = Document::new();
    let root = document.root();
    Parser::with_options(options.clone()).parse_slice(input, &mut document, root)?;
    Ok(document)
}

pub fn from_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Document> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|err| Error::io(format!("read failed: {err}")))?;
    from_slice(&buf, options)
}

pub fn parse_into(
    input: &str,
    document: &mut Document,
    container: NodeId,
    options: &ParseOptions,
) -> Result<()> {
    Parser::with_options(options.clone()).parse(input, document, container)
}
