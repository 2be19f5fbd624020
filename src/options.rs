use std::time::Duration;

use crate::constants::DEFAULT_PROGRESS_INTERVAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    #[default]
    Tab,
    Spaces(usize),
}

impl Indent {
    pub fn unit(self) -> String {
        match self {
            Indent::Tab => "\t".to_string(),
            Indent::Spaces(count) => " ".repeat(count),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub send_progress_updates: bool,
    pub interruptable: bool,
    pub parse_comments: bool,
    pub progress_interval: Duration,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_send_progress_updates(mut self, send_progress_updates: bool) -> Self {
        self.send_progress_updates = send_progress_updates;
        self
    }

    pub fn with_interruptable(mut self, interruptable: bool) -> Self {
        self.interruptable = interruptable;
        self
    }

    pub fn with_parse_comments(mut self, parse_comments: bool) -> Self {
        self.parse_comments = parse_comments;
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: Duration) -> Self {
        self.progress_interval = progress_interval;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            send_progress_updates: false,
            interruptable: false,
            parse_comments: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub indent: Indent,
    pub write_comments: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_write_comments(mut self, write_comments: bool) -> Self {
        self.write_comments = write_comments;
        self
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            write_comments: true,
        }
    }
}
