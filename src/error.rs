use std::fmt;

/// Failure classes. The first eight form the closed parse taxonomy; `Json`
/// and `Io` only come out of the object-notation side and reader helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoContent,
    InvalidToken,
    StackUnderflow,
    UnnamedNode,
    IncompleteNode,
    UnmatchedBrace,
    OperationCancelled,
    Unspecified,
    Json,
    Io,
}

impl ErrorKind {
    /// Numeric code, with `0` reserved for "no error".
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::NoContent => 1,
            ErrorKind::InvalidToken => 2,
            ErrorKind::StackUnderflow => 3,
            ErrorKind::UnnamedNode => 4,
            ErrorKind::IncompleteNode => 5,
            ErrorKind::UnmatchedBrace => 6,
            ErrorKind::OperationCancelled => 7,
            ErrorKind::Unspecified => 8,
            ErrorKind::Json => 9,
            ErrorKind::Io => 10,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::NoContent => "No content",
            ErrorKind::InvalidToken => "Invalid token",
            ErrorKind::StackUnderflow => "Stack underflow",
            ErrorKind::UnnamedNode => "Unnamed node",
            ErrorKind::IncompleteNode => "Incomplete node",
            ErrorKind::UnmatchedBrace => "Unmatched brace",
            ErrorKind::OperationCancelled => "Operation cancelled",
            ErrorKind::Unspecified => "Unspecified error",
            ErrorKind::Json => "Invalid object notation",
            ErrorKind::Io => "Read failed",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::NoContent => "There was no parsable content in the input.",
            ErrorKind::InvalidToken => "An invalid token was encountered.",
            ErrorKind::StackUnderflow => "There were more closing braces than opening braces.",
            ErrorKind::UnnamedNode => "An opening brace or empty key appeared where a key was expected.",
            ErrorKind::IncompleteNode => "A key was given with no corresponding value.",
            ErrorKind::UnmatchedBrace => {
                "The input ended before every opening brace was matched with a closing brace."
            }
            ErrorKind::OperationCancelled => "The operation was cancelled.",
            ErrorKind::Unspecified => "An unspecified error occurred.",
            ErrorKind::Json => "The object notation could not be read.",
            ErrorKind::Io => "The input could not be read.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Parse,
    Transcode,
    Write,
}

/// Source position. `line` is 1-based, `column` is the 0-based distance
/// from the last newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {message}{}", .kind.title(), location_suffix(.location))]
pub struct Error {
    pub kind: ErrorKind,
    pub stage: ErrorStage,
    pub message: String,
    pub location: Option<Location>,
}

impl Error {
    pub fn parse(kind: ErrorKind, location: Location) -> Self {
        Self {
            kind,
            stage: ErrorStage::Parse,
            message: kind.description().to_string(),
            location: Some(location),
        }
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Json,
            stage: ErrorStage::Transcode,
            message: message.into(),
            location: None,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            stage: ErrorStage::Parse,
            message: message.into(),
            location: None,
        }
    }

    pub fn with_stage(mut self, stage: ErrorStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn description(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> Option<usize> {
        self.location.map(|location| location.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.location.map(|location| location.column)
    }
}

fn location_suffix(location: &Option<Location>) -> String {
    location
        .map(|location| format!(" ({location})"))
        .unwrap_or_default()
}
