use memchr::memchr_iter;

use crate::Location;

/// Incremental newline bookkeeping. Each call to [`advance_to`] scans only
/// the bytes consumed since the previous call.
///
/// [`advance_to`]: LineTracker::advance_to
#[derive(Debug, Clone)]
pub struct LineTracker {
    scanned: usize,
    line: usize,
    last_newline: Option<usize>,
}

impl Default for LineTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTracker {
    pub fn new() -> Self {
        Self {
            scanned: 0,
            line: 1,
            last_newline: None,
        }
    }

    pub fn advance_to(&mut self, input: &[u8], offset: usize) {
        let offset = offset.min(input.len());
        if offset <= self.scanned {
            return;
        }
        for idx in memchr_iter(b'\n', &input[self.scanned..offset]) {
            self.line += 1;
            self.last_newline = Some(self.scanned + idx);
        }
        self.scanned = offset;
    }

    /// Position of `offset`, which must not precede the scanned range.
    pub fn locate(&mut self, input: &[u8], offset: usize) -> Location {
        self.advance_to(input, offset);
        let line_start = self.last_newline.map_or(0, |idx| idx + 1);
        Location {
            offset,
            line: self.line,
            column: offset.saturating_sub(line_start),
        }
    }
}
