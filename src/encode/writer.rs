use crate::text::string::write_key_values_quoted;
use crate::WriteOptions;

/// Line-oriented KeyValues text builder shared by the tree writer and the
/// object-notation reverse pass.
pub(crate) struct Writer {
    buffer: String,
    pub(crate) options: WriteOptions,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl Writer {
    pub fn new(options: WriteOptions) -> Self {
        let indent_unit = options.indent.unit();
        Self {
            buffer: String::new(),
            options,
            indent_unit,
            indent_cache: vec![String::new()],
        }
    }

    pub fn with_capacity(options: WriteOptions, capacity: usize) -> Self {
        let mut writer = Self::new(options);
        writer.buffer.reserve(capacity);
        writer
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn write_indent(&mut self, depth: usize) {
        if depth == 0 || self.indent_unit.is_empty() {
            return;
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.buffer.push_str(&self.indent_cache[depth]);
    }

    pub fn write_newline(&mut self) {
        self.buffer.push('\n');
    }

    pub fn write_key(&mut self, key: &str, depth: usize) {
        self.write_indent(depth);
        write_key_values_quoted(&mut self.buffer, key);
    }

    /// Finishes a `key` line with its scalar value.
    pub fn write_value(&mut self, value: &str) {
        self.buffer.push(' ');
        write_key_values_quoted(&mut self.buffer, value);
        self.write_newline();
    }

    /// Finishes a `key` line and opens its block.
    pub fn open_container(&mut self, depth: usize) {
        self.write_newline();
        self.write_indent(depth);
        self.buffer.push('{');
        self.write_newline();
    }

    pub fn close_container(&mut self, depth: usize) {
        self.write_indent(depth);
        self.buffer.push('}');
        self.write_newline();
    }

    /// One `//` line per line of `comment`.
    pub fn write_comment(&mut self, comment: &str, depth: usize) {
        if !self.options.write_comments {
            return;
        }
        for line in comment.split('\n') {
            self.write_indent(depth);
            self.buffer.push_str("//");
            self.buffer.push_str(line);
            self.write_newline();
        }
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let mut next = self
                .indent_cache
                .last()
                .cloned()
                .unwrap_or_default();
            next.push_str(&self.indent_unit);
            self.indent_cache.push(next);
        }
    }
}
