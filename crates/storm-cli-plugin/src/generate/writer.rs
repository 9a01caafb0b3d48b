//! Indentation-aware text buffer for generated TypeScript.

/// Header written at the top of every generated module.
pub const GENERATED_HEADER: &str = "// Generated by Storm Stack. Do not edit.";

const INDENT: &str = "  ";

/// Line-oriented writer tracking the current indentation depth.
#[derive(Debug, Default)]
pub struct SourceWriter {
    buffer: String,
    depth: usize,
}

impl SourceWriter {
    /// Writer primed with the generated-file header.
    #[must_use]
    pub fn module() -> Self {
        let mut writer = Self::default();
        writer.line(GENERATED_HEADER);
        writer.blank();
        writer
    }

    /// Writes one line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let content = text.as_ref();
        if !content.is_empty() {
            for _ in 0..self.depth {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(content);
        }
        self.buffer.push('\n');
    }

    /// Writes an empty line.
    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    /// Writes `header {` and indents the lines that follow. An empty header
    /// opens a bare scope.
    pub fn open(&mut self, header: &str) {
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{header} {{"));
        }
        self.depth += 1;
    }

    /// Closes the innermost scope with `}` followed by `footer`.
    pub fn close_with(&mut self, footer: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(format!("}}{footer}"));
    }

    /// Closes the innermost scope.
    pub fn close(&mut self) {
        self.close_with("");
    }

    /// Returns the text written so far.
    #[must_use]
    pub fn finish(self) -> String {
        self.buffer
    }
}
