use crate::config::IndentStyle;

/// Line-oriented builder for generated C, tracking the indentation of nested bodies.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    lines: Vec<String>,
    indent_level: usize,
    indent_chars: String,
}

impl CodeWriter {
    pub fn new(style: &IndentStyle) -> Self {
        Self {
            lines: Vec::new(),
            indent_level: 0,
            indent_chars: style.unit(),
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_chars.repeat(self.indent_level)
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        let line = format!("{}{}", self.get_indent(), text);
        self.lines.push(line);
        self
    }

    /// Writes multi-line text, re-indenting each of its lines at the current level.
    pub fn text(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            self.line(line);
        }
        self
    }

    pub fn block<F>(&mut self, header: &str, body: F) -> &mut Self
    where
        F: FnOnce(&mut CodeWriter),
    {
        self.line(&format!("{} {{", header));
        self.indent();
        body(self);
        self.dedent();
        self.line("}");
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_indentation() {
        let mut w = CodeWriter::new(&IndentStyle::Spaces(4));
        assert_eq!(w.get_indent(), "");
        w.indent();
        assert_eq!(w.get_indent(), "    ");
        w.dedent();
        w.dedent();
        assert_eq!(w.get_indent(), "");
    }

    #[test]
    fn test_writer_block() {
        let mut w = CodeWriter::new(&IndentStyle::Spaces(4));
        w.block("if( x )", |w| {
            w.text("a();\nb();");
        });
        assert_eq!(w.finish(), "if( x ) {\n    a();\n    b();\n}");
    }

    #[test]
    fn test_writer_tabs() {
        let mut w = CodeWriter::new(&IndentStyle::Tabs);
        w.block("switch(v)", |w| {
            w.line("default: {}");
        });
        assert_eq!(w.finish(), "switch(v) {\n\tdefault: {}\n}");
    }
}
