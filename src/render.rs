//! Render
//!
//! Text lines built from styled spans. The same lines print either with
//! ANSI control sequences for a terminal or as plain text.

pub const BAR: &str = "│   ";
pub const TEE: &str = "├── ";
pub const ELBOW: &str = "└── ";
/// Indentation under the last child, where the bar stops.
pub const SPACE: &str = "    ";
/// Extra indentation between a node's line and its body.
pub const SPLIT_PADDING: &str = "    ";

const OKBLUE: &str = "\x1b[94m";
const OKGREEN: &str = "\x1b[92m";
const WARNING: &str = "\x1b[93m";
const BOLD: &str = "\x1b[1m";
const ENDC: &str = "\x1b[0m";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    /// Leaf edge labels.
    Leaf,
    /// Leaf summary line.
    LeafSummary,
    /// Leaves without samples.
    Warning,
    /// The "Split" heading of an internal node.
    Split,
}

impl Style {
    fn codes(&self) -> &'static [&'static str] {
        match self {
            Style::Leaf => &[OKBLUE],
            Style::LeafSummary => &[BOLD, OKBLUE],
            Style::Warning => &[WARNING],
            Style::Split => &[OKGREEN, BOLD],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: Option<Style>,
}

/// One output line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new() -> Self {
        Line::default()
    }

    pub fn plain(mut self, text: impl Into<String>) -> Self {
        self.spans.push(Span {
            text: text.into(),
            style: None,
        });
        self
    }

    pub fn styled(mut self, text: impl Into<String>, style: Style) -> Self {
        self.spans.push(Span {
            text: text.into(),
            style: Some(style),
        });
        self
    }

    pub fn write_to(&self, out: &mut String, colored: bool) {
        for span in &self.spans {
            match span.style {
                Some(style) if colored => {
                    style.codes().iter().for_each(|c| out.push_str(c));
                    out.push_str(&span.text);
                    out.push_str(ENDC);
                }
                _ => out.push_str(&span.text),
            }
        }
    }

    pub fn to_text(&self, colored: bool) -> String {
        let mut out = String::new();
        self.write_to(&mut out, colored);
        out
    }
}

/// Join lines with newlines, no trailing newline.
pub fn render_lines(lines: &[Line], colored: bool) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        line.write_to(&mut out, colored);
    }
    out
}

/// Drop ANSI control sequences of the form `ESC [ ... m`.
#[cfg(test)]
pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for d in chars.by_ref() {
                if d == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}
