use std::ops::Range;

/// In-memory lines of one file. Rendering an unmodified state reproduces the
/// original content byte for byte.
///
/// A file whose every line ends in `\r\n` is split on `\r\n` and rendered
/// back with it, so inserted lines follow the file's convention. Mixed files
/// are split on `\n` and keep any `\r` as part of the line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileState {
    lines: Vec<String>,
    trailing_newline: bool,
    crlf: bool,
}

impl FileState {
    pub fn parse(content: &str) -> Self {
        if content.is_empty() {
            return Self::default();
        }
        let crlf = uses_crlf(content);
        let newline = if crlf { "\r\n" } else { "\n" };
        let (body, trailing_newline) = match content.strip_suffix(newline) {
            Some(body) => (body, true),
            None => (content, false),
        };
        Self {
            lines: body.split(newline).map(|s| s.to_string()).collect(),
            trailing_newline,
            crlf,
        }
    }

    pub fn render(&self) -> String {
        let newline = self.newline();
        let mut out = self.lines.join(newline);
        if self.trailing_newline {
            out.push_str(newline);
        }
        out
    }

    pub fn newline(&self) -> &'static str {
        if self.crlf {
            "\r\n"
        } else {
            "\n"
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn splice(&mut self, range: Range<usize>, replacement: Vec<String>) {
        self.lines.splice(range, replacement);
    }
}

fn uses_crlf(content: &str) -> bool {
    let bytes = content.as_bytes();
    let mut breaks = bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'\n')
        .peekable();
    breaks.peek().is_some() && breaks.all(|(i, _)| i > 0 && bytes[i - 1] == b'\r')
}
