/// Comparison form of a line: no leading/trailing whitespace, interior
/// whitespace runs collapsed to a single space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedLine(String);

impl NormalizedLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn normalize(line: &str) -> NormalizedLine {
    let mut out = String::with_capacity(line.len());
    for word in line.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    NormalizedLine(out)
}

pub fn normalize_all<S: AsRef<str>>(lines: &[S]) -> Vec<NormalizedLine> {
    lines.iter().map(|l| normalize(l.as_ref())).collect()
}

pub fn fuzzy_eq(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Width of the leading whitespace with tabs expanded to the next tab stop.
pub fn indent_width(line: &str, tab_width: usize) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += tab_width - width % tab_width,
            _ => break,
        }
    }
    width
}
