/// Greedy word wrap.
///
/// Words are appended to the current line while `measure(line + " " + word) <= max_width`;
/// otherwise a new line starts. A word wider than `max_width` on its own still gets a line of its
/// own and is never split. Runs of whitespace collapse to a single space, and text without words
/// yields no lines.
pub fn wrap<M>(text: &str, max_width: f32, mut measure: M) -> Vec<String>
where
    M: FnMut(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrapped lines plus where each line box starts vertically.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub line_height: f64,
    /// Top of the first line box.
    pub start_y: f64,
}

impl TextBlock {
    /// Center `lines` vertically on `anchor_y`.
    pub fn centered(lines: Vec<String>, anchor_y: f64, line_height: f64) -> Self {
        let start_y = anchor_y - (lines.len() as f64 * line_height) / 2.0;
        Self {
            lines,
            line_height,
            start_y,
        }
    }

    /// Top of line box `i`.
    pub fn line_top(&self, i: usize) -> f64 {
        self.start_y + i as f64 * self.line_height
    }

    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height
    }

    /// Lines paired with their box tops.
    pub fn positioned(&self) -> impl Iterator<Item = (f64, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, l)| (self.line_top(i), l.as_str()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
