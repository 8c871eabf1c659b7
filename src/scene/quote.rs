/// The quote overlaid on every frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Quote {
    /// Quote body, word-wrapped at render time.
    pub text: String,
    /// Attribution. Empty means no author line.
    #[serde(default)]
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }

    /// The rendered attribution line, `"— {author}"`, or `None` for a blank author.
    pub fn author_line(&self) -> Option<String> {
        let author = self.author.trim();
        if author.is_empty() {
            None
        } else {
            Some(format!("\u{2014} {author}"))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/quote.rs"]
mod tests;
