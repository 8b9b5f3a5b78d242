use scraper::ElementRef;
use std::collections::HashSet;

/// Glyphs some recipe plugins render in place of list markers. The second one
/// is the first decoded as Windows-1252 instead of UTF-8.
const BULLET_ARTIFACTS: [&str; 2] = ["\u{25a2}", "\u{e2}\u{2013}\u{a2}"];

/// Strip bullet artifacts, collapse whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    let mut cleaned = text.to_string();
    // Removing one artifact can splice together another one
    while let Some(artifact) = BULLET_ARTIFACTS.iter().find(|a| cleaned.contains(**a)) {
        cleaned = cleaned.replace(artifact, "");
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All descendant text nodes of `element`, space separated and normalized.
pub fn element_text(element: &ElementRef) -> String {
    normalize(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Ordered set of normalized strings: empty values and repeats are dropped,
/// first occurrence wins.
#[derive(Debug, Default)]
pub struct TextCollector {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl TextCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the text was kept.
    pub fn push(&mut self, text: &str) -> bool {
        let text = normalize(text);
        if text.is_empty() || self.seen.contains(&text) {
            return false;
        }
        self.seen.insert(text.clone());
        self.items.push(text);
        true
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}
