use unicode_segmentation::UnicodeSegmentation;

/// Splits text into lower-cased word tokens.
#[derive(Debug, Default, Clone)]
pub struct Segmentator {}

impl Segmentator {
    pub fn new() -> Self {
        Segmentator {}
    }

    pub fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
    }

    pub fn parse_tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.unicode_words().collect()
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = self.normalize(text);
        self.parse_tokens(&normalized).into_iter().map(String::from).collect()
    }
}
