pub mod dir;
pub mod text;

use std::path::Path;

#[derive(PartialEq, Debug)]
pub struct Document {
    content: String,
    path: String,
}

impl Document {
    pub fn new(content: String, path: String) -> Self {
        Document { content, path }
    }
    pub fn get_content(&self) -> &str {
        &self.content
    }
    pub fn get_path(&self) -> &str {
        &self.path
    }
}

/// Last path component of a document name, the key used by the link graph
/// and the PageRank file.
pub fn file_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(name)
}
