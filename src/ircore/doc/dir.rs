use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use super::Document;
use super::text::TextFileLoader;

/// Breadth-first walk over a corpus directory. Entries of each directory are
/// visited in name order, so document ids are stable between builds.
pub struct DirIter {
    path_queue: VecDeque<PathBuf>,
}

impl DirIter {
    pub fn new(path: &Path) -> Self {
        DirIter {
            path_queue: VecDeque::from(vec![path.to_path_buf()]),
        }
    }
    fn ignore(path: &Path) -> bool {
        if let Some(filename) = path.file_name() {
            // hidden files, index dirs and config files on unix like platforms
            if filename.to_string_lossy().starts_with('.') {
                return true;
            }
        }
        false
    }
}

impl Iterator for DirIter {
    type Item = Document;
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(path) = self.path_queue.pop_front() {
            if path.is_file() {
                match Document::parse_file(&path) {
                    Ok(doc) => return Some(doc),
                    Err(e) => log::error!("{}: {}", path.display(), e),
                }
            } else if path.is_dir() {
                log::debug!("{}...", path.display());
                match path.read_dir() {
                    Ok(entries) => {
                        let mut children: Vec<PathBuf> = entries
                            .filter_map(|e| e.ok())
                            .map(|e| e.path())
                            .filter(|p| {
                                // the root itself is never filtered
                                if Self::ignore(p) {
                                    log::info!("ignore {}", p.display());
                                    false
                                } else {
                                    true
                                }
                            })
                            .collect();
                        children.sort();
                        self.path_queue.extend(children);
                    }
                    Err(e) => log::error!("read dir {} failed: {}", path.display(), e),
                }
            }
        }
        None
    }
}
