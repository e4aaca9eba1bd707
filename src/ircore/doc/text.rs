use std::fs::{self, File};
use std::io::{self, Read, ErrorKind};
use std::path::Path;
use encoding_rs::ISO_8859_2;
use encoding_rs_io::DecodeReaderBytesBuilder;
use super::Document;

pub trait TextFileLoader {
    fn parse_file(path: &Path) -> io::Result<Document>;
    fn read_to_string_non_utf8_encoding(path: &Path) -> io::Result<String>;
}

impl TextFileLoader for Document {
    fn parse_file(path: &Path) -> io::Result<Document> {
        let path_string = path.to_string_lossy().to_string();
        if !path.is_file() {
            return Err(io::Error::new(ErrorKind::Other, format!("{} is not a file", path_string)));
        }
        match fs::read_to_string(path) {
            Ok(c) => Ok(Document::new(c, path_string)),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                log::debug!("{} is not UTF-8, decoding as ISO-8859-2", path_string);
                let c = Self::read_to_string_non_utf8_encoding(path)?;
                Ok(Document::new(c, path_string))
            }
            Err(e) => Err(e),
        }
    }

    fn read_to_string_non_utf8_encoding(path: &Path) -> io::Result<String> {
        let mut dest = String::new();
        let source_file = File::open(path)?;
        let mut decoder = DecodeReaderBytesBuilder::new()
            .encoding(Some(ISO_8859_2))
            .build(source_file);
        decoder.read_to_string(&mut dest)?;
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.txt");
        fs::write(&path, "Do you quarrel, sir?").unwrap();
        let doc = Document::parse_file(&path).unwrap();
        assert_eq!(doc.get_content(), "Do you quarrel, sir?");
        assert_eq!(doc.get_path(), path.to_string_lossy());
        let err = Document::parse_file(&dir.path().join("non-exist.txt")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_non_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin2");
        // "zażółć" in ISO-8859-2
        fs::write(&path, [0x7a, 0x61, 0xbf, 0xf3, 0xb3, 0xe6]).unwrap();
        let doc = Document::parse_file(&path).unwrap();
        assert_eq!(doc.get_content(), "zażółć");
    }
}
