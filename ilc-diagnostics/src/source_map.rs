use std::path::{Path, PathBuf};

use crate::{FileId, Location};

struct SourceFile {
    path: PathBuf,
    contents: String,
    /// Byte offset of the start of each line, computed lazily on first use.
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(path: PathBuf, contents: String) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in contents.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        SourceFile {
            path,
            contents,
            line_starts,
        }
    }

    /// 1-indexed line/column for a byte offset.
    fn line_col(&self, offset: u32) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let column = (offset - line_start) as usize + 1;
        (line + 1, column)
    }

    fn line(&self, line_number: usize) -> Option<&str> {
        if line_number == 0 || line_number > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line_number - 1] as usize;
        let end = self
            .line_starts
            .get(line_number)
            .map(|&e| e as usize)
            .unwrap_or(self.contents.len());
        Some(self.contents[start..end].trim_end_matches(['\n', '\r']))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceMapError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Owns every file's contents for the compilation and maps byte offsets
/// back to line/column for diagnostic rendering.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap::default()
    }

    /// Registers in-memory source text under `path`, returning a fresh `FileId`.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: String) -> FileId {
        let id = FileId::new(self.files.len());
        self.files.push(SourceFile::new(path.into(), contents));
        id
    }

    /// Reads `path` from disk and registers it.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<FileId, SourceMapError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SourceMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.add_file(path.to_path_buf(), contents))
    }

    pub fn path(&self, file: FileId) -> &Path {
        &self.files[file.index()].path
    }

    pub fn source(&self, file: FileId) -> &str {
        &self.files[file.index()].contents
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// 1-indexed (line, column) of `loc.start`.
    pub fn line_col(&self, loc: Location) -> (usize, usize) {
        self.files[loc.file.index()].line_col(loc.start)
    }

    /// The text of a 1-indexed line, without its trailing newline.
    pub fn line_text(&self, file: FileId, line_number: usize) -> Option<&str> {
        self.files[file.index()].line(line_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_tracks_newlines() {
        let mut sm = SourceMap::new();
        let file = sm.add_file("t.ilc", "fn main() {\n  return 1;\n}\n".to_string());
        let (line, col) = sm.line_col(Location::new(file, 14, 20));
        assert_eq!((line, col), (2, 3));
    }

    #[test]
    fn line_text_returns_trimmed_lines() {
        let mut sm = SourceMap::new();
        let file = sm.add_file("t.ilc", "one\ntwo\nthree".to_string());
        assert_eq!(sm.line_text(file, 1), Some("one"));
        assert_eq!(sm.line_text(file, 2), Some("two"));
        assert_eq!(sm.line_text(file, 3), Some("three"));
        assert_eq!(sm.line_text(file, 4), None);
    }
}
