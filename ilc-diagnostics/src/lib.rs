//! Source locations, string interning and diagnostic collection.
//!
//! This crate has no dependency on the AST or any later compiler phase; it
//! is the foundation every other `ilc-*` crate builds on.

mod diagnostic;
mod source_map;
mod string_table;
mod suggest;

pub use diagnostic::{Diagnostic, DiagnosticEngine, DiagnosticKind};
pub use source_map::{SourceMap, SourceMapError};
pub use string_table::{AstString, InternedString, StringTable};
pub use suggest::did_you_mean;

/// Dense index into a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u32);

impl FileId {
    /// Sentinel used by [`Location::EMPTY`]; never produced by [`SourceMap::add_file`].
    pub const EMPTY: FileId = FileId(u32::MAX);

    pub(crate) fn new(index: usize) -> Self {
        FileId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A byte-offset span within a single file.
///
/// `EMPTY` is used for synthetic nodes (primitive types, builtin objects)
/// that have no corresponding source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: FileId,
    pub start: u32,
    pub end: u32,
}

impl Location {
    pub const EMPTY: Location = Location {
        file: FileId::EMPTY,
        start: 0,
        end: 0,
    };

    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Location { file, start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.file == FileId::EMPTY
    }

    /// The smallest span enclosing both `self` and `other`.
    ///
    /// A synthetic (`EMPTY`) operand is ignored; merging two synthetic
    /// locations stays synthetic.
    pub fn merge(self, other: Location) -> Location {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        debug_assert_eq!(self.file, other.file, "cannot merge locations across files");
        Location {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty_span(&self) -> bool {
        self.len() == 0
    }
}
