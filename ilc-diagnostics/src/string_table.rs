use std::collections::HashMap;
use std::fmt;

use crate::Location;

/// A handle into a [`StringTable`]. Equality is identity: two handles
/// compare equal iff they were interned from byte-equal sequences in the
/// *same* table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternedString(u32);

/// Interns identifiers and string literals so that equal byte sequences
/// collapse to one stable handle, making name comparisons an integer
/// comparison instead of a byte comparison.
///
/// Ownership of interned bytes is not taken by callers; the table copies
/// them into its own storage.
#[derive(Default)]
pub struct StringTable {
    strings: Vec<Box<str>>,
    lookup: HashMap<Box<str>, InternedString>,
}

impl StringTable {
    pub fn new() -> Self {
        StringTable::default()
    }

    pub fn intern(&mut self, s: &str) -> InternedString {
        if let Some(existing) = self.lookup.get(s) {
            return *existing;
        }
        let handle = InternedString(self.strings.len() as u32);
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, handle);
        handle
    }

    /// Formats `args` into a fresh string before interning it, for names the
    /// compiler synthesizes (e.g. mangled accessor names) rather than reads
    /// from source.
    pub fn intern_format(&mut self, args: fmt::Arguments<'_>) -> InternedString {
        self.intern(&fmt::format(args))
    }

    pub fn resolve(&self, handle: InternedString) -> &str {
        &self.strings[handle.0 as usize]
    }
}

/// A string literal or identifier carrying its source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AstString {
    pub location: Location,
    pub value: InternedString,
}

impl AstString {
    pub fn new(location: Location, value: InternedString) -> Self {
        AstString { location, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileId;

    #[test]
    fn equal_bytes_intern_to_the_same_handle() {
        let mut table = StringTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        assert_eq!(a, b);

        let c = table.intern("bar");
        assert_ne!(a, c);
    }

    #[test]
    fn resolve_round_trips() {
        let mut table = StringTable::new();
        let handle = table.intern("hello world");
        assert_eq!(table.resolve(handle), "hello world");
    }

    #[test]
    fn intern_format_builds_a_fresh_string() {
        let mut table = StringTable::new();
        let handle = table.intern_format(format_args!("field_{}", 3));
        assert_eq!(table.resolve(handle), "field_3");
    }

    #[test]
    fn ast_string_carries_its_location() {
        let mut table = StringTable::new();
        let value = table.intern("x");
        let loc = Location::new(FileId::EMPTY, 0, 1);
        let s = AstString::new(loc, value);
        assert_eq!(table.resolve(s.value), "x");
    }
}
