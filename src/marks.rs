//! Named marks that survive edits to the buffer.
//!
//! A mark is stored as a line-start anchor kept in the host's region store
//! plus a column delta kept here. The anchor follows edits made elsewhere in
//! the buffer, so the mark still resolves to the same column of the same
//! line as long as the anchor itself is not deleted.

use crate::host::{Buffer, RegionStore};
use std::collections::HashMap;

/// Name used by mark operations called without a name.
pub const DEFAULT_MARK: &str = "__default__";

const REGION_PREFIX: &str = "typecast.mark.";

/// Mark name to column delta. Outlives a single run.
#[derive(Debug, Default, Clone)]
pub struct MarkTable {
    deltas: HashMap<String, usize>,
}

impl MarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.deltas.contains_key(name)
    }

    fn region_name(name: &str) -> String {
        format!("{REGION_PREFIX}{name}")
    }

    /// Remember `offset` under `name`, replacing any previous mark of that name.
    ///
    /// A mark at the very start of a line is anchored on the previous line's
    /// break with a delta of 1, so an insertion at the line start does not
    /// drag the anchor along. At offset 0 there is no previous line; the mark
    /// keeps a delta of 0 and is pinned to the start of the buffer.
    pub fn set<T: Buffer + RegionStore + ?Sized>(&mut self, target: &mut T, name: &str, offset: usize) {
        let mut anchor = target.line_at(offset).start;
        let mut delta = offset - anchor;
        if delta == 0 && anchor > 0 {
            delta = 1;
            anchor -= 1;
        }
        target.tag(&Self::region_name(name), vec![anchor..anchor]);
        self.deltas.insert(name.to_string(), delta);
    }

    /// Current offset of the mark, or `None` if it does not exist.
    pub fn resolve<T: RegionStore + ?Sized>(&self, target: &T, name: &str) -> Option<usize> {
        let delta = *self.deltas.get(name)?;
        let anchor = target.get(&Self::region_name(name)).first()?.start;
        // Only a buffer-start mark has delta 0.
        if delta == 0 {
            return Some(0);
        }
        Some(anchor + delta)
    }

    /// Forget every mark and drop their anchors from the region store.
    pub fn clear<T: RegionStore + ?Sized>(&mut self, target: &mut T) {
        for name in self.deltas.keys() {
            target.untag(&Self::region_name(name));
        }
        self.deltas.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTarget;

    #[test]
    fn test_mark_follows_edits_on_earlier_lines() {
        let mut target = MemoryTarget::with_text("first\nsecond line");
        let mut marks = MarkTable::new();
        marks.set(&mut target, "m", 13);
        target.replace(0..0, "zero\n");
        assert_eq!(marks.resolve(&target, "m"), Some(18));
        assert_eq!(target.read(18..22), "line");
    }

    #[test]
    fn test_line_start_mark_survives_insertion_at_line_start() {
        let mut target = MemoryTarget::with_text("abc\ndef");
        let mut marks = MarkTable::new();
        marks.set(&mut target, "start", 4);
        assert_eq!(target.get("typecast.mark.start"), vec![3..3]);

        target.replace(4..4, "xyz");
        assert_eq!(marks.resolve(&target, "start"), Some(4));
    }

    #[test]
    fn test_mark_at_buffer_start() {
        let mut target = MemoryTarget::with_text("abc");
        let mut marks = MarkTable::new();
        marks.set(&mut target, DEFAULT_MARK, 0);
        assert_eq!(marks.resolve(&target, DEFAULT_MARK), Some(0));

        target.replace(0..0, "xyz\n");
        assert_eq!(marks.resolve(&target, DEFAULT_MARK), Some(0));
    }

    #[test]
    fn test_clear_drops_regions() {
        let mut target = MemoryTarget::with_text("abc\ndef");
        let mut marks = MarkTable::new();
        marks.set(&mut target, "a", 1);
        marks.set(&mut target, "b", 5);
        assert_eq!(marks.len(), 2);

        marks.clear(&mut target);
        assert!(marks.is_empty());
        assert_eq!(marks.resolve(&target, "a"), None);
        assert!(target.get("typecast.mark.b").is_empty());
    }

    #[test]
    fn test_unknown_mark() {
        let target = MemoryTarget::new();
        assert_eq!(MarkTable::new().resolve(&target, "nope"), None);
    }
}
