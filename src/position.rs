//! Row/column addressing that grows the buffer on demand.
//!
//! Scripts describe where text should end up before that text exists, so
//! writing at any `(row, col)` first pads the buffer with newlines and spaces
//! until the coordinate is real.

use crate::host::Buffer;

/// Make `(row, col)` addressable with room for `width` characters after it,
/// and return its offset.
///
/// Missing rows are appended as newlines at the end of the buffer; a short
/// target line is padded with trailing spaces. Calling it again with the
/// same arguments and no edit in between changes nothing.
pub fn resolve<B: Buffer + ?Sized>(buffer: &mut B, row: usize, col: usize, width: usize) -> usize {
    let lines = buffer.line_count();
    if row >= lines {
        let end = buffer.size();
        buffer.replace(end..end, &"\n".repeat(row + 1 - lines));
    }

    let line = buffer.line_at(buffer.point_at(row, 0));
    let needed = col + width;
    let len = line.end - line.start;
    if needed > len {
        buffer.replace(line.end..line.end, &" ".repeat(needed - len));
    }

    line.start + col
}

/// Overwrite the buffer at `(row, col)` with `text`, growing it as needed.
///
/// Multi-line text is placed line by line at increasing rows, all starting
/// at `col`. Returns the offset just past the written text for single-line
/// text, and `None` for multi-line text.
pub fn write_at<B: Buffer + ?Sized>(buffer: &mut B, row: usize, col: usize, text: &str) -> Option<usize> {
    if text.contains('\n') {
        for (i, line) in text.lines().enumerate() {
            write_at(buffer, row + i, col, line);
        }
        return None;
    }

    let width = text.chars().count();
    let point = resolve(buffer, row, col, width);
    buffer.replace(point..point + width, text);
    Some(point + width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTarget;

    #[test]
    fn test_resolve_grows_rows_and_columns() {
        let mut buffer = MemoryTarget::with_text("abc");
        let offset = resolve(&mut buffer, 3, 5, 0);
        assert_eq!(buffer.text(), "abc\n\n\n     ");
        assert_eq!(buffer.line_count(), 4);
        assert_eq!(offset, 11);
        assert_eq!(buffer.row_col_of(offset), (3, 5));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut buffer = MemoryTarget::with_text("abc");
        let first = resolve(&mut buffer, 3, 5, 2);
        let after_first = buffer.text();
        let second = resolve(&mut buffer, 3, 5, 2);
        assert_eq!(first, second);
        assert_eq!(buffer.text(), after_first);
    }

    #[test]
    fn test_resolve_inside_existing_text_changes_nothing() {
        let mut buffer = MemoryTarget::with_text("hello\nworld");
        assert_eq!(resolve(&mut buffer, 1, 2, 3), 8);
        assert_eq!(buffer.text(), "hello\nworld");
    }

    #[test]
    fn test_resolve_pads_a_middle_line() {
        let mut buffer = MemoryTarget::with_text("a\nb\nc");
        let offset = resolve(&mut buffer, 1, 3, 1);
        assert_eq!(buffer.text(), "a\nb   \nc");
        assert_eq!(offset, 5);
    }

    #[test]
    fn test_write_at_overwrites() {
        let mut buffer = MemoryTarget::with_text("hello world");
        assert_eq!(write_at(&mut buffer, 0, 6, "there"), Some(11));
        assert_eq!(buffer.text(), "hello there");
    }

    #[test]
    fn test_write_at_multi_line_keeps_column() {
        let mut buffer = MemoryTarget::new();
        assert_eq!(write_at(&mut buffer, 1, 2, "ab\ncd"), None);
        assert_eq!(buffer.text(), "\n  ab\n  cd");
    }
}
