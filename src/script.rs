//! Script documents: decoding entries and splitting a source into blocks.
//!
//! A script is a YAML sequence of entries. Each entry takes one of three
//! equivalent shapes:
//!
//! ```yaml
//! - write: "keyed entry"
//! - [write, "positional entry"]
//! - nl                      # bare entry, no arguments
//! ```
//!
//! The top-level entry points are [`parse_script`], [`decode_entry`] and
//! [`split_blocks`].

use crate::error::{DirectorError, Result};
use serde_yaml::Value;
use std::ops::Range;

/// Parse a script document into its entries.
///
/// An empty document is an empty script. A document holding a single entry
/// instead of a sequence is treated as a one-entry script.
///
/// # Errors
///
/// Returns [`DirectorError::Script`] if the text is not valid YAML.
///
/// # Example
///
/// ```
/// use typecast::parse_script;
///
/// let entries = parse_script("- write: hello\n- nl\n").unwrap();
/// assert_eq!(entries.len(), 2);
/// ```
pub fn parse_script(content: &str) -> Result<Vec<Value>> {
    match serde_yaml::from_str::<Value>(content)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(entries) => Ok(entries),
        entry => Ok(vec![entry]),
    }
}

/// Normalize one entry into its operation name and positional arguments.
///
/// A keyed entry whose value is null or an empty mapping, and a positional
/// entry whose only argument is an empty mapping, both mean "no arguments".
/// A value that is not a sequence becomes a single argument.
///
/// # Errors
///
/// Returns [`DirectorError::UnknownOperation`] when the entry has no usable
/// operation name.
pub fn decode_entry(entry: &Value) -> Result<(String, Vec<Value>)> {
    let (name, args) = match entry {
        Value::Mapping(map) => {
            let (key, value) = map
                .iter()
                .next()
                .ok_or_else(|| DirectorError::UnknownOperation("{}".to_string()))?;
            (operation_name(key)?, spread(value))
        }
        Value::Sequence(items) => {
            let (head, rest) = items
                .split_first()
                .ok_or_else(|| DirectorError::UnknownOperation("[]".to_string()))?;
            (operation_name(head)?, rest.to_vec())
        }
        Value::Tagged(tagged) => return decode_entry(&tagged.value),
        other => (operation_name(other)?, Vec::new()),
    };

    if args.len() == 1 && is_empty_mapping(&args[0]) {
        return Ok((name, Vec::new()));
    }
    Ok((name, args))
}

fn operation_name(value: &Value) -> Result<String> {
    match value {
        Value::String(name) => Ok(name.clone()),
        other => Err(DirectorError::UnknownOperation(
            scalar_text(other).unwrap_or_else(|| format!("{other:?}")),
        )),
    }
}

fn spread(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn is_empty_mapping(value: &Value) -> bool {
    matches!(value, Value::Mapping(map) if map.is_empty())
}

/// Render a scalar as text; `None` for sequences, mappings and null.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

/// Unescape a double-quoted literal, line by line.
///
/// Lines that are not wrapped in double quotes are returned as they are.
/// Inside quotes, `\n`, `\t`, `\r`, `\0`, `\"`, `\'` and `\\` are
/// processed, as are the code point escapes `\xNN`, `\uNNNN`, `\u{N..}` and
/// `\UNNNNNNNN`. Any other backslash sequence, or a code point escape that
/// does not name a valid character, is kept verbatim.
pub fn unquote(text: &str) -> String {
    if text.contains('\n') {
        return text.split('\n').map(unquote_line).collect::<Vec<_>>().join("\n");
    }
    unquote_line(text)
}

fn unquote_line(line: &str) -> String {
    let inner = match line.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner,
        None => return line.to_string(),
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(kind @ ('x' | 'u' | 'U')) => match code_point(&mut chars, kind) {
                Some(decoded) => out.push(decoded),
                None => {
                    out.push('\\');
                    out.push(kind);
                }
            },
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Decode the digits of a `\x`, `\u` or `\U` escape. `chars` only advances
/// past the digits when they form a valid character.
fn code_point(chars: &mut std::str::Chars<'_>, kind: char) -> Option<char> {
    let mut ahead = chars.clone();
    let digits: String = match kind {
        'u' if ahead.as_str().starts_with('{') => {
            let rest = &ahead.as_str()[1..];
            let close = rest.find('}')?;
            let digits = rest[..close].to_string();
            if digits.is_empty() || digits.len() > 6 {
                return None;
            }
            ahead = rest[close + 1..].chars();
            digits
        }
        _ => {
            let width = match kind {
                'x' => 2,
                'u' => 4,
                _ => 8,
            };
            let digits: String = ahead.by_ref().take(width).collect();
            if digits.chars().count() != width {
                return None;
            }
            digits
        }
    };
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let decoded = u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)?;
    *chars = ahead;
    Some(decoded)
}

/// One independently playable script inside a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Byte range of the block in the source.
    pub range: Range<usize>,
    pub text: String,
}

const BLOCK_SEPARATOR: &str = "\n\n-";

/// Split a source document into script blocks.
///
/// A block starts at a `-` that follows a blank line, or at the start of
/// the document if it begins with `-` after optional whitespace. Trailing
/// whitespace is not part of a block. Text before the first block is ignored.
pub fn split_blocks(source: &str) -> Vec<Block> {
    let mut parts = source.split(BLOCK_SEPARATOR);
    let mut blocks = Vec::new();

    let head = parts.next().unwrap_or_default();
    let lead = head.len() - head.trim_start().len();
    if head[lead..].starts_with('-') {
        blocks.push(block(source, lead..head.trim_end().len()));
    }

    let mut offset = head.len();
    for part in parts {
        // The block keeps the separator's dash.
        let start = offset + BLOCK_SEPARATOR.len() - 1;
        let end = start + 1 + part.trim_end().len();
        blocks.push(block(source, start..end));
        offset = start + 1 + part.len();
    }
    blocks
}

fn block(source: &str, range: Range<usize>) -> Block {
    Block {
        text: source[range.clone()].to_string(),
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_three_entry_shapes_decode_alike() {
        let keyed = decode_entry(&yaml("write: hi")).unwrap();
        let positional = decode_entry(&yaml("[write, hi]")).unwrap();
        let listed = decode_entry(&yaml("write: [hi]")).unwrap();
        assert_eq!(keyed, ("write".to_string(), vec![yaml("hi")]));
        assert_eq!(keyed, positional);
        assert_eq!(keyed, listed);
    }

    #[test]
    fn test_bare_entry_forms() {
        let expected = ("nl".to_string(), Vec::new());
        assert_eq!(decode_entry(&yaml("nl")).unwrap(), expected);
        assert_eq!(decode_entry(&yaml("nl:")).unwrap(), expected);
        assert_eq!(decode_entry(&yaml("nl: {}")).unwrap(), expected);
        assert_eq!(decode_entry(&yaml("[nl, {}]")).unwrap(), expected);
    }

    #[test]
    fn test_keyed_sequence_spreads() {
        let (name, args) = decode_entry(&yaml("write_at: [1, 2, abc]")).unwrap();
        assert_eq!(name, "write_at");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_non_string_name_is_unknown() {
        assert!(matches!(
            decode_entry(&yaml("42")),
            Err(DirectorError::UnknownOperation(name)) if name == "42"
        ));
        assert!(decode_entry(&yaml("[]")).is_err());
    }

    #[test]
    fn test_parse_script_shapes() {
        assert!(parse_script("").unwrap().is_empty());
        assert_eq!(parse_script("nl").unwrap().len(), 1);
        assert_eq!(parse_script("- nl\n- write: x\n").unwrap().len(), 2);
        assert!(matches!(parse_script("- [unclosed"), Err(DirectorError::Script(_))));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote(r#""a\tb""#), "a\tb");
        assert_eq!(unquote(r#""say \"hi\"""#), r#"say "hi""#);
        assert_eq!(unquote("\"x\\n\"\nplain"), "x\n\nplain");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote(r#""\d""#), r"\d");
    }

    #[test]
    fn test_unquote_code_points() {
        assert_eq!(unquote(r#""\x41\u00e9\u{1F600}\U0001F600""#), "A\u{e9}\u{1F600}\u{1F600}");
        assert_eq!(unquote(r#""caf\u00e9!""#), "caf\u{e9}!");
        assert_eq!(unquote(r#""\x4""#), r"\x4");
        assert_eq!(unquote(r#""\u{zz}x""#), r"\u{zz}x");
        assert_eq!(unquote(r#""\ud800""#), r"\ud800");
        assert_eq!(unquote(r#""\u{41""#), r"\u{41");
        assert_eq!(unquote(r#""\x+4""#), r"\x+4");
    }

    #[test]
    fn test_split_blocks() {
        let source = "- write: one\n- nl\n\n- write: two  \n\n\n- write: three\n";
        let blocks = split_blocks(source);
        let texts: Vec<_> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["- write: one\n- nl", "- write: two", "- write: three"]);
        for block in &blocks {
            assert_eq!(&source[block.range.clone()], block.text);
        }
    }

    #[test]
    fn test_split_blocks_skips_preamble() {
        let blocks = split_blocks("# notes\n\n- nl\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "- nl");
        assert_eq!(blocks[0].range, 9..13);
    }

    #[test]
    fn test_split_blocks_leading_whitespace() {
        let blocks = split_blocks("\n  - write: a\n");
        assert_eq!(blocks[0].range, 3..13);
        assert_eq!(blocks[0].text, "- write: a");
    }

    #[test]
    fn test_split_blocks_without_scripts() {
        assert!(split_blocks("just prose").is_empty());
    }
}
