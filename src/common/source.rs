// Copyright (c) 2016-2021 Fabian Schuiki

//! Source locations within grammar text. Offsets are byte offsets into the
//! input; lines and columns are 1-based and count characters.

use std::fmt;
use std::path::{Path, PathBuf};

/// A human-readable position in a grammar source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: Option<PathBuf>,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Compute the location of a byte offset within `input`.
    pub fn from_offset(input: &str, offset: usize) -> Location {
        let (line, column) = pos_to_line_col(input, offset);
        Location {
            path: None,
            offset,
            line,
            column,
        }
    }

    /// Associate the location with a file.
    pub fn with_path<P: AsRef<Path>>(self, path: Option<P>) -> Location {
        Location {
            path: path.map(|p| p.as_ref().to_path_buf()),
            ..self
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}:", path.display())?;
        }
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Convert a byte offset into a 1-based line and column.
///
/// Offsets past the end of the input are clamped to the end. An offset that
/// falls inside a multi-byte character is attributed to that character.
pub fn pos_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let mut line = 1;
    let mut column = 1;
    for (i, c) in input.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Extract a short excerpt of the input around `offset` for error messages.
pub fn context_around(input: &str, offset: usize, width: usize) -> String {
    let offset = offset.min(input.len());
    let mut begin = offset.saturating_sub(width);
    while !input.is_char_boundary(begin) {
        begin -= 1;
    }
    let mut end = (offset + width).min(input.len());
    while !input.is_char_boundary(end) {
        end += 1;
    }
    let mut mid = offset;
    while !input.is_char_boundary(mid) {
        mid -= 1;
    }
    format!("{}*{}", &input[begin..mid], &input[mid..end])
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col() {
        let input = "ab\ncd\n\nef";
        assert_eq!(pos_to_line_col(input, 0), (1, 1));
        assert_eq!(pos_to_line_col(input, 1), (1, 2));
        assert_eq!(pos_to_line_col(input, 3), (2, 1));
        assert_eq!(pos_to_line_col(input, 7), (4, 1));
        assert_eq!(pos_to_line_col(input, 100), (4, 3));
    }

    #[test]
    fn line_col_counts_chars() {
        assert_eq!(pos_to_line_col("ММ x", 5), (1, 4));
    }

    #[test]
    fn excerpt() {
        assert_eq!(context_around("abc\ndef", 4, 2), "c\\n*de");
    }

    #[test]
    fn display_with_path() {
        let loc = Location::from_offset("a\nb", 2).with_path(Some("g.pg"));
        assert_eq!(loc.to_string(), "g.pg:2:1");
    }
}
