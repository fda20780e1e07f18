//! Parses the line-oriented program format into an initial memory
//! image. The first significant character of each line decides what it
//! means: `.` repositions the load cursor, a digit starts a literal
//! stored at the cursor, anything else is a comment.

use common::constants::{Cell, MEMORY_SIZE};

use log::trace;
use thiserror::Error;

pub type MemoryImage = Box<[Cell; MEMORY_SIZE]>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("line {line}: expected an address after '.'")]
    MissingAddress { line: usize },

    #[error("line {line}: literal doesn't fit in a cell")]
    LiteralOverflow { line: usize },

    #[error("line {line}: load cursor {cursor} is outside memory")]
    CursorOutOfRange { line: usize, cursor: usize },
}

pub fn parse_program(src: &str) -> Result<MemoryImage, LoadError> {
    let mut image: MemoryImage = Box::new([0; MEMORY_SIZE]);
    let mut cursor = 0usize;

    for (idx, text) in src.lines().enumerate() {
        let line = idx + 1;
        let rest = text.trim_start_matches(' ');
        let Some(first) = rest.chars().next() else {
            continue;
        };

        if first == '.' {
            let digits = leading_digits(&rest[1..]);
            if digits.is_empty() {
                return Err(LoadError::MissingAddress { line });
            }
            cursor = digits
                .parse()
                .map_err(|_| LoadError::LiteralOverflow { line })?;
            trace!("line {line}: cursor moved to {cursor}");
        } else if first.is_ascii_digit() {
            let digits = leading_digits(rest);
            let value: Cell = digits
                .parse()
                .map_err(|_| LoadError::LiteralOverflow { line })?;
            if cursor >= MEMORY_SIZE {
                return Err(LoadError::CursorOutOfRange { line, cursor });
            }
            trace!("line {line}: [{cursor}] = {value}");
            image[cursor] = value;
            cursor += 1;
        }
        // Any other first character marks a comment.
    }

    Ok(image)
}

// The digit run at the start of the input; trailing text is ignored,
// matching the original loader.
fn leading_digits(input: &str) -> &str {
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    &input[..end]
}
