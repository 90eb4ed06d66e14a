//! Text format for persisted systems.
//!
//! A system file is line-oriented:
//!
//! ```text
//! file      = header { row }
//! header    = size sep accuracy
//! row       = number { ',' number }      (exactly size + 1 numbers)
//! sep       = whitespace | ','
//! ```
//!
//! Blank lines are ignored anywhere. Lines after the last row are ignored.
//!
//! # Example
//!
//! ```text
//! 2 0.0001
//! 4, 1, 2
//! 1, 3, 5
//! ```

mod parser;

pub use parser::Parser;

use std::fmt::Write;

use crate::error::Result;

/// Contents of a system file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSystem {
    /// Declared order of the system
    pub size: usize,
    /// Requested precision
    pub accuracy: f64,
    /// Augmented rows, `size + 1` numbers each
    pub matrix: Vec<Vec<f64>>,
}

/// Parse a system from text.
pub fn parse(input: &str) -> Result<ParsedSystem> {
    Parser::new(input).parse()
}

/// Parse a system file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<ParsedSystem> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::JacobiError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

/// Render a system in the file format.
pub fn to_text(accuracy: f64, matrix: &[Vec<f64>]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{} {}", matrix.len(), accuracy);
    for row in matrix {
        let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        let _ = writeln!(out, "{}", fields.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_text_parses_back() {
        let matrix = vec![vec![4.5, -1.0, 2.25], vec![1.0, 3.0, -5.125]];
        let text = to_text(0.001, &matrix);
        assert_eq!(text, "2 0.001\n4.5, -1, 2.25\n1, 3, -5.125\n");

        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.size, 2);
        assert_eq!(parsed.accuracy, 0.001);
        assert_eq!(parsed.matrix, matrix);
    }
}
