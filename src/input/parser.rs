//! Parser for the system file format.

use crate::error::{JacobiError, Result};

use super::ParsedSystem;

/// Line-oriented parser over the non-blank lines of a file.
pub struct Parser<'a> {
    /// (1-based source line, trimmed text)
    lines: Vec<(usize, &'a str)>,
    /// Index into `lines` of the next line to consume
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser for the given text.
    pub fn new(input: &'a str) -> Self {
        let lines = input
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();
        Self { lines, pos: 0 }
    }

    /// Parse the header and the rows it announces.
    pub fn parse(&mut self) -> Result<ParsedSystem> {
        let (size, accuracy) = self.parse_header()?;

        // The header size is untrusted, so rows are not preallocated.
        let mut matrix = Vec::new();
        for row in 0..size {
            let (line, text) = self.next_line().ok_or_else(|| {
                JacobiError::malformed(
                    self.end_line(),
                    format!("Expected {} matrix rows, got {}", size, row),
                )
            })?;
            matrix.push(parse_row(line, text, size)?);
        }

        Ok(ParsedSystem {
            size,
            accuracy,
            matrix,
        })
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    /// Line number just past the last non-blank line.
    fn end_line(&self) -> usize {
        self.lines.last().map_or(1, |(line, _)| line + 1)
    }

    fn parse_header(&mut self) -> Result<(usize, f64)> {
        let (line, text) = self
            .next_line()
            .ok_or_else(|| JacobiError::malformed(1, "File is empty"))?;

        let normalized = text.replace(',', " ");
        let parts: Vec<&str> = normalized.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(JacobiError::malformed(
                line,
                "First line should have two numbers: matrix size and accuracy",
            ));
        }

        let size: i64 = parts[0]
            .parse()
            .map_err(|_| JacobiError::malformed(line, format!("Wrong matrix size '{}'", parts[0])))?;
        let accuracy: f64 = parts[1]
            .parse()
            .map_err(|_| JacobiError::malformed(line, format!("Wrong accuracy '{}'", parts[1])))?;

        if size <= 0 {
            return Err(JacobiError::malformed(
                line,
                format!("Matrix size should be greater than 0 (got {})", size),
            ));
        }

        let size = usize::try_from(size)
            .map_err(|_| JacobiError::malformed(line, format!("Matrix size {} is too large", size)))?;
        Ok((size, accuracy))
    }
}

/// Parse one comma-separated row of `size + 1` numbers.
fn parse_row(line: usize, text: &str, size: usize) -> Result<Vec<f64>> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let expected = size.saturating_add(1);
    if fields.len() != expected {
        return Err(JacobiError::malformed(
            line,
            format!("Expected {} numbers in row, got {}", expected, fields.len()),
        ));
    }

    fields
        .iter()
        .map(|field| match field.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(JacobiError::malformed(line, format!("Wrong number '{}'", field))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::error::JacobiError;

    fn error_line(input: &str) -> (usize, String) {
        match parse(input).unwrap_err() {
            JacobiError::MalformedInput { line, message } => (line, message),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_basic() {
        let parsed = parse("2 0.0001\n4, 1, 2\n1, 3, 5\n").unwrap();
        assert_eq!(parsed.size, 2);
        assert_eq!(parsed.accuracy, 0.0001);
        assert_eq!(parsed.matrix, vec![vec![4.0, 1.0, 2.0], vec![1.0, 3.0, 5.0]]);
    }

    #[test]
    fn test_blank_lines_and_comma_header() {
        let input = "\n  \n3, 1e-3\n\n10,1,1,12\r\n1,10,1,12\n\n1,1,10,12\n";
        let parsed = parse(input).unwrap();
        assert_eq!(parsed.size, 3);
        assert_eq!(parsed.accuracy, 1e-3);
        assert_eq!(parsed.matrix[2], vec![1.0, 1.0, 10.0, 12.0]);
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(error_line("\n\n").0, 1);
    }

    #[test]
    fn test_short_header() {
        let (line, message) = error_line("\n2\n1,2,3\n");
        assert_eq!(line, 2);
        assert!(message.contains("two numbers"));
    }

    #[test]
    fn test_bad_header_tokens() {
        assert!(error_line("two 0.1").1.contains("'two'"));
        assert!(error_line("2 small").1.contains("'small'"));
        assert!(error_line("0 0.1").1.contains("greater than 0"));
        assert!(error_line("-2 0.1").1.contains("greater than 0"));
    }

    #[test]
    fn test_missing_rows() {
        let (line, message) = error_line("3 0.1\n1,0,0,1\n0,1,0,1\n");
        assert_eq!(line, 4);
        assert_eq!(message, "Expected 3 matrix rows, got 2");
    }

    #[test]
    fn test_wrong_field_count() {
        let (line, message) = error_line("2 0.1\n4,1,2\n\n1,3\n");
        assert_eq!(line, 4);
        assert_eq!(message, "Expected 3 numbers in row, got 2");
    }

    #[test]
    fn test_huge_header_size_fails_on_first_row() {
        let (line, message) = error_line("18446744073709551 0.1\n1,2\n");
        assert_eq!(line, 2);
        assert_eq!(message, "Expected 18446744073709552 numbers in row, got 2");

        let (line, message) = error_line("9223372036854775807 0.1\n");
        assert_eq!(line, 2);
        assert_eq!(message, "Expected 9223372036854775807 matrix rows, got 0");
    }

    #[test]
    fn test_wrong_number() {
        let (line, message) = error_line("2 0.1\n4,x1,2\n1,3,5\n");
        assert_eq!(line, 2);
        assert_eq!(message, "Wrong number 'x1'");

        assert!(error_line("2 0.1\n4,inf,2\n1,3,5\n").1.contains("'inf'"));
    }
}
