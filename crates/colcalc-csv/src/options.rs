//! CSV options

/// Options for reading CSV files into a table
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether the first row holds the column names
    ///
    /// Without a header, columns are named `column_0`, `column_1`, ...
    pub has_header: bool,
    /// Per-field type detection, tried in this order:
    ///
    /// 1. an empty field is null,
    /// 2. anything that parses as `f64` is a number,
    /// 3. `true`/`false` (any case) is a boolean,
    /// 4. everything else is text.
    ///
    /// When disabled every non-empty field is read as text.
    pub auto_detect_types: bool,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_header: true,
            auto_detect_types: true,
        }
    }
}

impl CsvReadOptions {
    /// Tab-separated input
    pub fn tsv() -> Self {
        Self::default().with_delimiter(b'\t')
    }

    /// Use a different field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Input without a header row
    pub fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }
}

/// Options for writing a table as CSV
///
/// Values are written with their `Display` form, so null becomes an
/// empty field and integral numbers lose their `.0`.
#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Write the column names as the first row (default: true)
    pub write_header: bool,
    /// Line terminator (default: LF)
    pub line_terminator: LineTerminator,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            write_header: true,
            line_terminator: LineTerminator::LF,
        }
    }
}

impl CsvWriteOptions {
    /// Tab-separated output
    pub fn tsv() -> Self {
        Self::default().with_delimiter(b'\t')
    }

    /// Use a different field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Line terminator written after each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineTerminator {
    /// Unix-style (LF)
    #[default]
    LF,
    /// Windows-style (CRLF)
    CRLF,
}

impl LineTerminator {
    pub(crate) fn to_csv(self) -> csv::Terminator {
        match self {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let read = CsvReadOptions::default();
        assert_eq!(read.delimiter, b',');
        assert!(read.has_header && read.auto_detect_types);

        let write = CsvWriteOptions::default();
        assert!(write.write_header);
        assert_eq!(write.line_terminator, LineTerminator::LF);
    }

    #[test]
    fn test_builders() {
        assert_eq!(CsvReadOptions::tsv().delimiter, b'\t');
        assert_eq!(CsvWriteOptions::tsv().delimiter, b'\t');

        let read = CsvReadOptions::default().with_delimiter(b';').without_header();
        assert_eq!(read.delimiter, b';');
        assert!(!read.has_header);
    }
}
