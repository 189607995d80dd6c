//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use colcalc_core::{Table, Value};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a table
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Table> {
        let path = path.as_ref();
        log::debug!("reading CSV from {}", path.display());
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a table
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .from_reader(reader);

        let mut names: Vec<String> = if options.has_header {
            csv_reader.headers()?.iter().map(str::to_string).collect()
        } else {
            Vec::new()
        };
        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
        let mut rows = 0usize;

        // Read records
        for result in csv_reader.records() {
            let record = result?;

            // Headerless input: the first record fixes the width
            if !options.has_header && rows == 0 {
                names = (0..record.len()).map(|i| format!("column_{}", i)).collect();
                columns = vec![Vec::new(); names.len()];
            }

            for (column, field) in columns.iter_mut().zip(record.iter()) {
                let value = if options.auto_detect_types {
                    Self::detect_type(field)
                } else if field.is_empty() {
                    Value::Null
                } else {
                    Value::text(field)
                };
                column.push(value);
            }

            rows += 1;
        }

        log::debug!("read {} columns x {} rows", names.len(), rows);

        let mut table = Table::with_row_count(rows);
        for (name, values) in names.into_iter().zip(columns) {
            if table.contains_column(&name) {
                return Err(colcalc_core::Error::DuplicateColumn(name).into());
            }
            table.set_column(name, values)?;
        }
        Ok(table)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> Value {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return Value::Null;
        }

        // Try number
        if let Ok(n) = trimmed.parse::<f64>() {
            return Value::Number(n);
        }

        // Try boolean
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Boolean(false);
        }

        // Default to text, untrimmed
        Value::text(field)
    }
}
