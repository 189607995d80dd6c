//! Column-oriented table

use crate::error::{Error, Result};
use crate::ordered::OrderedMap;
use crate::value::Value;

/// An ordered collection of named, equal-length columns
///
/// The row count is fixed by the first column written (or up front with
/// [`Table::with_row_count`]). Every later write must match it, so the
/// row count of a table never changes once known.
///
/// Overwriting a column keeps its position; new columns are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column data by name, in column order
    columns: OrderedMap<Vec<Value>>,
    /// Row count, once known
    rows: Option<usize>,
}

impl Table {
    /// Create an empty table whose row count is set by the first column
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with a fixed row count
    pub fn with_row_count(rows: usize) -> Self {
        Self {
            rows: Some(rows),
            ..Self::default()
        }
    }

    /// Build a table from `(name, values)` pairs
    ///
    /// # Example
    /// ```rust
    /// use colcalc_core::{Table, Value};
    ///
    /// let table = Table::from_columns([("price", vec![100, 200]), ("qty", vec![2, 3])]).unwrap();
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.column("qty").unwrap()[1], Value::Number(3.0));
    /// ```
    pub fn from_columns<I, N, V>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: IntoIterator,
        V::Item: Into<Value>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            let name = name.into();
            if table.columns.contains_key(&name) {
                return Err(Error::DuplicateColumn(name));
            }
            table.set_column(name, values.into_iter().map(Into::into).collect())?;
        }
        Ok(table)
    }

    /// Number of rows (0 while no column has been written)
    pub fn row_count(&self) -> usize {
        self.rows.unwrap_or(0)
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.keys()
    }

    /// Check if a column exists
    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Get a column by name, failing if it is absent
    pub fn get(&self, name: &str) -> Result<&[Value]> {
        self.column(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Write a column, replacing any existing column of the same name
    ///
    /// Returns `true` if the column was newly created.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<bool> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidColumnName(name));
        }

        match self.rows {
            Some(expected) if values.len() != expected => {
                return Err(Error::ColumnLengthMismatch {
                    column: name,
                    expected,
                    actual: values.len(),
                });
            }
            Some(_) => {}
            None => self.rows = Some(values.len()),
        }

        Ok(self.columns.insert(name, values).is_none())
    }

    /// Get one row as a vector of values in column order
    pub fn row(&self, row: usize) -> Option<Vec<&Value>> {
        if row >= self.row_count() {
            return None;
        }
        Some(self.columns.values().map(|col| &col[row]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_row_count_fixed_by_first_column() {
        let mut table = Table::new();
        assert_eq!(table.row_count(), 0);

        assert!(table.set_column("a", vec![Value::from(1), Value::from(2)]).unwrap());
        assert_eq!(table.row_count(), 2);

        let err = table.set_column("b", vec![Value::from(1)]).unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnLengthMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        assert!(!table.contains_column("b"));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut table = Table::from_columns([("a", vec![1, 2]), ("b", vec![3, 4])]).unwrap();

        let created = table
            .set_column("a", vec![Value::from(10), Value::from(20)])
            .unwrap();
        assert!(!created);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(table.column("a").unwrap()[0], Value::Number(10.0));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = Table::from_columns([("a", vec![1]), ("a", vec![2])]).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_with_row_count() {
        let mut table = Table::with_row_count(3);
        assert_eq!(table.row_count(), 3);
        assert!(table.set_column("x", vec![Value::Null; 2]).is_err());
        assert!(table.set_column("x", vec![Value::Null; 3]).is_ok());
    }

    #[test]
    fn test_get_missing_column() {
        let table = Table::new();
        assert!(matches!(table.get("nope"), Err(Error::ColumnNotFound(_))));
    }

    #[test]
    fn test_row_access() {
        let table = Table::from_columns([("a", vec![1, 2]), ("b", vec![3, 4])]).unwrap();
        let row = table.row(1).unwrap();
        assert_eq!(row, vec![&Value::Number(2.0), &Value::Number(4.0)]);
        assert!(table.row(2).is_none());
    }
}
