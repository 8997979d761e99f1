//! A small column-major numeric table with absent cells.

use serde::Serialize;

use crate::error::AppError;

/// One named column; `None` marks an absent cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a fully-present column.
    pub fn dense(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn absent_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    pub fn has_present(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }
}

/// Named columns of equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, AppError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(AppError::data(format!(
                "Column '{}' has {} rows, expected {n_rows}.",
                bad.name,
                bad.len()
            )));
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn absent_count(&self) -> usize {
        self.columns.iter().map(Column::absent_count).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.absent_count() == 0
    }

    /// Apply `f` to every column, keeping names and shape.
    pub(crate) fn map_columns<F>(&self, mut f: F) -> Table
    where
        F: FnMut(&Column) -> Vec<Option<f64>>,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = f(c);
                debug_assert_eq!(values.len(), c.len());
                Column::new(c.name.clone(), values)
            })
            .collect();
        Table {
            columns,
            n_rows: self.n_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::dense("a", [1.0, 2.0]),
            Column::dense("b", [1.0]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn counts_absent_cells() {
        let t = Table::new(vec![
            Column::new("a", vec![Some(1.0), None, None]),
            Column::new("b", vec![None, Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.absent_count(), 3);
        assert!(!t.is_complete());
        assert_eq!(t.column("a").unwrap().absent_count(), 2);
        assert!(t.column("missing").is_none());
    }
}
