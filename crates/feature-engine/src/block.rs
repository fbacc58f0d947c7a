//! Feature Block Assembly

use crate::FeatureError;
use ndarray::{Array1, Array2};

/// Named feature columns sharing one row order.
///
/// Rows are (t, y, x) cells; every column must have exactly `rows` values,
/// which is what keeps blocks aligned when they are concatenated.
#[derive(Debug, Clone)]
pub struct FeatureBlock {
    rows: usize,
    columns: Vec<String>,
    values: Vec<Array1<f64>>,
}

impl FeatureBlock {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append a column, rejecting any length other than `rows`
    pub fn push(&mut self, name: impl Into<String>, column: Array1<f64>) -> Result<(), FeatureError> {
        let name = name.into();
        if column.len() != self.rows {
            return Err(FeatureError::ColumnLength {
                name,
                expected: self.rows,
                actual: column.len(),
            });
        }
        self.columns.push(name);
        self.values.push(column);
        Ok(())
    }

    /// Append every column of another block
    pub fn append(&mut self, other: FeatureBlock) -> Result<(), FeatureError> {
        for (name, column) in other.columns.into_iter().zip(other.values) {
            self.push(name, column)?;
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Array1<f64>> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
    }

    /// Rows × columns matrix
    pub fn to_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.rows, self.width()));
        for (mut column, values) in matrix.columns_mut().into_iter().zip(&self.values) {
            column.assign(values);
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matrix_layout() {
        let mut block = FeatureBlock::new(3);
        block.push("a", array![1.0, 2.0, 3.0]).unwrap();
        block.push("b", array![4.0, 5.0, 6.0]).unwrap();
        let matrix = block.to_matrix();
        assert_eq!(matrix, array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]);
        assert_eq!(block.columns(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_rejects_misaligned_column() {
        let mut block = FeatureBlock::new(3);
        let err = block.push("short", array![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::ColumnLength { expected: 3, actual: 2, .. }
        ));
        assert!(block.is_empty());
    }

    #[test]
    fn test_append() {
        let mut left = FeatureBlock::new(2);
        left.push("a", array![1.0, 2.0]).unwrap();
        let mut right = FeatureBlock::new(2);
        right.push("b", array![3.0, 4.0]).unwrap();
        left.append(right).unwrap();
        assert_eq!(left.width(), 2);
        assert_eq!(left.column("b").unwrap()[1], 4.0);

        let mut other = FeatureBlock::new(5);
        other.push("c", Array1::zeros(5)).unwrap();
        assert!(left.append(other).is_err());
    }

    #[test]
    fn test_empty_block_matrix() {
        let block = FeatureBlock::new(4);
        assert_eq!(block.to_matrix().dim(), (4, 0));
    }
}
