//! Dense row-major matrix
//!
//! The inference stages operate on batches of feature rows. A request always
//! carries exactly one row, but the scaler and classifier are written against
//! a `rows x cols` batch so their contracts mirror how they were fitted.

use crate::pipeline::InferenceError;

/// Row-major `f64` matrix
///
/// # Examples
///
/// ```
/// use croprec::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![
///     1.0, 2.0, 3.0,
///     4.0, 5.0, 6.0,
/// ]).unwrap();
///
/// assert_eq!(m.shape(), (2, 3));
/// assert_eq!(m.iter_rows().nth(1), Some(&[4.0, 5.0, 6.0][..]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Flattened data in row-major order
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Create a matrix from flattened row-major data
    ///
    /// # Errors
    ///
    /// Returns `Err` if either dimension is zero or the data length is not
    /// `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, InferenceError> {
        if rows == 0 || cols == 0 {
            return Err(InferenceError::InvalidShape {
                reason: format!("matrix dimensions cannot be zero, got {rows}x{cols}"),
            });
        }

        let len = rows.checked_mul(cols).ok_or_else(|| InferenceError::InvalidShape {
            reason: format!("{rows}x{cols} matrix is too large"),
        })?;
        if data.len() != len {
            return Err(InferenceError::InvalidShape {
                reason: format!(
                    "{} values cannot fill a {rows}x{cols} matrix",
                    data.len()
                ),
            });
        }

        Ok(Self { data, rows, cols })
    }

    /// Reshape a vector into a single-row matrix (batch size 1)
    ///
    /// # Errors
    ///
    /// Returns `Err` if `values` is empty.
    pub fn row_vector(values: Vec<f64>) -> Result<Self, InferenceError> {
        let cols = values.len();
        Self::from_vec(1, cols, values)
    }

    /// `(rows, cols)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of columns
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Iterate over rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    /// Underlying row-major data
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f(col, value)` to every element, keeping the shape
    #[must_use]
    pub fn map_columns<F>(&self, f: F) -> Self
    where
        F: Fn(usize, f64) -> f64,
    {
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| f(i % self.cols, v))
            .collect();
        Self {
            data,
            rows: self.rows,
            cols: self.cols,
        }
    }
}
