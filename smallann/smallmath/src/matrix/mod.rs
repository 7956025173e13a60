//
// This file is part of smallmath.
//
// smallmath is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// smallmath is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with smallmath. If not, see <http://www.gnu.org/licenses/>.
//
// Copyright 2017 Chris Foster
//

use std::ops::{Deref, DerefMut, Index, IndexMut};

use crate::vector::Vector;

/// A row-major matrix.  `Deref`s into a [`&Vector`](../vector/struct.Vector.html), and can be converted into a `Vec<f32>` via `into()`.
///
/// Networks treat each row as one sample of a batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    values: Vector,
}

impl Matrix {
    /// Constructs a matrix from a `Vec<f32>`.
    ///
    /// # Panics
    /// Panics if the length of `values` isn't equal to `rows` times `columns`.
    pub fn from_vec(rows: usize, columns: usize, values: Vec<f32>) -> Matrix {
        assert!(values.len() == rows * columns, "Incorrect number of values for matrix!");

        Matrix {
            rows: rows,
            columns: columns,
            values: Vector::from_vec(values),
        }
    }

    pub fn zeros(rows: usize, columns: usize) -> Matrix {
        Matrix::from_vec(rows, columns, vec![0.0; rows * columns])
    }

    /// Constructs a matrix with every value set to `value`.
    pub fn filled(rows: usize, columns: usize, value: f32) -> Matrix {
        Matrix::from_vec(rows, columns, vec![value; rows * columns])
    }

    /// Constructs an identity matrix of the specified size.
    pub fn identity(size: usize) -> Matrix {
        let mut matrix = Matrix::zeros(size, size);
        for i in 0..size {
            matrix[(i, i)] = 1.0;
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Borrows the matrix as a vector of length `self.rows()` * `self.columns()`.
    pub fn as_vector(&self) -> &Vector {
        &self.values
    }

    /// Mutably borrows the matrix as a vector of length `self.rows()` * `self.columns()`.
    pub fn as_vector_mut(&mut self) -> &mut Vector {
        &mut self.values
    }

    /// Resizes the matrix.  This method resizes the matrix's internal buffer and does no reinterpretation of the data; values will no longer be at the same indices.
    pub fn resize(&mut self, rows: usize, columns: usize) {
        self.rows = rows;
        self.columns = columns;

        self.values.resize(rows * columns);
    }

    /// Returns the transpose of the matrix.  This will allocate and return a new matrix.  To avoid an additional allocation, use [`matrix::ops::transpose`](ops/fn.transpose.html).
    pub fn transpose(&self) -> Matrix {
        let mut transposed = Matrix::zeros(self.columns, self.rows);
        ops::transpose(self, &mut transposed);
        transposed
    }
}

impl Deref for Matrix {
    type Target = Vector;

    fn deref(&self) -> &Vector {
        &self.values
    }
}

impl DerefMut for Matrix {
    fn deref_mut(&mut self) -> &mut Vector {
        &mut self.values
    }
}

impl From<Matrix> for Vec<f32> {
    fn from(matrix: Matrix) -> Vec<f32> {
        matrix.values.into()
    }
}

impl Index<usize> for Matrix {
    type Output = [f32];

    /// Returns the specified row of the matrix.
    fn index(&self, index: usize) -> &[f32] {
        &self.values[index * self.columns..(index + 1) * self.columns]
    }
}

impl IndexMut<usize> for Matrix {
    /// Returns the specified row of the matrix.
    fn index_mut(&mut self, index: usize) -> &mut [f32] {
        let columns = self.columns;
        &mut self.values[index * columns..(index + 1) * columns]
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    /// Returns the value at (row, column).
    fn index(&self, index: (usize, usize)) -> &f32 {
        debug_assert!(index.1 < self.columns, "Column out of bounds!");
        &self.values[index.0 * self.columns + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f32 {
        debug_assert!(index.1 < self.columns, "Column out of bounds!");
        let columns = self.columns;
        &mut self.values[index.0 * columns + index.1]
    }
}

pub mod ops;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing() {
        let mut matrix = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(&matrix[1], &[4.0, 5.0, 6.0]);
        assert_eq!(matrix[(0, 2)], 3.0);

        matrix[(1, 0)] = -1.0;
        matrix[0].clone_from_slice(&[7.0, 8.0, 9.0]);
        assert_eq!(Vec::from(matrix), vec![7.0, 8.0, 9.0, -1.0, 5.0, 6.0]);
    }

    #[test]
    fn test_transpose() {
        let matrix = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let transposed = matrix.transpose();
        assert_eq!(transposed.rows(), 3);
        assert_eq!(transposed.columns(), 2);
        assert_eq!(&transposed.as_vector()[..], &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "Incorrect number of values for matrix!")]
    fn test_from_vec_wrong_length() {
        Matrix::from_vec(2, 2, vec![1.0; 3]);
    }
}
