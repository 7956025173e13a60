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

use crate::matrix::Matrix;

/// `c += a * b`.  Callers that want a plain product zero `c` first; layers seed it with their biases.
#[cfg(feature = "with_blas")]
pub fn multiply(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    debug_assert!(a.columns() == b.rows(), "Invalid matrix dimensions for multiplication!");
    debug_assert!(a.rows() == c.rows() && b.columns() == c.columns(), "Invalid destination matrix dimensions for multiplication!");

    if a.rows() == 0 || b.columns() == 0 || a.columns() == 0 {
        return;
    }

    let (m, k, n) = (a.rows() as i32, b.rows() as i32, b.columns() as i32);
    unsafe { cblas::sgemm(
        cblas::Layout::RowMajor, cblas::Transpose::None, cblas::Transpose::None,
        m, n, k,
        1.0, &a.as_vector()[..], k,
        &b.as_vector()[..], n,
        1.0, &mut c.as_vector_mut()[..], n,
    ) };
}

/// `c += a * b`.  Callers that want a plain product zero `c` first; layers seed it with their biases.
#[cfg(not(feature = "with_blas"))]
pub fn multiply(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    debug_assert!(a.columns() == b.rows(), "Invalid matrix dimensions for multiplication!");
    debug_assert!(a.rows() == c.rows() && b.columns() == c.columns(), "Invalid destination matrix dimensions for multiplication!");

    for row in 0..a.rows() {
        for k in 0..a.columns() {
            let a_value = a[(row, k)];
            for (c, b) in c[row].iter_mut().zip(&b[k]) {
                *c += a_value * b;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_accumulates() {
        let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = Matrix::from_vec(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let mut c = Matrix::from_vec(2, 2, vec![1.0, 1.0, 1.0, 1.0]);

        multiply(&a, &b, &mut c);

        assert_eq!(&c.as_vector()[..], &[59.0, 65.0, 140.0, 155.0]);
    }

    #[test]
    fn test_multiply_identity() {
        let a = Matrix::from_vec(2, 2, vec![1.5, -2.0, 0.25, 4.0]);
        let mut c = Matrix::zeros(2, 2);

        multiply(&a, &Matrix::identity(2), &mut c);

        assert_eq!(c, a);
    }

    #[test]
    fn test_multiply_matches_direct_sum() {
        let (m, k, n) = (5, 7, 3);
        let a = Matrix::from_vec(m, k, (0..m * k).map(|i| (i as f32 * 0.37).sin()).collect());
        let b = Matrix::from_vec(k, n, (0..k * n).map(|i| (i as f32 * 0.91).cos()).collect());
        let mut c = Matrix::filled(m, n, 0.5);

        multiply(&a, &b, &mut c);

        for row in 0..m {
            for column in 0..n {
                let expected = 0.5 + (0..k).map(|i| a[(row, i)] * b[(i, column)]).sum::<f32>();
                assert!((c[(row, column)] - expected).abs() < 1e-5, "{} {}: {} != {}", row, column, c[(row, column)], expected);
            }
        }
    }

    #[test]
    fn test_multiply_empty_inner_dimension() {
        let mut c = Matrix::filled(2, 2, 3.0);

        multiply(&Matrix::zeros(2, 0), &Matrix::zeros(0, 2), &mut c);

        assert_eq!(c, Matrix::filled(2, 2, 3.0));
    }
}
