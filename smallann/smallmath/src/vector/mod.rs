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

use std::ops::{AddAssign, Deref, DerefMut, MulAssign, SubAssign};

/// A vector.  `Deref`s into `&[f32]`, and can be converted into a `Vec<f32>` via `into()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vector {
    values: Vec<f32>,
}

impl Vector {
    /// Constructs a vector from a `Vec<f32>`.
    pub fn from_vec(values: Vec<f32>) -> Vector {
        Vector {
            values: values,
        }
    }

    pub fn zeros(size: usize) -> Vector {
        Vector::from_vec(vec![0.0; size])
    }

    /// Constructs a vector of `size` copies of `value`.
    pub fn filled(size: usize, value: f32) -> Vector {
        Vector::from_vec(vec![value; size])
    }

    /// Resizes the vector.  Values past the old length are zero.
    pub fn resize(&mut self, size: usize) {
        self.values.resize(size, 0.0);
    }

    /// Clears the vector to all zeros.
    pub fn zero(&mut self) {
        for value in self.values.iter_mut() {
            *value = 0.0;
        }
    }
}

impl Deref for Vector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.values
    }
}

impl DerefMut for Vector {
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }
}

impl From<Vector> for Vec<f32> {
    fn from(vector: Vector) -> Vec<f32> {
        vector.values
    }
}

impl From<Vec<f32>> for Vector {
    fn from(values: Vec<f32>) -> Vector {
        Vector::from_vec(values)
    }
}

impl<'a> AddAssign<&'a [f32]> for Vector {
    /// Performs the element-wise addition of the vector and the slice `rhs`.  The vector and the slice must be the same length.
    fn add_assign(&mut self, rhs: &[f32]) {
        ops::add_assign(self, rhs);
    }
}

impl<'a> SubAssign<&'a [f32]> for Vector {
    fn sub_assign(&mut self, rhs: &[f32]) {
        ops::subtract_assign(self, rhs);
    }
}

impl<'a> MulAssign<&'a Vector> for Vector {
    /// Performs the element-wise multiplication of the vector and `rhs`.
    fn mul_assign(&mut self, rhs: &Vector) {
        ops::multiply_assign(self, rhs);
    }
}

impl MulAssign<f32> for Vector {
    fn mul_assign(&mut self, rhs: f32) {
        ops::scale_assign(self, rhs);
    }
}

pub mod ops;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_zero_fills() {
        let mut vector = Vector::from_vec(vec![1.0, 2.0]);
        vector.resize(4);
        assert_eq!(&vector[..], &[1.0, 2.0, 0.0, 0.0]);

        vector.resize(1);
        assert_eq!(&vector[..], &[1.0]);
    }

    #[test]
    fn test_operators() {
        let mut a = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        a += &[1.0, 1.0, 1.0][..];
        assert_eq!(&a[..], &[2.0, 3.0, 4.0]);

        a *= &Vector::from_vec(vec![0.5, 2.0, 0.0]);
        assert_eq!(&a[..], &[1.0, 6.0, 0.0]);

        a -= &[1.0, 1.0, 1.0][..];
        a *= 2.0;
        assert_eq!(&a[..], &[0.0, 10.0, -2.0]);
    }
}
