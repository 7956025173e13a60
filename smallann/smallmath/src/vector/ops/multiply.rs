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

pub fn multiply(a: &[f32], b: &[f32], c: &mut [f32]) {
    debug_assert!(a.len() == b.len(), "Operand vectors are different lengths!");
    debug_assert!(a.len() == c.len(), "Operand and destination vectors are different lengths!");

    for ((c, a), b) in c.iter_mut().zip(a).zip(b) {
        *c = a * b;
    }
}

pub fn multiply_assign(a: &mut [f32], b: &[f32]) {
    debug_assert!(a.len() == b.len(), "Operand vectors are different lengths!");

    for (a, b) in a.iter_mut().zip(b) {
        *a *= b;
    }
}

pub fn divide(a: &[f32], b: &[f32], c: &mut [f32]) {
    debug_assert!(a.len() == b.len(), "Operand vectors are different lengths!");
    debug_assert!(a.len() == c.len(), "Operand and destination vectors are different lengths!");

    for ((c, a), b) in c.iter_mut().zip(a).zip(b) {
        *c = a / b;
    }
}

pub fn divide_assign(a: &mut [f32], b: &[f32]) {
    debug_assert!(a.len() == b.len(), "Operand vectors are different lengths!");

    for (a, b) in a.iter_mut().zip(b) {
        *a /= b;
    }
}
