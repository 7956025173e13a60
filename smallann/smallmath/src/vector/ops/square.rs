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

pub fn square(a: &[f32], b: &mut [f32]) {
    debug_assert!(a.len() == b.len(), "Operand and destination vectors are different lengths!");

    for (b, a) in b.iter_mut().zip(a) {
        *b = a * a;
    }
}

pub fn square_assign(a: &mut [f32]) {
    for a in a.iter_mut() {
        *a *= *a;
    }
}

pub fn sqrt(a: &[f32], b: &mut [f32]) {
    debug_assert!(a.len() == b.len(), "Operand and destination vectors are different lengths!");

    for (b, a) in b.iter_mut().zip(a) {
        *b = a.sqrt();
    }
}

pub fn sqrt_assign(a: &mut [f32]) {
    for a in a.iter_mut() {
        *a = a.sqrt();
    }
}
