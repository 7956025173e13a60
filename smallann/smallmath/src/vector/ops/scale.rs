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

pub fn scale(a: &[f32], b: f32, c: &mut [f32]) {
    debug_assert!(a.len() == c.len(), "Operand and destination vectors are different lengths!");

    for (c, a) in c.iter_mut().zip(a) {
        *c = a * b;
    }
}

pub fn scale_assign(a: &mut [f32], b: f32) {
    for a in a.iter_mut() {
        *a *= b;
    }
}

pub fn offset(a: &[f32], b: f32, c: &mut [f32]) {
    debug_assert!(a.len() == c.len(), "Operand and destination vectors are different lengths!");

    for (c, a) in c.iter_mut().zip(a) {
        *c = a + b;
    }
}

pub fn offset_assign(a: &mut [f32], b: f32) {
    for a in a.iter_mut() {
        *a += b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_offset() {
        let a = [1.0, -2.0, 0.5];
        let mut b = [0.0; 3];

        scale(&a, -2.0, &mut b);
        assert_eq!(b, [-2.0, 4.0, -1.0]);

        offset_assign(&mut b, 1.0);
        assert_eq!(b, [-1.0, 5.0, 0.0]);
    }
}
