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

//! Batches of feature maps and banks of convolution filters, stored as flat row-major slices.
//!
//! A batch of feature maps is laid out `[batch][height][width][depth]`, so one sample is exactly
//! one row of a [`Matrix`](../matrix/struct.Matrix.html) with `height * width * depth` columns.
//! A filter bank is laid out `[filter][height][width][depth]`.

/// Dimensions of a batch of feature maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    pub batch: usize,
    pub height: usize,
    pub width: usize,
    pub depth: usize,
}

impl Shape {
    pub fn new(batch: usize, height: usize, width: usize, depth: usize) -> Shape {
        Shape {
            batch: batch,
            height: height,
            width: width,
            depth: depth,
        }
    }

    /// Number of values in one sample.
    pub fn sample_len(&self) -> usize {
        self.height * self.width * self.depth
    }

    pub fn len(&self) -> usize {
        self.batch * self.sample_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat offset of `(sample, row, column, channel)`.
    pub fn index(&self, sample: usize, row: usize, column: usize, channel: usize) -> usize {
        ((sample * self.height + row) * self.width + column) * self.depth + channel
    }

    pub fn with_batch(&self, batch: usize) -> Shape {
        Shape::new(batch, self.height, self.width, self.depth)
    }
}

/// Dimensions of a bank of convolution filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterShape {
    pub filters: usize,
    pub height: usize,
    pub width: usize,
    pub depth: usize,
}

impl FilterShape {
    pub fn new(filters: usize, height: usize, width: usize, depth: usize) -> FilterShape {
        FilterShape {
            filters: filters,
            height: height,
            width: width,
            depth: depth,
        }
    }

    /// Number of values in one filter.
    pub fn filter_len(&self) -> usize {
        self.height * self.width * self.depth
    }

    pub fn len(&self) -> usize {
        self.filters * self.filter_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat offset of `(filter, row, column, channel)`.
    pub fn index(&self, filter: usize, row: usize, column: usize, channel: usize) -> usize {
        ((filter * self.height + row) * self.width + column) * self.depth + channel
    }

    /// Whether a valid convolution of `input` against this bank is defined.
    pub fn fits(&self, input: Shape) -> bool {
        self.depth == input.depth && self.height <= input.height && self.width <= input.width
    }

    /// Shape of a valid, stride 1 convolution of `input` against this bank.
    ///
    /// # Panics
    /// Panics in debug builds if the bank doesn't [`fit`](#method.fits) the input.
    pub fn output_shape(&self, input: Shape) -> Shape {
        debug_assert!(self.fits(input), "Filters don't fit the input shape!");

        Shape::new(
            input.batch,
            input.height - self.height + 1,
            input.width - self.width + 1,
            self.filters,
        )
    }
}

pub mod ops;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_row_major() {
        let shape = Shape::new(2, 3, 4, 5);
        assert_eq!(shape.index(0, 0, 0, 1), 1);
        assert_eq!(shape.index(0, 0, 1, 0), 5);
        assert_eq!(shape.index(0, 1, 0, 0), 20);
        assert_eq!(shape.index(1, 0, 0, 0), 60);
        assert_eq!(shape.index(1, 2, 3, 4), shape.len() - 1);
    }

    #[test]
    fn test_output_shape() {
        let filters = FilterShape::new(10, 2, 3, 4);
        let input = Shape::new(8, 7, 7, 4);

        assert!(filters.fits(input));
        assert_eq!(filters.output_shape(input), Shape::new(8, 6, 5, 10));

        assert!(!filters.fits(Shape::new(8, 7, 7, 3)));
        assert!(!filters.fits(Shape::new(8, 1, 7, 4)));
    }
}
