//
// This file is part of smallann.
//
// smallann is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// smallann is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with smallann. If not, see <http://www.gnu.org/licenses/>.
//
// Copyright 2017 Chris Foster
//

use std::io::{BufReader, Result, Write};

use smallmath::{FilterShape, Shape};

use crate::serialization::{expect_label, read_dimensions, File};

/// Writes `label` followed by a line of `dimensions`, indented beneath it.
fn write_dimensions(file: &mut File, label: &str, dimensions: &[usize]) -> Result<()> {
    let indentation = file.indentation();
    let dimensions = dimensions.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" ");
    write!(file, "{0}{1}\n{0}    {2}\n", indentation, label, dimensions)
}

fn read_labeled_dimensions(file: &mut BufReader<File>, label: &str, count: usize) -> Result<Vec<usize>> {
    expect_label(file, label)?;
    read_dimensions(file, count, label)
}

fn write_shape(file: &mut File, label: &str, shape: Shape) -> Result<()> {
    write_dimensions(file, label, &[shape.height, shape.width, shape.depth])
}

fn read_shape(file: &mut BufReader<File>, label: &str) -> Result<Shape> {
    let dimensions = read_labeled_dimensions(file, label, 3)?;
    Ok(Shape::new(1, dimensions[0], dimensions[1], dimensions[2]))
}

fn write_filter_shape(file: &mut File, label: &str, shape: FilterShape) -> Result<()> {
    write_dimensions(file, label, &[shape.filters, shape.height, shape.width, shape.depth])
}

fn read_filter_shape(file: &mut BufReader<File>, label: &str) -> Result<FilterShape> {
    let dimensions = read_labeled_dimensions(file, label, 4)?;
    Ok(FilterShape::new(dimensions[0], dimensions[1], dimensions[2], dimensions[3]))
}

mod activation;
mod convolutional;
mod fully_connected;
mod l2_convolution;
mod min_distances_pooling;
