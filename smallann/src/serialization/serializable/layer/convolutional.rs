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

use smallmath::{Matrix, Vector};

use crate::gradient_descent::GradientDescent;
use crate::layer::{check_filters, ConvolutionalLayer};
use crate::serialization::{expect_label, read_error, File, Serializable};

use super::{read_filter_shape, read_shape, write_filter_shape, write_shape};

impl<G> Serializable for ConvolutionalLayer<G> where G: GradientDescent + Serializable {
    fn read_from_file(file: &mut BufReader<File>) -> Result<ConvolutionalLayer<G>> {
        let input_shape = read_shape(file, "InputShape")?;
        let filter_shape = read_filter_shape(file, "FilterShape")?;

        if let Err(error) = check_filters("ConvolutionalLayer", input_shape, filter_shape) {
            return read_error(file, &error.to_string());
        }

        expect_label(file, "Filters")?;
        let filters = Matrix::read_from_file(file)?;

        if filters.rows() != filter_shape.filters || filters.columns() != filter_shape.filter_len() {
            return read_error(file, "Filters don't match the filter shape!");
        }

        expect_label(file, "Biases")?;
        let biases = Vector::read_from_file(file)?;

        if biases.len() != filter_shape.filters {
            return read_error(file, "Biases don't match the filter count!");
        }

        expect_label(file, &G::identifier())?;
        let filters_descent = G::read_from_file(file)?;
        expect_label(file, &G::identifier())?;
        let biases_descent = G::read_from_file(file)?;

        Ok(ConvolutionalLayer::construct(input_shape, filter_shape, filters, biases, filters_descent, biases_descent))
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        let indentation = file.indentation();
        write_shape(file, "InputShape", self.input_shape)?;
        write_filter_shape(file, "FilterShape", self.filter_shape)?;
        write!(file, "{}Filters\n", indentation)?;
        file.indent();
        self.filters.write_to_file(file)?;
        file.unindent();
        write!(file, "{}Biases\n", indentation)?;
        file.indent();
        self.biases.write_to_file(file)?;
        file.unindent();
        for gradient_descent in [&self.filters_descent, &self.biases_descent] {
            write!(file, "{}{}\n", indentation, G::identifier())?;
            file.indent();
            gradient_descent.write_to_file(file)?;
            file.unindent();
        }
        Ok(())
    }
}
