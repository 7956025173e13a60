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

use std::io::{BufReader, Result};

use crate::activation_function::ActivationFunction;
use crate::layer::ActivationLayer;
use crate::serialization::{parse_values, read_error, read_line, File, Identifiable, Serializable};

use super::write_dimensions;

impl<F> Serializable for ActivationLayer<F> where F: ActivationFunction + Identifiable {
    fn read_from_file(file: &mut BufReader<File>) -> Result<ActivationLayer<F>> {
        let strings = read_line(file)?;

        if strings.len() != 1 || strings[0] != "Shape" {
            return read_error(file, "Cannot read layer shape!");
        }

        let strings = read_line(file)?;
        let shape = parse_values::<usize>(file, &strings, "layer shape")?;

        match ActivationLayer::with_shape(&shape) {
            Ok(layer) => Ok(layer),
            Err(error) => read_error(file, &error.to_string()),
        }
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        write_dimensions(file, "Shape", &self.shape)
    }
}
