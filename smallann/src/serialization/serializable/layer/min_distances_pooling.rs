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

use crate::layer::MinDistancesPoolingLayer;
use crate::serialization::{read_error, File, Serializable};

use super::{read_shape, write_shape};

impl Serializable for MinDistancesPoolingLayer {
    fn read_from_file(file: &mut BufReader<File>) -> Result<MinDistancesPoolingLayer> {
        let shape = read_shape(file, "InputShape")?;

        match MinDistancesPoolingLayer::new(shape.height, shape.width, shape.depth) {
            Ok(layer) => Ok(layer),
            Err(error) => read_error(file, &error.to_string()),
        }
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        write_shape(file, "InputShape", self.input_shape)
    }
}
