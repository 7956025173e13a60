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

use smallmath::vector::{self, Vector};

use crate::gradient_descent::GradientDescent;
use crate::serialization::{File, Serializable};

#[derive(Clone, Debug, Default)]
pub struct SimpleGradientDescent {
    buffer: Vector,
}

impl SimpleGradientDescent {
    pub fn new() -> SimpleGradientDescent {
        SimpleGradientDescent {
            buffer: Vector::zeros(0),
        }
    }
}

impl GradientDescent for SimpleGradientDescent {
    fn descend(&mut self, parameters: &mut [f32], gradients: &[f32], rate: f32) {
        debug_assert!(parameters.len() == gradients.len(), "Parameter and gradient lengths differ!");
        self.buffer.resize(parameters.len());

        // parameters -= gradients * rate
        vector::ops::scale(gradients, rate, &mut self.buffer);
        vector::ops::subtract_assign(parameters, &self.buffer);
    }
}

impl Serializable for SimpleGradientDescent {
    fn read_from_file(_: &mut BufReader<File>) -> Result<SimpleGradientDescent> {
        Ok(SimpleGradientDescent::new())
    }

    fn write_to_file(&self, _: &mut File) -> Result<()> {
        Ok(())
    }
}
