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

use smallmath::vector::{self, Vector};

use crate::gradient_descent::GradientDescent;
use crate::serialization::{parse_values, read_error, read_line, File, Serializable};

const EPSILON: f32 = 1e-8;

#[derive(Clone, Debug)]
pub struct AdadeltaGradientDescent {
    decay: f32,
    regularization: f32,

    eg2: Vector,
    edx2: Vector,

    temp: Vector,
    temp2: Vector,
}

impl AdadeltaGradientDescent {
    /// `regularization` bounds a weight decay term added to every step; zero disables it.
    pub fn new(decay: f32, regularization: f32) -> AdadeltaGradientDescent {
        debug_assert!(decay > 0.0 && decay < 1.0, "Decay must be in (0, 1)!");
        debug_assert!(regularization >= 0.0, "Regularization can't be negative!");

        AdadeltaGradientDescent {
            decay: decay,
            regularization: regularization,
            eg2: Vector::zeros(0),
            edx2: Vector::zeros(0),
            temp: Vector::zeros(0),
            temp2: Vector::zeros(0),
        }
    }
}

impl GradientDescent for AdadeltaGradientDescent {
    fn descend(&mut self, parameters: &mut [f32], gradients: &[f32], rate: f32) {
        debug_assert!(parameters.len() == gradients.len(), "Parameter and gradient lengths differ!");
        for buffer in [&mut self.eg2, &mut self.edx2, &mut self.temp, &mut self.temp2] {
            buffer.resize(parameters.len());
        }

        // eg2 = eg2 * decay + gradients ^ 2 * (1.0 - decay)
        vector::ops::square(gradients, &mut self.temp);
        vector::ops::scale_assign(&mut self.temp, 1.0 - self.decay);
        vector::ops::scale_assign(&mut self.eg2, self.decay);
        vector::ops::add_assign(&mut self.eg2, &self.temp);

        // dx = gradients .* (edx2 + epsilon).sqrt() / (eg2 + epsilon).sqrt() + clamp(parameters, -regularization, regularization)
        vector::ops::offset(&self.edx2, EPSILON, &mut self.temp);
        vector::ops::sqrt_assign(&mut self.temp);
        vector::ops::multiply_assign(&mut self.temp, gradients);
        vector::ops::offset(&self.eg2, EPSILON, &mut self.temp2);
        vector::ops::sqrt_assign(&mut self.temp2);
        vector::ops::divide_assign(&mut self.temp, &self.temp2);
        for (dx, parameter) in self.temp.iter_mut().zip(parameters.iter()) {
            *dx += parameter.max(-self.regularization).min(self.regularization);
        }

        // parameters -= dx * rate
        vector::ops::scale(&self.temp, rate, &mut self.temp2);
        vector::ops::subtract_assign(parameters, &self.temp2);

        // edx2 = edx2 * decay + dx ^ 2 * (1.0 - decay)
        vector::ops::square_assign(&mut self.temp);
        vector::ops::scale_assign(&mut self.temp, 1.0 - self.decay);
        vector::ops::scale_assign(&mut self.edx2, self.decay);
        vector::ops::add_assign(&mut self.edx2, &self.temp);
    }
}

impl Serializable for AdadeltaGradientDescent {
    fn read_from_file(file: &mut BufReader<File>) -> Result<AdadeltaGradientDescent> {
        let strings = read_line(file)?;

        if strings.len() < 2 {
            return read_error(file, "Cannot read decay/regularization!");
        }

        let values = parse_values::<f32>(file, &strings[..2], "decay/regularization")?;

        let strings = read_line(file)?;

        if strings.len() < 1 || strings[0] != "E[g^2]" {
            return read_error(file, "Cannot read E[g^2]!");
        }

        let eg2 = Vector::read_from_file(file)?;

        let strings = read_line(file)?;

        if strings.len() < 1 || strings[0] != "E[dx^2]" {
            return read_error(file, "Cannot read E[dx^2]!");
        }

        let edx2 = Vector::read_from_file(file)?;

        if edx2.len() != eg2.len() {
            return read_error(file, "E[dx^2] doesn't match E[g^2] length!");
        }

        Ok(AdadeltaGradientDescent {
            decay: values[0],
            regularization: values[1],
            temp: Vector::zeros(eg2.len()),
            temp2: Vector::zeros(eg2.len()),
            eg2: eg2,
            edx2: edx2,
        })
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        let indentation = file.indentation();
        write!(file, "{}{} {}\n", indentation, self.decay, self.regularization)?;
        write!(file, "{}E[g^2]\n", indentation)?;
        self.eg2.write_to_file(file)?;
        write!(file, "{}E[dx^2]\n", indentation)?;
        self.edx2.write_to_file(file)
    }
}
