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

#[derive(Clone, Debug)]
pub struct MomentumGradientDescent {
    pub(crate) momentum: f32,
    pub(crate) velocity: Vector,

    temp: Vector,
}

impl MomentumGradientDescent {
    pub fn new(momentum: f32) -> MomentumGradientDescent {
        debug_assert!((0.0..1.0).contains(&momentum), "Momentum must be in [0, 1)!");

        MomentumGradientDescent {
            momentum: momentum,
            velocity: Vector::zeros(0),
            temp: Vector::zeros(0),
        }
    }
}

impl GradientDescent for MomentumGradientDescent {
    fn descend(&mut self, parameters: &mut [f32], gradients: &[f32], rate: f32) {
        debug_assert!(parameters.len() == gradients.len(), "Parameter and gradient lengths differ!");
        self.velocity.resize(parameters.len());
        self.temp.resize(parameters.len());

        // velocity = momentum * velocity + rate * gradients
        vector::ops::scale_assign(&mut self.velocity, self.momentum);
        vector::ops::scale(gradients, rate, &mut self.temp);
        vector::ops::add_assign(&mut self.velocity, &self.temp);

        // parameters -= velocity
        vector::ops::subtract_assign(parameters, &self.velocity);
    }
}

impl Serializable for MomentumGradientDescent {
    fn read_from_file(file: &mut BufReader<File>) -> Result<MomentumGradientDescent> {
        let strings = read_line(file)?;

        if strings.len() < 1 {
            return read_error(file, "Cannot read momentum!");
        }

        let momentum = parse_values::<f32>(file, &strings[..1], "momentum")?[0];
        let velocity = Vector::read_from_file(file)?;

        Ok(MomentumGradientDescent {
            momentum: momentum,
            temp: Vector::zeros(velocity.len()),
            velocity: velocity,
        })
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        let indentation = file.indentation();
        write!(file, "{}{}\n", indentation, self.momentum)?;
        self.velocity.write_to_file(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momentum_accumulates() {
        let mut descent = MomentumGradientDescent::new(0.5);
        let mut parameters = vec![0.0, 0.0];

        descent.descend(&mut parameters, &[1.0, -1.0], 1.0);
        assert_eq!(parameters, vec![-1.0, 1.0]);

        // velocity = 0.5 * 1 + 1
        descent.descend(&mut parameters, &[1.0, -1.0], 1.0);
        assert_eq!(parameters, vec![-2.5, 2.5]);
    }

    #[test]
    fn test_clones_keep_separate_state() {
        let template = MomentumGradientDescent::new(0.9);
        let mut a = template.clone();
        let mut b = template.clone();

        let mut long = vec![0.0; 4];
        let mut short = vec![0.0; 2];
        a.descend(&mut long, &[1.0; 4], 0.1);
        b.descend(&mut short, &[1.0; 2], 0.1);

        assert_eq!(a.velocity.len(), 4);
        assert_eq!(b.velocity.len(), 2);
        assert!(template.velocity.is_empty());
    }
}
