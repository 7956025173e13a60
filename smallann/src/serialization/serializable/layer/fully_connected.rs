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
use crate::layer::FullyConnectedLayer;
use crate::serialization::{expect_label, read_error, File, Serializable};

impl<G> Serializable for FullyConnectedLayer<G> where G: GradientDescent + Serializable {
    fn read_from_file(file: &mut BufReader<File>) -> Result<FullyConnectedLayer<G>> {
        expect_label(file, "Weights")?;
        let weights = Matrix::read_from_file(file)?;

        expect_label(file, "Biases")?;
        let biases = Vector::read_from_file(file)?;

        if biases.len() != weights.columns() {
            return read_error(file, "Biases don't match layer outputs!");
        }

        expect_label(file, &G::identifier())?;
        let weights_descent = G::read_from_file(file)?;
        expect_label(file, &G::identifier())?;
        let biases_descent = G::read_from_file(file)?;

        Ok(FullyConnectedLayer::construct(weights, biases, weights_descent, biases_descent))
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        let indentation = file.indentation();
        write!(file, "{}Weights\n", indentation)?;
        file.indent();
        self.weights.write_to_file(file)?;
        file.unindent();
        write!(file, "{}Biases\n", indentation)?;
        file.indent();
        self.biases.write_to_file(file)?;
        file.unindent();
        for gradient_descent in [&self.weights_descent, &self.biases_descent] {
            write!(file, "{}{}\n", indentation, G::identifier())?;
            file.indent();
            gradient_descent.write_to_file(file)?;
            file.unindent();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::gradient_descent::MomentumGradientDescent;
    use crate::layer::{FullyConnectedLayer, Layer};
    use crate::serialization::tests::round_trip;
    use crate::Matrix;

    #[test]
    fn test_round_trip_keeps_weights_and_descent_state() {
        let mut layer = FullyConnectedLayer::new(3, 2, MomentumGradientDescent::new(0.9), &mut StdRng::seed_from_u64(5)).unwrap();
        let inputs = Matrix::from_vec(1, 3, vec![1.0, -1.0, 0.5]);
        let mut previous_gradients = Matrix::zeros(1, 3);
        layer.propagate_backward(&Matrix::from_vec(1, 2, vec![0.3, -0.7]), &inputs, &mut previous_gradients, 0.1);

        let read = round_trip(&layer, "fully_connected").unwrap();

        assert_eq!(read.weights(), layer.weights());
        assert_eq!(read.biases(), layer.biases());
        assert_eq!(read.weights_descent.velocity, layer.weights_descent.velocity);
        assert_eq!(read.biases_descent.velocity, layer.biases_descent.velocity);
    }
}
