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

use smallmath::Matrix;

use crate::gradient_descent::GradientDescent;
use crate::layer::{check_filters, L2ConvolutionLayer};
use crate::serialization::{expect_label, read_error, File, Serializable};

use super::{read_filter_shape, read_shape, write_filter_shape, write_shape};

impl<G> Serializable for L2ConvolutionLayer<G> where G: GradientDescent + Serializable {
    fn read_from_file(file: &mut BufReader<File>) -> Result<L2ConvolutionLayer<G>> {
        let input_shape = read_shape(file, "InputShape")?;
        let prototype_shape = read_filter_shape(file, "PrototypeShape")?;

        if let Err(error) = check_filters("L2ConvolutionLayer", input_shape, prototype_shape) {
            return read_error(file, &error.to_string());
        }

        expect_label(file, "Prototypes")?;
        let prototypes = Matrix::read_from_file(file)?;

        if prototypes.rows() != prototype_shape.filters || prototypes.columns() != prototype_shape.filter_len() {
            return read_error(file, "Prototypes don't match the prototype shape!");
        }

        expect_label(file, "Ones")?;
        let ones = Matrix::read_from_file(file)?;

        if ones.rows() != 1 || ones.columns() != prototype_shape.filter_len() {
            return read_error(file, "Ones kernel doesn't match the prototype shape!");
        }
        if ones.iter().any(|&value| value != 1.0) {
            return read_error(file, "Ones kernel holds a value other than 1!");
        }

        expect_label(file, &G::identifier())?;
        let gradient_descent = G::read_from_file(file)?;

        Ok(L2ConvolutionLayer::construct(input_shape, prototype_shape, prototypes, ones, gradient_descent))
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        let indentation = file.indentation();
        write_shape(file, "InputShape", self.input_shape)?;
        write_filter_shape(file, "PrototypeShape", self.prototype_shape)?;
        write!(file, "{}Prototypes\n", indentation)?;
        file.indent();
        self.prototypes.write_to_file(file)?;
        file.unindent();
        write!(file, "{}Ones\n", indentation)?;
        file.indent();
        self.ones.write_to_file(file)?;
        file.unindent();
        write!(file, "{}{}\n", indentation, G::identifier())?;
        file.indent();
        self.gradient_descent.write_to_file(file)?;
        file.unindent();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::gradient_descent::{AdadeltaGradientDescent, SimpleGradientDescent};
    use crate::layer::{L2ConvolutionLayer, Layer};
    use crate::serialization::tests::round_trip;
    use crate::{FilterShape, Matrix, Shape};

    #[test]
    fn test_prototype_bank_round_trips_bit_for_bit() {
        let prototype_shape = FilterShape::new(20, 1, 1, 16);
        let mut layer = L2ConvolutionLayer::new(3, 3, 16, prototype_shape, AdadeltaGradientDescent::new(0.95, 0.0), &mut StdRng::seed_from_u64(9)).unwrap();

        // One step so the descent state isn't trivially zero.
        let inputs = Matrix::filled(1, 144, 0.25);
        let mut previous_gradients = Matrix::zeros(1, 144);
        layer.propagate_backward(&Matrix::filled(1, layer.outputs(), 0.01), &inputs, &mut previous_gradients, 1.0);

        let read = round_trip(&layer, "l2_convolution").unwrap();

        assert_eq!(read.prototype_shape(), prototype_shape);
        assert_eq!(read.output_shape(), vec![3, 3, 20]);
        for (a, b) in layer.prototypes().iter().zip(read.prototypes().iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert_eq!(read.ones(), layer.ones());

        let mut expected = Matrix::zeros(1, layer.outputs());
        let mut actual = Matrix::zeros(1, layer.outputs());
        layer.feed_forward(&inputs, &mut expected);
        read.feed_forward(&inputs, &mut actual);
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_scaled_ones_kernel_is_rejected() {
        let prototype_shape = FilterShape::new(2, 1, 1, 2);
        let layer = L2ConvolutionLayer::construct(
            Shape::new(1, 2, 2, 2),
            prototype_shape,
            Matrix::zeros(2, 2),
            Matrix::from_vec(1, 2, vec![1.0, 2.0]),
            SimpleGradientDescent::new(),
        );

        let error = round_trip(&layer, "scaled_ones").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidData);
        assert!(error.to_string().contains("Ones kernel"), "{}", error);
    }
}
