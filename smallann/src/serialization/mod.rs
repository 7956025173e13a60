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

//! Plain text persistence for networks and their parameters.
//!
//! Every value writes itself as indented lines through a [`File`](struct.File.html), and reads itself back
//! from a `BufReader<File>` that tracks the current line for error messages.  Floats are written with Rust's
//! shortest round trip formatting, so a value read back is bit for bit the value written.

use std::io::{BufRead, BufReader, Error, ErrorKind, Result};
use std::str::FromStr;

use smallmath::{Matrix, Vector};

use crate::activation_function::*;
use crate::gradient_descent::*;
use crate::layer::*;

pub use self::file::File;
pub use self::identifiable::Identifiable;
pub use self::registry::{LayerReader, LayerRegistry};
pub use self::serializable::{write_matrix, Serializable};

#[macro_use]
mod identifiable;
mod file;
mod registry;
mod serializable;

identifiable!(
    Matrix,
    Vector,
    LogSimilarityActivationFunction,
    ReLuActivationFunction,
    SigmoidActivationFunction,
    AdadeltaGradientDescent,
    MomentumGradientDescent,
    SimpleGradientDescent,
    ActivationLayer<F>,
    ConvolutionalLayer<G>,
    FullyConnectedLayer<G>,
    L2ConvolutionLayer<G>,
    MinDistancesPoolingLayer,
);

pub fn read_error<T>(file: &BufReader<File>, message: &str) -> Result<T> {
    Err(Error::new(ErrorKind::InvalidData, format!("Line {}: {}", file.get_ref().line, message)))
}

/// Reads the next line, split on whitespace.  An exhausted file yields an empty line.
pub fn read_line(file: &mut BufReader<File>) -> Result<Vec<String>> {
    let mut line = String::new();
    file.read_line(&mut line)?;
    file.get_mut().line += 1;
    Ok(line.split_whitespace().map(|s| s.to_string()).collect::<Vec<String>>())
}

/// Parses every string, naming `what` in the error of the first that fails.
pub fn parse_values<T>(file: &BufReader<File>, strings: &[String], what: &str) -> Result<Vec<T>> where T: FromStr {
    let mut values = Vec::with_capacity(strings.len());
    for string in strings {
        if let Ok(value) = T::from_str(string) {
            values.push(value);
        } else {
            return read_error(file, &format!("Cannot parse {}!", what));
        }
    }
    Ok(values)
}

/// Reads a line of exactly `count` dimensions.
pub fn read_dimensions(file: &mut BufReader<File>, count: usize, what: &str) -> Result<Vec<usize>> {
    let strings = read_line(file)?;

    if strings.len() != count {
        return read_error(file, &format!("Cannot read {}!", what));
    }

    parse_values(file, &strings, what)
}

/// Reads a line holding exactly `label`.
pub fn expect_label(file: &mut BufReader<File>, label: &str) -> Result<()> {
    let strings = read_line(file)?;

    if strings.len() != 1 || strings[0] != label {
        return read_error(file, &format!("Cannot read {}!", label));
    }

    Ok(())
}
