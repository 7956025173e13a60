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

use crate::serialization::{parse_values, read_dimensions, read_error, read_line, File, Serializable};

/// Writes `matrix` with `precision` decimal places, or exactly when `precision` is `None`.
pub fn write_matrix(file: &mut File, matrix: &Matrix, precision: Option<usize>) -> Result<()> {
    let (rows, columns) = (matrix.rows(), matrix.columns());
    let indentation = file.indentation();
    write!(file, "{}{} {}\n", indentation, rows, columns)?;
    for row in 0..rows {
        write!(file, "{}", indentation)?;
        for value in &matrix[row] {
            match precision {
                Some(precision) => write!(file, "{:.precision$} ", value, precision = precision)?,
                None => write!(file, "{} ", value)?,
            }
        }
        write!(file, "\n")?;
    }
    Ok(())
}

impl Serializable for Matrix {
    fn read_from_file(file: &mut BufReader<File>) -> Result<Matrix> {
        let dimensions = read_dimensions(file, 2, "matrix dimensions")?;
        let (rows, columns) = (dimensions[0], dimensions[1]);

        let mut values = Vec::with_capacity(rows * columns);
        for _ in 0..rows {
            let strings = read_line(file)?;

            if strings.len() != columns {
                return read_error(file, "Cannot read matrix row!");
            }

            values.extend(parse_values::<f32>(file, &strings, "matrix value")?);
        }

        Ok(Matrix::from_vec(rows, columns, values))
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        write_matrix(file, self, None)
    }
}
