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

use smallmath::Vector;

use crate::serialization::{parse_values, read_dimensions, read_error, read_line, File, Serializable};

impl Serializable for Vector {
    fn read_from_file(file: &mut BufReader<File>) -> Result<Vector> {
        let size = read_dimensions(file, 1, "vector size")?[0];
        let strings = read_line(file)?;

        if strings.len() != size {
            return read_error(file, "Cannot read vector values!");
        }

        Ok(Vector::from_vec(parse_values(file, &strings, "vector value")?))
    }

    fn write_to_file(&self, file: &mut File) -> Result<()> {
        let indentation = file.indentation();
        write!(file, "{0}{1}\n{0}", indentation, self.len())?;
        for value in self.iter() {
            write!(file, "{} ", value)?;
        }
        write!(file, "\n")
    }
}
