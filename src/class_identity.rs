//
// This file is part of protopnet.
//
// protopnet is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// protopnet is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with protopnet. If not, see <http://www.gnu.org/licenses/>.
//
// Copyright 2017 Chris Foster
//

use smallann::Matrix;

use crate::error::{Error, Result};

/// One-hot assignment of prototypes to classes, `num_prototypes x num_classes`.
///
/// Prototype `j` belongs to class `j / (num_prototypes / num_classes)`.  Prototypes left over after every class
/// has its share belong to no class and have a row of zeros.
pub fn prototype_class_identity(num_prototypes: usize, num_classes: usize) -> Result<Matrix> {
    if num_classes == 0 {
        return Err(Error::config("num_classes", "must be positive"));
    }
    if num_prototypes < num_classes {
        return Err(Error::config(
            "num_classes",
            format!("{} classes cannot each have a prototype out of {}", num_classes, num_prototypes),
        ));
    }

    let per_class = num_prototypes / num_classes;
    let mut identity = Matrix::zeros(num_prototypes, num_classes);
    for j in 0..per_class * num_classes {
        identity[(j, j / per_class)] = 1.0;
    }

    Ok(identity)
}

/// Class of each prototype, or `None` for leftovers.
pub fn prototype_classes(identity: &Matrix) -> Vec<Option<usize>> {
    (0..identity.rows()).map(|j| identity[j].iter().position(|&v| v == 1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let identity = prototype_class_identity(200, 20).unwrap();

        for j in 0..200 {
            assert_eq!(identity[j].iter().sum::<f32>(), 1.0);
        }
        for c in 0..20 {
            assert_eq!((0..200).map(|j| identity[(j, c)]).sum::<f32>(), 10.0);
        }
        assert_eq!(prototype_classes(&identity)[57], Some(5));
    }

    #[test]
    fn test_leftover_prototypes() {
        let identity = prototype_class_identity(7, 3).unwrap();

        assert_eq!(prototype_classes(&identity), vec![Some(0), Some(0), Some(1), Some(1), Some(2), Some(2), None]);
        assert_eq!(&identity[6], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_counts() {
        assert!(matches!(prototype_class_identity(10, 0), Err(Error::Config { field: "num_classes", .. })));
        assert!(matches!(prototype_class_identity(2, 3), Err(Error::Config { field: "num_classes", .. })));
    }
}
