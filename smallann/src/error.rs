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

use thiserror::Error;

/// Errors raised while assembling layers and networks, or feeding them badly shaped batches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{layer}: {field} must be nonzero")]
    ZeroDimension {
        layer: &'static str,
        field: &'static str,
    },

    #[error("{layer}: {field} mismatch, expected {expected} but found {found}")]
    ShapeMismatch {
        layer: &'static str,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{layer}: {kernel_height}x{kernel_width} kernel doesn't fit a {input_height}x{input_width} input")]
    KernelTooLarge {
        layer: &'static str,
        kernel_height: usize,
        kernel_width: usize,
        input_height: usize,
        input_width: usize,
    },

    #[error("a network needs at least one layer")]
    EmptyNetwork,
}

pub type Result<T> = std::result::Result<T, Error>;
