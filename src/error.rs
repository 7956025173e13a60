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

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value that cannot describe a model, named by its field.
    #[error("Invalid configuration for {field}: {message}")]
    Config { field: &'static str, message: String },

    #[error(transparent)]
    Layer(#[from] smallann::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config<M>(field: &'static str, message: M) -> Error where M: Into<String> {
        Error::Config { field: field, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
