//
// This file is part of smallmath.
//
// smallmath is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// smallmath is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with smallmath. If not, see <http://www.gnu.org/licenses/>.
//
// Copyright 2017 Chris Foster
//

pub use self::add::{add, add_assign, subtract, subtract_assign};
pub use self::multiply::{divide, divide_assign, multiply, multiply_assign};
pub use self::scale::{offset, offset_assign, scale, scale_assign};
pub use self::square::{sqrt, sqrt_assign, square, square_assign};

mod add;
mod multiply;
mod scale;
mod square;
