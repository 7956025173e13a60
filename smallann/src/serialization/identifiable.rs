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

/// A stable name for a serializable type, written ahead of its contents so a
/// [`LayerRegistry`](struct.LayerRegistry.html) can pick the matching reader.
///
/// Generic types carry their parameter's name, as in `L2ConvolutionLayer<AdadeltaGradientDescent>`.
pub trait Identifiable {
    fn identifier() -> String where Self: Sized;
    fn get_identifier(&self) -> String;
}

/// Implements `Identifiable` for each listed type, named as written.  A type takes at most one parameter.
macro_rules! identifiable {
    ($($type:ident $(<$param:ident>)?,)*) => {
        $(
            impl$(<$param: Identifiable>)? Identifiable for $type$(<$param>)? {
                fn identifier() -> String {
                    let name = String::from(stringify!($type));
                    $(
                        let name = format!("{}<{}>", name, $param::identifier());
                    )?
                    name
                }

                fn get_identifier(&self) -> String {
                    Self::identifier()
                }
            }
        )*
    };
}
