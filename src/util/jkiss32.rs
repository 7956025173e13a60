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

use rand::{self, Rng, RngCore, SeedableRng};

/// David Jones' JKISS32 generator.  Small, fast and reproducible from a 16 byte seed.
#[derive(Clone, Copy, Debug)]
pub struct JKiss32Rng {
    x: u32,
    y: u32,
    z: u32,
    w: u32,
    c: bool,
}

impl JKiss32Rng {
    /// A generator seeded from the thread's entropy source.
    pub fn new() -> JKiss32Rng {
        JKiss32Rng::from_seed(rand::thread_rng().gen())
    }
}

impl Default for JKiss32Rng {
    fn default() -> JKiss32Rng {
        JKiss32Rng::new()
    }
}

impl SeedableRng for JKiss32Rng {
    type Seed = [u8; 16];

    fn from_seed(seed: [u8; 16]) -> JKiss32Rng {
        let word = |i: usize| u32::from_le_bytes([seed[i], seed[i + 1], seed[i + 2], seed[i + 3]]);

        // The xorshift component sticks at zero.
        let y = match word(4) {
            0 => 987654321,
            y => y,
        };

        JKiss32Rng {
            x: word(0),
            y: y,
            z: word(8),
            w: word(12),
            c: false,
        }
    }
}

impl RngCore for JKiss32Rng {
    fn next_u32(&mut self) -> u32 {
        self.y ^= self.y << 5;
        self.y ^= self.y >> 7;
        self.y ^= self.y << 22;
        let t = self.z.wrapping_add(self.w).wrapping_add(self.c as u32) as i32;
        self.z = self.w;
        self.c = t < 0;
        self.w = (t & 0x7FFFFFFF) as u32;
        self.x = self.x.wrapping_add(1411392427);
        self.x.wrapping_add(self.y).wrapping_add(self.w)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
