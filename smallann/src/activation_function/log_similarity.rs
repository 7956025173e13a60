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

use crate::activation_function::ActivationFunction;

/// Keeps the similarity of a zero distance finite.
pub const EPSILON: f32 = 1e-4;

/// Maps a squared distance `d` to the similarity `ln((d + 1) / (d + EPSILON))`.
///
/// The similarity is `ln(1 / EPSILON)` at `d = 0`, decreases monotonically and approaches zero as `d` grows.
/// Negative distances, which only arise from rounding, are treated as zero.
#[derive(Clone, Debug)]
pub struct LogSimilarityActivationFunction;

impl ActivationFunction for LogSimilarityActivationFunction {
    fn f(x: f32) -> f32 {
        let d = if x < 0.0 { 0.0 } else { x };
        ((d + 1.0) / (d + EPSILON)).ln()
    }

    fn f_prime(x: f32) -> f32 {
        if x < 0.0 {
            0.0
        } else {
            1.0 / (x + 1.0) - 1.0 / (x + EPSILON)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_at_zero() {
        let expected = (10000.0f32).ln();
        assert!((LogSimilarityActivationFunction::f(0.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_similarity_non_increasing() {
        let mut previous = LogSimilarityActivationFunction::f(0.0);
        for i in 1..=1000 {
            let similarity = LogSimilarityActivationFunction::f(i as f32);
            assert!(similarity <= previous + 1e-6, "S({}) = {} > {}", i, similarity, previous);
            assert!(similarity > 0.0);
            previous = similarity;
        }
    }

    #[test]
    fn test_similarity_vanishes() {
        assert!(LogSimilarityActivationFunction::f(1e6) < 1e-5);
    }

    #[test]
    fn test_negative_distances_are_clamped() {
        let at_zero = LogSimilarityActivationFunction::f(0.0);
        assert_eq!(LogSimilarityActivationFunction::f(-EPSILON), at_zero);
        assert_eq!(LogSimilarityActivationFunction::f(-5.0), at_zero);
        assert_eq!(LogSimilarityActivationFunction::f_prime(-1.0), 0.0);
        assert!(LogSimilarityActivationFunction::f(f32::NAN).is_nan());
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        for &d in &[0.5f32, 2.0, 10.0] {
            let h = 1e-3;
            let numeric = (LogSimilarityActivationFunction::f(d + h) - LogSimilarityActivationFunction::f(d - h)) / (2.0 * h);
            let analytic = LogSimilarityActivationFunction::f_prime(d);
            assert!((numeric - analytic).abs() < 1e-2 * analytic.abs().max(1.0), "{}: {} != {}", d, numeric, analytic);
        }
    }
}
