//! Twiddle factor evaluation and classification.
//!
//! The butterfly emitter never stores twiddle factors in the generated code.
//! Each factor is evaluated here at generation time, and each of its two
//! components is classified as exactly zero, exactly one, exactly minus one,
//! or a generic value. The first three classes let the emitter elide
//! multiplications and whole summands.

use num_complex::Complex;

use crate::FftDirection;

pub(crate) fn compute_twiddle(index: usize, fft_len: usize, direction: FftDirection) -> Complex<f64> {
    let constant = -2.0 * std::f64::consts::PI / fft_len as f64;
    let angle = constant * index as f64;
    let result = Complex::from_polar(1.0, angle);

    match direction {
        FftDirection::Forward => result,
        FftDirection::Inverse => result.conj(),
    }
}

/// One twiddle component, as seen by the emitter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Coefficient {
    Zero,
    PlusOne,
    MinusOne,
    Generic(f64),
}

/// Classifier for twiddle components of one transform size.
///
/// The thresholds bake in the minimum non-trivial twiddle angle `pi/(n/2)`:
/// every component closer to 0 or +-1 than half the distance to its nearest
/// neighbor on the twiddle grid is that exact value, and no neighbor can be
/// misclassified.
pub(crate) struct Classifier {
    eps: f64,
    eps_one: f64,
    eps_minus_one: f64,
}

impl Classifier {
    /// `n` is the transform size. Sizes below 2 have no butterflies and
    /// therefore nothing to classify.
    pub fn for_size(n: usize) -> Self {
        debug_assert!(n >= 2, "no twiddles exist for size {}", n);
        let step = std::f64::consts::PI / ((n / 2) as f64);
        let one_band = 0.5 * (1.0 - step.cos());
        Classifier {
            eps: 0.5 * step.sin(),
            eps_one: 1.0 - one_band,
            eps_minus_one: -1.0 + one_band,
        }
    }

    pub fn classify(&self, w: f64) -> Coefficient {
        if w.abs() <= self.eps {
            Coefficient::Zero
        } else if w >= self.eps_one {
            Coefficient::PlusOne
        } else if w <= self.eps_minus_one {
            Coefficient::MinusOne
        } else {
            Coefficient::Generic(w)
        }
    }
}
