// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Single precision complex numbers.
//!
//! Complex arithmetic between two values is `num::Complex`'s own.  The
//! operations against a bare scalar are this renderer's convention and
//! touch only the real component; they are named for that so nobody
//! mistakes them for a broadcast.

use num::Complex;

/// The complex type used throughout the renderer.
pub type Point = Complex<f32>;

/// Scalar arithmetic along the real axis.  The imaginary component is
/// always passed through untouched.
pub trait RealAxis {
    /// `(re + x) + im i`
    fn add_to_real(self, x: f32) -> Self;
    /// `(re - x) + im i`
    fn sub_from_real(self, x: f32) -> Self;
    /// `(re * x) + im i`
    fn scale_real_axis(self, x: f32) -> Self;
    /// `(re / x) + im i`
    fn divide_real_axis(self, x: f32) -> Self;
}

impl RealAxis for Point {
    fn add_to_real(self, x: f32) -> Self {
        Complex::new(self.re + x, self.im)
    }

    fn sub_from_real(self, x: f32) -> Self {
        Complex::new(self.re - x, self.im)
    }

    fn scale_real_axis(self, x: f32) -> Self {
        Complex::new(self.re * x, self.im)
    }

    fn divide_real_axis(self, x: f32) -> Self {
        Complex::new(self.re / x, self.im)
    }
}
