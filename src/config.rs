// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fixed parameters of a render.  Built once, validated, and then
//! handed by reference to everything that needs it.

use std::convert::TryFrom;
use std::path::PathBuf;

use crate::complex::Point;
use crate::error::ConfigError;
use crate::planes::ComplexPlane;

/// Pixels along each side of the image unless told otherwise.
pub const DEFAULT_EDGE: usize = 400;

/// Iteration cap, and so the brightest grey, unless told otherwise.
pub const DEFAULT_COLOR_DEPTH: u8 = 255;

/// Where the image goes unless told otherwise.
pub const DEFAULT_OUTPUT: &str = "Mandelbrot.bmp";

/// Everything a run needs to know about the picture it is producing.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Edge length E of the square image, in pixels.
    pub edge: usize,
    /// Iteration cap M.  Every pixel holds a value in `[1, M]`.
    pub color_depth: u8,
    /// The region of the complex plane being rendered.
    pub plane: ComplexPlane,
    /// Destination of the encoded image.
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            edge: DEFAULT_EDGE,
            color_depth: DEFAULT_COLOR_DEPTH,
            plane: ComplexPlane::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl RenderConfig {
    /// Builds and validates a configuration.  `color_depth` is taken
    /// wide so that out-of-range requests are reported rather than
    /// truncated.
    pub fn new(
        edge: usize,
        color_depth: u32,
        origin: Point,
        size: Point,
        output: PathBuf,
    ) -> Result<RenderConfig, ConfigError> {
        let color_depth = match u8::try_from(color_depth) {
            Ok(depth) => depth,
            Err(_) => return Err(ConfigError::ColorDepth { depth: color_depth }),
        };
        let config = RenderConfig {
            edge,
            color_depth,
            plane: ComplexPlane::new(origin, size)?,
            output,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the schedulers rely on.  Useful for
    /// configurations assembled field by field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.edge == 0 {
            return Err(ConfigError::EmptyImage);
        }
        // Column results carry the index plus one value per row.
        if i32::try_from(self.edge + 1).is_err() {
            return Err(ConfigError::EdgeTooLarge { edge: self.edge });
        }
        if self.color_depth == 0 {
            return Err(ConfigError::ColorDepth { depth: 0 });
        }
        ComplexPlane::new(self.plane.origin, self.plane.size)?;
        Ok(())
    }

    /// Number of pixels in the image.
    pub fn pixel_count(&self) -> usize {
        self.edge * self.edge
    }
}
