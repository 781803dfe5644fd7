//! Contains the PlaneMapper struct, which describes a relationship
//! between a square on the integral plane with an origin at 0,0, and
//! a rectangle on the complex plane described by its left-upper
//! corner and its size.
use crate::complex::Point;
use crate::error::ConfigError;

/// Describes a rectangle of the complex plane by its left-upper
/// corner and the extent along each axis, treating the real part of
/// each value as the x-component and the imaginary part as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane {
    /// The left-upper corner.
    pub origin: Point,
    /// Width (real part) and height (imaginary part) of the region.
    pub size: Point,
}

impl ComplexPlane {
    /// Rejects planes with no area or with coordinates that aren't
    /// numbers.
    pub fn new(origin: Point, size: Point) -> Result<ComplexPlane, ConfigError> {
        if !origin.re.is_finite() || !origin.im.is_finite() {
            return Err(ConfigError::DegeneratePlane {
                reason: format!("origin {} is not finite", origin),
            });
        }
        if !(size.re.is_finite() && size.re > 0.0) {
            return Err(ConfigError::DegeneratePlane {
                reason: format!("width {} is not a positive number", size.re),
            });
        }
        if !(size.im.is_finite() && size.im > 0.0) {
            return Err(ConfigError::DegeneratePlane {
                reason: format!("height {} is not a positive number", size.im),
            });
        }
        Ok(ComplexPlane { origin, size })
    }

    /// The distance on the complex plane between neighbouring pixels
    /// of an `edge` x `edge` image, along the real and the imaginary
    /// axis.
    pub fn scale_factors(&self, edge: usize) -> (f32, f32) {
        (self.size.re / edge as f32, self.size.im / edge as f32)
    }
}

impl Default for ComplexPlane {
    fn default() -> Self {
        ComplexPlane {
            origin: Point::new(-2.0, -2.0),
            size: Point::new(4.0, 4.0),
        }
    }
}

/// The column and row of a pixel.  Columns run along the real axis,
/// rows along the imaginary axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel {
    /// Horizontal index.
    pub column: usize,
    /// Vertical index.
    pub row: usize,
}

/// Maps pixels of a square image onto the complex plane.
#[derive(Clone, Debug)]
pub struct PlaneMapper {
    /// Pixels along each side of the image.
    pub edge: usize,
    origin: Point,
    // Distance between neighbouring pixels along each axis.
    grid_factors: (f32, f32),
}

impl PlaneMapper {
    /// Constructor.  Takes the edge of the image and the region of the
    /// complex plane it covers.
    pub fn new(edge: usize, plane: &ComplexPlane) -> PlaneMapper {
        PlaneMapper {
            edge,
            origin: plane.origin,
            grid_factors: plane.scale_factors(edge),
        }
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.edge * self.edge
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.edge == 0
    }

    /// Given a pixel, return the complex number at its position.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Point {
        self.origin
            + Point::new(
                self.grid_factors.0 * pixel.column as f32,
                self.grid_factors.1 * pixel.row as f32,
            )
    }

    /// Linear offset of a pixel in a row-major buffer.
    pub fn offset(&self, pixel: &Pixel) -> usize {
        pixel.row * self.edge + pixel.column
    }
}
