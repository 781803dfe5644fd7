// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.
//!
//! Iterates `z <- z^2 + c` from `z = 0`, counting iterations until
//! `|z|^2 >= 4` or the cap is reached.  The first iteration always
//! runs, so every pixel holds a value in `[1, cap]`, and a point that
//! never escapes holds exactly `cap`.

use crate::complex::Point;
use crate::config::RenderConfig;
use crate::planes::{Pixel, PlaneMapper};

/// Escape time of `c`, capped at `limit`.
pub fn escape_time(c: Point, limit: u8) -> u8 {
    let mut z = Point::new(0.0, 0.0);
    let mut count: u8 = 0;
    loop {
        z = z * z + c;
        count += 1;
        if z.norm_sqr() >= 4.0 || count >= limit {
            return count;
        }
    }
}

/// Computes pixels for one configuration.  Cheap to share between
/// threads; it holds no mutable state.
#[derive(Clone, Debug)]
pub struct Evaluator {
    mapper: PlaneMapper,
    limit: u8,
}

impl Evaluator {
    /// Binds the evaluator to the plane, edge and cap of `config`.
    pub fn new(config: &RenderConfig) -> Evaluator {
        Evaluator {
            mapper: PlaneMapper::new(config.edge, &config.plane),
            limit: config.color_depth,
        }
    }

    /// Pixels along each side of the image.
    pub fn edge(&self) -> usize {
        self.mapper.edge
    }

    /// The escape time of the pixel at `column`, `row`.
    pub fn pixel(&self, column: usize, row: usize) -> u8 {
        escape_time(self.mapper.pixel_to_point(&Pixel { column, row }), self.limit)
    }

    /// Every pixel of `column`, top row first.
    pub fn column(&self, column: usize) -> Vec<u8> {
        (0..self.mapper.edge)
            .map(|row| self.pixel(column, row))
            .collect()
    }

    /// Renders the whole image in the calling thread.  This is the
    /// reference every distributed strategy has to reproduce.
    pub fn render(&self) -> Vec<u8> {
        let mut pixels = vec![0 as u8; self.mapper.len()];
        for (column, row) in iproduct!(0..self.mapper.edge, 0..self.mapper.edge) {
            let pixel = Pixel { column, row };
            pixels[self.mapper.offset(&pixel)] = self.pixel(column, row);
        }
        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_origin_never_escapes() {
        assert_eq!(escape_time(Point::new(0.0, 0.0), 255), 255);
        assert_eq!(escape_time(Point::new(-1.0, 0.0), 100), 100);
    }

    #[test]
    fn far_points_escape_on_the_first_iteration() {
        assert_eq!(escape_time(Point::new(-2.0, -2.0), 255), 1);
        assert_eq!(escape_time(Point::new(3.0, 0.0), 255), 1);
    }

    #[test]
    fn at_least_one_iteration_runs() {
        assert_eq!(escape_time(Point::new(0.0, 0.0), 1), 1);
        assert_eq!(escape_time(Point::new(10.0, 10.0), 1), 1);
    }

    #[test]
    fn counts_stay_within_the_cap() {
        for i in 0..50 {
            let c = Point::new(-2.0 + i as f32 * 0.05, 0.3);
            let t = escape_time(c, 40);
            assert!(t >= 1 && t <= 40, "{} escaped after {}", c, t);
        }
    }

    #[test]
    fn known_escape_time() {
        // c = 1: z = 1, 2, 5.  |2|^2 = 4 already escapes.
        assert_eq!(escape_time(Point::new(1.0, 0.0), 255), 2);
    }

    #[test]
    fn the_classic_view() {
        let evaluator = Evaluator::new(&RenderConfig::default());
        assert!(evaluator.pixel(0, 0) <= 5);
        assert_eq!(evaluator.pixel(200, 200), 255);
    }

    #[test]
    fn columns_match_single_pixels() {
        let config = RenderConfig {
            edge: 16,
            ..RenderConfig::default()
        };
        let evaluator = Evaluator::new(&config);
        let column = evaluator.column(5);
        assert_eq!(column.len(), 16);
        for (row, value) in column.iter().enumerate() {
            assert_eq!(*value, evaluator.pixel(5, row));
        }
    }

    #[test]
    fn render_is_row_major() {
        let config = RenderConfig {
            edge: 12,
            ..RenderConfig::default()
        };
        let evaluator = Evaluator::new(&config);
        let pixels = evaluator.render();
        assert_eq!(pixels.len(), 144);
        assert_eq!(pixels[3 * 12 + 7], evaluator.pixel(7, 3));
        assert_eq!(pixels[7 * 12 + 3], evaluator.pixel(3, 7));
    }

    #[test]
    fn a_single_pixel_image() {
        let config = RenderConfig {
            edge: 1,
            ..RenderConfig::default()
        };
        assert_eq!(Evaluator::new(&config).render(), vec![1]);
    }
}
