// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The coordinator's image.
//!
//! Results arrive in whatever order the workers finish them and are
//! scattered into a row-major buffer.  Every cell must be written
//! exactly once, and the pixels can only be taken out once all of them
//! have been.

use crate::error::AssemblyError;
use crate::workunit::ResultRecord;

/// A square, row-major image of one byte per pixel, filled in by
/// scattered writes.
#[derive(Debug)]
pub struct PixelBuffer {
    edge: usize,
    pixels: Vec<u8>,
    written: Vec<bool>,
    remaining: usize,
}

impl PixelBuffer {
    /// An `edge` x `edge` image with nothing written yet.
    pub fn new(edge: usize) -> PixelBuffer {
        PixelBuffer {
            edge,
            pixels: vec![0; edge * edge],
            written: vec![false; edge * edge],
            remaining: edge * edge,
        }
    }

    /// Pixels along each side.
    pub fn edge(&self) -> usize {
        self.edge
    }

    /// Cells not yet written.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// True once every cell holds a result.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Write one pixel.
    pub fn scatter(&mut self, row: usize, column: usize, value: u8) -> Result<(), AssemblyError> {
        if row >= self.edge || column >= self.edge {
            return Err(AssemblyError::OutOfBounds {
                row,
                column,
                edge: self.edge,
            });
        }
        let offset = row * self.edge + column;
        if self.written[offset] {
            return Err(AssemblyError::Duplicate { row, column });
        }
        self.written[offset] = true;
        self.pixels[offset] = value;
        self.remaining -= 1;
        Ok(())
    }

    /// Write a whole column; `values[row]` lands in `row`.
    pub fn scatter_column(&mut self, column: usize, values: &[u8]) -> Result<(), AssemblyError> {
        if values.len() != self.edge {
            return Err(AssemblyError::OutOfBounds {
                row: values.len(),
                column,
                edge: self.edge,
            });
        }
        for (row, value) in values.iter().enumerate() {
            self.scatter(row, column, *value)?;
        }
        Ok(())
    }

    /// Write whatever a worker sent back.
    pub fn place(&mut self, record: &ResultRecord) -> Result<(), AssemblyError> {
        match record {
            ResultRecord::Pixel { row, column, value } => self.scatter(*row, *column, *value),
            ResultRecord::Column { column, values } => self.scatter_column(*column, values),
        }
    }

    /// The value at `row`, `column`, if it has been written.
    pub fn get(&self, row: usize, column: usize) -> Option<u8> {
        if row >= self.edge || column >= self.edge {
            return None;
        }
        let offset = row * self.edge + column;
        if self.written[offset] {
            Some(self.pixels[offset])
        } else {
            None
        }
    }

    /// Hand the finished image over.  Fails if any cell is unwritten.
    pub fn finish(self) -> Result<Vec<u8>, AssemblyError> {
        if !self.is_complete() {
            return Err(AssemblyError::Incomplete {
                missing: self.remaining,
            });
        }
        Ok(self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scattered_writes_land_row_major() {
        let mut buffer = PixelBuffer::new(3);
        buffer.scatter(0, 2, 7).unwrap();
        buffer.scatter(2, 0, 9).unwrap();
        assert_eq!(buffer.get(0, 2), Some(7));
        assert_eq!(buffer.get(2, 0), Some(9));
        assert_eq!(buffer.get(1, 1), None);
        assert_eq!(buffer.remaining(), 7);
    }

    #[test]
    fn columns_fill_top_to_bottom() {
        let mut buffer = PixelBuffer::new(2);
        buffer
            .place(&ResultRecord::Column {
                column: 1,
                values: vec![4, 5],
            })
            .unwrap();
        buffer
            .place(&ResultRecord::Column {
                column: 0,
                values: vec![2, 3],
            })
            .unwrap();
        assert_eq!(buffer.finish().unwrap(), vec![2, 4, 3, 5]);
    }

    #[test]
    fn cells_are_written_once() {
        let mut buffer = PixelBuffer::new(2);
        buffer.scatter(1, 1, 1).unwrap();
        assert_eq!(
            buffer.scatter(1, 1, 2),
            Err(AssemblyError::Duplicate { row: 1, column: 1 })
        );
        assert_eq!(buffer.get(1, 1), Some(1));
    }

    #[test]
    fn writes_outside_the_image_fail() {
        let mut buffer = PixelBuffer::new(2);
        assert_eq!(
            buffer.scatter(2, 0, 1),
            Err(AssemblyError::OutOfBounds {
                row: 2,
                column: 0,
                edge: 2
            })
        );
        assert!(buffer.scatter_column(0, &[1, 2, 3]).is_err());
    }

    #[test]
    fn incomplete_images_cannot_be_taken() {
        let mut buffer = PixelBuffer::new(2);
        buffer.scatter(0, 0, 1).unwrap();
        assert_eq!(
            buffer.finish(),
            Err(AssemblyError::Incomplete { missing: 3 })
        );
    }
}
