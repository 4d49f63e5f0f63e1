//! Coordinate space markers.
//!
//! Shape points live on the image canvas in pixels; the detector export works
//! in unit-square coordinates. Both are zero-sized marker types so the two can
//! never be mixed by accident.

use std::fmt;

/// Canvas (pixel) space. `(0, 0)` is the top-left corner of the image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Unit-square space: both axes divided by the image extent.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
