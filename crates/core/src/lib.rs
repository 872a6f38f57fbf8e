//! Core types shared by the grid engine and its consumers.
//!
//! Nothing here knows about cells or sheets: regions, inclusive grid
//! ranges, and the screen-space rectangles a renderer reports back.

pub mod geometry;
pub mod range;
pub mod region;

pub use geometry::{ScreenPoint, ScreenRect};
pub use range::GridRange;
pub use region::Region;
