//! Position sizing.
//!
//! Sizes a trade on one path from its history using a conservative Kelly
//! fraction and a reliability adjustment. Paths with too little history
//! get the floor size.

pub mod allocation;
pub mod kelly;
mod sizer;

pub use allocation::{allocate_across_paths, AllocationBounds};
pub use kelly::{kelly_fraction, scaled_kelly};
pub use sizer::{PositionSize, PositionSizer, SizingBasis, SizingSettings};
