//! Data types shared across the grid, filters, importers and renderers.

mod cell;
mod filter;
mod snapshot;

pub use cell::*;
pub use filter::*;
pub use snapshot::*;
