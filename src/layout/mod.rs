//! Layout engines: they convert notated events into staff geometry.
//!
//! All entry points are pure functions of their arguments: options are
//! passed into every call and the resulting trees are immutable snapshots
//! that may be shared freely across threads.

mod beams;
mod constants;
mod multi;
mod reflow;
mod single;
mod spanners;
mod staff;
mod tree;

pub use multi::layout_multi;
pub use reflow::update_layout;
pub use single::layout;
pub use spanners::resolve_spans;
pub use staff::{rest_y, staff_y};
pub use tree::*;
