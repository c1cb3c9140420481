//! stafflayout: staff notation layout engine.
//!
//! Converts an ordered sequence of notes and rests, decorated with slurs,
//! ties, hairpins, articulations and dynamics, into staff geometry for one
//! or more voices: element frames, bar lines, resolved spanners and beam
//! groups. Layouts can be recomputed incrementally with results identical
//! to a full layout.
//!
//! # Example
//! ```
//! use stafflayout::{layout, Duration, LayoutOptions, NotatedEvent, Pitch, Rect, Step};
//!
//! let events: Vec<NotatedEvent> = [Step::C, Step::D, Step::E, Step::F]
//!     .into_iter()
//!     .map(|s| NotatedEvent::note(Pitch::natural(s, 4), Duration::EIGHTH))
//!     .collect();
//!
//! let tree = layout(&events, Rect::new(0.0, 0.0, 400.0, 120.0), &LayoutOptions::default());
//! assert_eq!(tree.elements.len(), 4);
//! assert_eq!(tree.beam_groups.len(), 2);
//! ```

pub mod error;
pub mod layout;
pub mod model;
pub mod playback;
pub mod transform;

pub use error::{ConfigError, ModelError, PlaybackError};
pub use hit_test::{hit_test, DEFAULT_HIT_TOLERANCE};
pub use layout::{
    layout, layout_multi, resolve_spans, rest_y, staff_y, update_layout, BeamGroup, ElementKind,
    LayoutElement, LayoutTree, MultiLayoutTree, SpanSet, StemDirection,
};
pub use model::*;
pub use playback::{schedule_playback, MessageKind, PlaybackMessage};
pub use transform::{apply_patch, apply_patches, semantic_diff};
