//! Computed layout output. Trees are immutable snapshots: a new layout
//! replaces the whole tree, nothing edits one in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hit_test::{hit_test, DEFAULT_HIT_TOLERANCE};
use crate::model::*;

/// What an element draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Note { pitch: Pitch, duration: Duration },
    Rest { duration: Duration },
}

impl From<&Event> for ElementKind {
    fn from(event: &Event) -> Self {
        match *event {
            Event::Note { pitch, duration } => ElementKind::Note { pitch, duration },
            Event::Rest { duration } => ElementKind::Rest { duration },
        }
    }
}

/// One positioned notehead or rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    /// Index of the owning event within its voice
    pub index: usize,
    pub kind: ElementKind,
    /// Device-space frame
    pub frame: Rect,
}

/// Resolved spanners as element index pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSet {
    pub slurs: Vec<(usize, usize)>,
    pub ties: Vec<(usize, usize)>,
    pub hairpins: Vec<(usize, usize, HairpinKind)>,
}

impl SpanSet {
    pub fn is_empty(&self) -> bool {
        self.slurs.is_empty() && self.ties.is_empty() && self.hairpins.is_empty()
    }

    /// Renumber every endpoint through `map`.
    pub(crate) fn remapped(&self, map: &[usize]) -> SpanSet {
        SpanSet {
            slurs: self.slurs.iter().map(|&(a, b)| (map[a], map[b])).collect(),
            ties: self.ties.iter().map(|&(a, b)| (map[a], map[b])).collect(),
            hairpins: self
                .hairpins
                .iter()
                .map(|&(a, b, kind)| (map[a], map[b], kind))
                .collect(),
        }
    }

    pub(crate) fn extend(&mut self, other: SpanSet) {
        self.slurs.extend(other.slurs);
        self.ties.extend(other.ties);
        self.hairpins.extend(other.hairpins);
    }
}

/// A run of notes joined by a beam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamGroup {
    /// Element indices, at least two
    pub elements: Vec<usize>,
    /// Beam count between each adjacent pair (`elements.len() - 1` entries)
    pub levels: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
    Down,
}

/// Layout of a single voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    /// Target rectangle the tree was computed for
    pub rect: Rect,
    /// Options the tree was computed with
    pub options: LayoutOptions,
    /// Canvas size; never smaller than `rect`
    pub size: Size,
    pub elements: Vec<LayoutElement>,
    /// Bar line x positions in emission order
    pub bar_lines: Vec<f64>,
    pub spans: SpanSet,
    pub articulations: BTreeMap<usize, Vec<Articulation>>,
    pub dynamics: BTreeMap<usize, Dynamic>,
    pub beam_groups: Vec<BeamGroup>,
}

impl LayoutTree {
    /// Compare everything the layout computes, ignoring the recorded inputs.
    pub fn content_eq(&self, other: &LayoutTree) -> bool {
        self.size == other.size
            && self.elements == other.elements
            && self.bar_lines == other.bar_lines
            && self.spans == other.spans
            && self.articulations == other.articulations
            && self.dynamics == other.dynamics
            && self.beam_groups == other.beam_groups
    }

    /// Index of the first element whose frame (plus the default tolerance)
    /// contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        hit_test(&self.elements, point, DEFAULT_HIT_TOLERANCE)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Layout of several voices sharing one staff.
///
/// Element positions form the flattened index space: voice 0's events
/// first, then voice 1's, and so on. Spans, marks and beam groups use
/// flattened indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLayoutTree {
    pub rect: Rect,
    pub options: LayoutOptions,
    pub size: Size,
    /// `LayoutElement::index` is the event index within its own voice
    pub elements: Vec<LayoutElement>,
    /// Voice of each element, parallel to `elements`
    pub voice_ids: Vec<usize>,
    /// `index_map[voice][event]` = flattened element index
    pub index_map: Vec<Vec<usize>>,
    /// Stem direction per voice
    pub stems: Vec<StemDirection>,
    /// Bar lines of the primary voice
    pub bar_lines: Vec<f64>,
    pub spans: SpanSet,
    pub articulations: BTreeMap<usize, Vec<Articulation>>,
    pub dynamics: BTreeMap<usize, Dynamic>,
    pub beam_groups: Vec<BeamGroup>,
}

impl MultiLayoutTree {
    /// Flattened index of event `event` in voice `voice`, if it was laid out.
    pub fn flattened_index(&self, voice: usize, event: usize) -> Option<usize> {
        self.index_map.get(voice)?.get(event).copied()
    }

    /// `(voice, event index)` of a flattened element index.
    pub fn locate(&self, flattened: usize) -> Option<(usize, usize)> {
        let voice = *self.voice_ids.get(flattened)?;
        Some((voice, self.elements[flattened].index))
    }

    /// Flattened index of the first element under `point`.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        hit_test(&self.elements, point, DEFAULT_HIT_TOLERANCE)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
