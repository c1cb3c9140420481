//! Multi-voice layout on one staff.
//!
//! The primary voice (index 0) fixes the horizontal anchors and the bar
//! lines; every other voice reuses those anchors event by event. Voices
//! longer than the primary are cut at the anchor count.

use std::collections::BTreeMap;

use crate::model::*;
use super::beams::find_beam_groups;
use super::constants::*;
use super::single::{canvas_size, place_element, Placer};
use super::spanners::{resolve_marks, resolve_spans};
use super::staff::{staff_origin_y, staff_y};
use super::tree::{BeamGroup, LayoutElement, MultiLayoutTree, SpanSet, StemDirection};

/// Lay out several voices sharing `rect` and `options`.
pub fn layout_multi(voices: &[Voice], rect: Rect, options: &LayoutOptions) -> MultiLayoutTree {
    let origin_y = staff_origin_y(&rect, options);
    let mut placer = Placer::new(&rect, options);

    let anchors: Vec<f64> = voices
        .first()
        .map(|primary| {
            primary
                .iter()
                .enumerate()
                .map(|(i, ev)| {
                    let x = placer.anchor(i);
                    placer.advance(ev.duration());
                    x
                })
                .collect()
        })
        .unwrap_or_default();

    let lengths: Vec<usize> = voices
        .iter()
        .enumerate()
        .map(|(v, voice)| {
            let len = voice.len().min(anchors.len());
            if len < voice.len() {
                log::debug!("voice {v} truncated from {} to {len} events", voice.len());
            }
            len
        })
        .collect();

    let index_map = flattened_index_map(&lengths);
    let total: usize = lengths.iter().sum();

    let mut elements: Vec<LayoutElement> = Vec::with_capacity(total);
    let mut voice_ids: Vec<usize> = Vec::with_capacity(total);
    let mut spans = SpanSet::default();
    let mut articulations = BTreeMap::new();
    let mut dynamics = BTreeMap::new();
    let mut beam_groups: Vec<BeamGroup> = Vec::new();

    for (v, voice) in voices.iter().enumerate() {
        let events = &voice.events[..lengths[v]];
        let map = &index_map[v];

        for (i, ev) in events.iter().enumerate() {
            let offset = head_offset(voices, &lengths, v, i, origin_y, options);
            elements.push(place_element(i, &ev.event, anchors[i] + offset, origin_y, options));
            voice_ids.push(v);
        }

        spans.extend(resolve_spans(events).remapped(map));

        let (voice_articulations, voice_dynamics) = resolve_marks(events);
        articulations.extend(voice_articulations.into_iter().map(|(i, a)| (map[i], a)));
        dynamics.extend(voice_dynamics.into_iter().map(|(i, d)| (map[i], d)));

        beam_groups.extend(
            find_beam_groups(events, &options.time_signature)
                .into_iter()
                .map(|group| BeamGroup {
                    elements: group.elements.iter().map(|&i| map[i]).collect(),
                    levels: group.levels,
                }),
        );
    }

    let stems = (0..voices.len()).map(stem_direction).collect();
    let size = canvas_size(&rect, options, &elements, placer.cursor());

    MultiLayoutTree {
        rect,
        options: options.clone(),
        size,
        elements,
        voice_ids,
        index_map,
        stems,
        bar_lines: placer.into_bar_lines(),
        spans,
        articulations,
        dynamics,
        beam_groups,
    }
}

/// Voice-major numbering: `map[v][i]` is the flattened index of event `i`
/// of voice `v`.
fn flattened_index_map(lengths: &[usize]) -> Vec<Vec<usize>> {
    let mut next = 0;
    lengths
        .iter()
        .map(|&len| {
            let map: Vec<usize> = (next..next + len).collect();
            next += len;
            map
        })
        .collect()
}

fn stem_direction(voice: usize) -> StemDirection {
    if voice == 0 {
        StemDirection::Up
    } else {
        StemDirection::Down
    }
}

/// Horizontal notehead offset of event `i` in voice `v`.
///
/// Only voices 0 and 1 are compared. A unison or a second between them
/// splits symmetrically; everything else takes the default offsets
/// (voice 0 stays on the anchor, lower voices shift right).
fn head_offset(
    voices: &[Voice],
    lengths: &[usize],
    v: usize,
    i: usize,
    origin_y: f64,
    options: &LayoutOptions,
) -> f64 {
    let default = if v == 0 { 0.0 } else { LOWER_VOICE_OFFSET };
    if v > 1 || lengths.len() < 2 || i >= lengths[0] || i >= lengths[1] {
        return default;
    }

    let (Some(upper), Some(lower)) = (voices[0].events[i].pitch(), voices[1].events[i].pitch())
    else {
        return default;
    };

    if upper == lower || is_second(upper, lower, origin_y, options) {
        if v == 0 {
            -SPLIT_OFFSET
        } else {
            SPLIT_OFFSET
        }
    } else {
        default
    }
}

/// Noteheads one diatonic step apart (half a staff space vertically).
fn is_second(a: &Pitch, b: &Pitch, origin_y: f64, options: &LayoutOptions) -> bool {
    let ya = staff_y(a, options.clef, origin_y, options.staff_spacing);
    let yb = staff_y(b, options.clef, origin_y, options.staff_spacing);
    ((ya - yb).abs() - options.staff_spacing / 2.0).abs() <= SECOND_TOLERANCE
}
