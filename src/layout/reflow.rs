//! Incremental reflow.
//!
//! The result is always equal to a full [`layout`] of the new events. Frames
//! of the whole measures in front of the first changed event are taken from
//! the previous tree instead of being placed again; the cursor and beat
//! state are replayed from the new events so that everything after them
//! lands exactly where a full layout would put it.

use crate::model::*;
use super::single::{finish_tree, layout, place_element, Placer};
use super::staff::staff_origin_y;
use super::tree::{ElementKind, LayoutTree};

/// Recompute `previous` for `events`, where `changed` lists the event
/// indices that differ from the sequence `previous` was built from.
///
/// If `previous` was computed for a different rect or options it is
/// ignored. Frames are only reused while their event kind (pitch and
/// duration) still matches the new event at the same index.
pub fn update_layout(
    previous: &LayoutTree,
    events: &[NotatedEvent],
    rect: Rect,
    options: &LayoutOptions,
    changed: &[usize],
) -> LayoutTree {
    if previous.rect != rect || previous.options != *options {
        log::debug!("reflow: rect or options changed, running a full layout");
        return layout(events, rect, options);
    }

    let first_changed = changed
        .iter()
        .copied()
        .min()
        .unwrap_or(events.len())
        .min(events.len());

    let matching = previous
        .elements
        .iter()
        .zip(events)
        .take(first_changed)
        .enumerate()
        .take_while(|(i, (el, ev))| el.index == *i && el.kind == ElementKind::from(&ev.event))
        .count();

    let origin_y = staff_origin_y(&rect, options);
    let mut placer = Placer::new(&rect, options);
    let mut anchors = Vec::with_capacity(events.len());
    // First index of the measure holding event `matching`
    let mut keep = 0;

    for (i, ev) in events.iter().enumerate() {
        if i <= matching && placer.forces_bar(i) {
            keep = i;
        }
        anchors.push(placer.anchor(i));
        if placer.advance(ev.duration()) && i < matching {
            keep = i + 1;
        }
    }

    log::debug!(
        "reflow: reusing {keep} of {} frames (first change at {first_changed})",
        events.len()
    );

    let elements = anchors
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            if i < keep {
                previous.elements[i].clone()
            } else {
                place_element(i, &events[i].event, x, origin_y, options)
            }
        })
        .collect();

    finish_tree(events, rect, options, elements, placer)
}
