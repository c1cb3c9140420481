//! Single-voice layout: horizontal placement, bar lines, and assembly of
//! the tree from the per-event results.

use crate::model::*;
use super::beams::find_beam_groups;
use super::constants::*;
use super::spanners::{resolve_marks, resolve_spans};
use super::staff::{content_start_x, rest_y, staff_floor_y, staff_origin_y, staff_y};
use super::tree::{ElementKind, LayoutElement, LayoutTree};

/// Horizontal placement state: cursor, running beat accumulator and the
/// bar lines emitted so far.
pub(super) struct Placer<'a> {
    options: &'a LayoutOptions,
    cursor: f64,
    beats: f64,
    bar_lines: Vec<f64>,
}

impl<'a> Placer<'a> {
    pub(super) fn new(rect: &Rect, options: &'a LayoutOptions) -> Self {
        Self {
            options,
            cursor: content_start_x(rect, options),
            beats: 0.0,
            bar_lines: Vec::new(),
        }
    }

    pub(super) fn forces_bar(&self, index: usize) -> bool {
        self.options.forced_bars.contains(&index)
    }

    /// x anchor of event `index`. A forced bar line lands on the cursor first.
    pub(super) fn anchor(&mut self, index: usize) -> f64 {
        if self.forces_bar(index) {
            self.bar_lines.push(self.cursor);
        }
        self.cursor
    }

    /// Move past an event. Returns whether the event completed a bar.
    pub(super) fn advance(&mut self, duration: Duration) -> bool {
        let time = &self.options.time_signature;
        self.cursor += advance_factor(duration) * self.options.note_advance;
        self.beats += time.beat_weight(duration);

        let bar = time.bar_beats();
        let mut closed = false;
        while self.beats + BEAT_EPSILON >= bar {
            self.bar_lines.push(self.cursor);
            self.beats = (self.beats - bar).max(0.0);
            closed = true;
        }
        closed
    }

    pub(super) fn cursor(&self) -> f64 {
        self.cursor
    }

    pub(super) fn into_bar_lines(self) -> Vec<f64> {
        self.bar_lines
    }
}

/// Advance in units of `note_advance` for a notated value.
pub(super) fn advance_factor(duration: Duration) -> f64 {
    match duration.den() {
        1 => 3.0,
        2 => 2.0,
        4 => 1.4,
        8 => 1.1,
        16 => 0.9,
        _ => 1.0,
    }
}

/// Frame for one event centered on `x`.
pub(super) fn place_element(
    index: usize,
    event: &Event,
    x: f64,
    origin_y: f64,
    options: &LayoutOptions,
) -> LayoutElement {
    let frame = match event {
        Event::Note { pitch, .. } => {
            let y = staff_y(pitch, options.clef, origin_y, options.staff_spacing);
            Rect::centered(x, y, NOTE_FRAME, NOTE_FRAME)
        }
        Event::Rest { .. } => {
            let y = rest_y(origin_y, options.staff_spacing);
            Rect::centered(x, y, REST_FRAME, REST_FRAME)
        }
    };
    LayoutElement { index, kind: ElementKind::from(event), frame }
}

/// Canvas size: the target rect, grown to fit the staff and every element.
/// Without elements the rect size is returned unchanged.
pub(super) fn canvas_size(
    rect: &Rect,
    options: &LayoutOptions,
    elements: &[LayoutElement],
    cursor_end: f64,
) -> Size {
    if elements.is_empty() {
        return rect.size();
    }

    let origin_y = staff_origin_y(rect, options);
    let mut right = cursor_end;
    let mut bottom = staff_floor_y(origin_y, options.staff_spacing);
    for el in elements {
        right = right.max(el.frame.max_x());
        bottom = bottom.max(el.frame.max_y());
    }

    Size::new(
        rect.width.max(right + options.padding - rect.x),
        rect.height.max(bottom + options.padding - rect.y),
    )
}

/// Lay out one voice inside `rect` (a minimum size; the canvas may grow).
pub fn layout(events: &[NotatedEvent], rect: Rect, options: &LayoutOptions) -> LayoutTree {
    let origin_y = staff_origin_y(&rect, options);
    let mut placer = Placer::new(&rect, options);
    let mut elements = Vec::with_capacity(events.len());

    for (i, ev) in events.iter().enumerate() {
        let x = placer.anchor(i);
        elements.push(place_element(i, &ev.event, x, origin_y, options));
        placer.advance(ev.duration());
    }

    finish_tree(events, rect, options, elements, placer)
}

/// Attach bar lines, spans, marks and beams to placed elements.
pub(super) fn finish_tree(
    events: &[NotatedEvent],
    rect: Rect,
    options: &LayoutOptions,
    elements: Vec<LayoutElement>,
    placer: Placer<'_>,
) -> LayoutTree {
    let size = canvas_size(&rect, options, &elements, placer.cursor());
    let (articulations, dynamics) = resolve_marks(events);

    LayoutTree {
        rect,
        options: options.clone(),
        size,
        elements,
        bar_lines: placer.into_bar_lines(),
        spans: resolve_spans(events),
        articulations,
        dynamics,
        beam_groups: find_beam_groups(events, &options.time_signature),
    }
}
