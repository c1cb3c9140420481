//! Playback scheduling: turns a flat event sequence into time-ordered
//! note-on/note-off messages, independent of any layout tree.
//!
//! Times are seconds from the start. Velocities are 16-bit and follow the
//! marked dynamics; inside a hairpin the level is interpolated per element
//! and snapped back to the nearest named dynamic.

use serde::Serialize;

use crate::error::PlaybackError;
use crate::layout::resolve_spans;
use crate::model::*;

/// Tempo used when the caller passes a non-positive or non-finite one.
pub const DEFAULT_TEMPO: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    NoteOn,
    NoteOff,
}

impl MessageKind {
    /// Offs sort before ons at the same instant so repeated pitches re-attack.
    fn order(self) -> u8 {
        match self {
            MessageKind::NoteOff => 0,
            MessageKind::NoteOn => 1,
        }
    }
}

/// One scheduled message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackMessage {
    /// Seconds from the start of the sequence
    pub time_secs: f64,
    pub kind: MessageKind,
    /// MIDI channel (0–15)
    pub channel: u8,
    /// MIDI note number
    pub note: u8,
    /// 16-bit velocity; 0 on note-off
    pub velocity: u16,
}

/// Schedule `events` at `tempo_bpm` (quarter notes per minute) on `channel`.
///
/// Rests advance time silently. Two notes joined by a tie on adjacent
/// events sound as one.
pub fn schedule_playback(
    events: &[NotatedEvent],
    tempo_bpm: f64,
    channel: u8,
) -> Result<Vec<PlaybackMessage>, PlaybackError> {
    if events.is_empty() {
        return Err(PlaybackError::EmptyInput);
    }

    let tempo = if tempo_bpm.is_finite() && tempo_bpm > 0.0 {
        tempo_bpm
    } else {
        log::warn!("invalid tempo {tempo_bpm}, using {DEFAULT_TEMPO} BPM");
        DEFAULT_TEMPO
    };
    let secs_per_whole = 4.0 * 60.0 / tempo;
    let channel = channel & 0x0F;

    let spans = resolve_spans(events);
    let mut tied_in = vec![false; events.len()];
    let mut tied_on = vec![false; events.len()];
    for &(start, end) in &spans.ties {
        if end == start + 1 {
            tied_on[start] = true;
            tied_in[end] = true;
        }
    }

    let factors = velocity_factors(events, &spans.hairpins);

    let mut messages = Vec::with_capacity(events.len() * 2);
    let mut time = 0.0_f64;

    for (i, ev) in events.iter().enumerate() {
        let end = time + ev.duration().as_whole_notes() * secs_per_whole;

        if let Some(pitch) = ev.pitch() {
            let note = pitch.to_midi().clamp(0, 127) as u8;
            if !tied_in[i] {
                messages.push(PlaybackMessage {
                    time_secs: time,
                    kind: MessageKind::NoteOn,
                    channel,
                    note,
                    velocity: to_velocity(factors[i]),
                });
            }
            if !tied_on[i] {
                messages.push(PlaybackMessage {
                    time_secs: end,
                    kind: MessageKind::NoteOff,
                    channel,
                    note,
                    velocity: 0,
                });
            }
        }

        time = end;
    }

    messages.sort_by(|a, b| {
        a.time_secs
            .total_cmp(&b.time_secs)
            .then(a.kind.order().cmp(&b.kind.order()))
    });

    Ok(messages)
}

/// Serialize scheduled messages to JSON.
pub fn messages_to_json(messages: &[PlaybackMessage]) -> String {
    serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string())
}

fn to_velocity(factor: f64) -> u16 {
    (factor.clamp(0.0, 1.0) * u16::MAX as f64).round() as u16
}

/// Velocity factor of every event.
///
/// Marked dynamics carry forward. A hairpin runs from the level in effect
/// at its start to the dynamic marked on its end event, or one level
/// further in its direction when the end is unmarked.
fn velocity_factors(events: &[NotatedEvent], hairpins: &[(usize, usize, HairpinKind)]) -> Vec<f64> {
    let mut current: Option<Dynamic> = None;
    let levels: Vec<Option<Dynamic>> = events
        .iter()
        .map(|ev| {
            if ev.dynamic.is_some() {
                current = ev.dynamic;
            }
            current
        })
        .collect();

    let mut factors: Vec<f64> = levels
        .iter()
        .map(|level| level.map_or(Dynamic::UNSET_FACTOR, Dynamic::velocity_factor))
        .collect();

    for &(start, end, kind) in hairpins {
        let from = levels[start].unwrap_or(Dynamic::Mf);
        let to = events[end].dynamic.unwrap_or(match kind {
            HairpinKind::Crescendo => from.louder(),
            HairpinKind::Decrescendo => from.softer(),
        });

        let span = (end - start) as f64;
        for (k, factor) in factors.iter_mut().enumerate().take(end + 1).skip(start) {
            let t = (k - start) as f64 / span;
            let raw = from.velocity_factor() + (to.velocity_factor() - from.velocity_factor()) * t;
            *factor = Dynamic::nearest(raw).velocity_factor();
        }
    }

    factors
}
