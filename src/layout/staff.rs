//! Staff coordinates: pitch → vertical position, and the horizontal prefix
//! (clef, key and time signature) in front of the first event.

use crate::model::{Clef, LayoutOptions, Pitch, Rect};
use super::constants::*;

/// Device y of a notehead. Each diatonic step is half a staff space; higher
/// pitches move up (y grows downward).
pub fn staff_y(pitch: &Pitch, clef: Clef, origin_y: f64, staff_spacing: f64) -> f64 {
    let staff_steps = clef.top_line_diatonic() - pitch.diatonic_index();
    origin_y + staff_steps as f64 * (staff_spacing / 2.0)
}

/// Rests sit on the middle line.
pub fn rest_y(origin_y: f64, staff_spacing: f64) -> f64 {
    origin_y + 2.0 * staff_spacing
}

pub(super) fn key_signature_width(fifths: i32, staff_spacing: f64) -> f64 {
    let scale = staff_spacing / REFERENCE_STAFF_SPACING;
    match fifths {
        f if f > 0 => f as f64 * KEY_SIG_SHARP_SPACE * scale,
        f if f < 0 => f.unsigned_abs() as f64 * KEY_SIG_FLAT_SPACE * scale,
        _ => 0.0,
    }
}

/// y of the top staff line inside `rect`.
pub(super) fn staff_origin_y(rect: &Rect, options: &LayoutOptions) -> f64 {
    rect.y + options.padding + LEDGER_HEADROOM_SPACES * options.staff_spacing
}

/// y of the lowest point the staff itself needs, ledger headroom included.
pub(super) fn staff_floor_y(origin_y: f64, staff_spacing: f64) -> f64 {
    origin_y + (STAFF_SPACES + LEDGER_HEADROOM_SPACES) * staff_spacing
}

/// x of the first event: after padding, clef, key and time signature.
pub(super) fn content_start_x(rect: &Rect, options: &LayoutOptions) -> f64 {
    let scale = options.staff_spacing / REFERENCE_STAFF_SPACING;
    rect.x
        + options.padding
        + (CLEF_SPACE + TIME_SIG_SPACE) * scale
        + key_signature_width(options.key_fifths, options.staff_spacing)
}
