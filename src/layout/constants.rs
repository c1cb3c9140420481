//! Shared constants for the layout engines (device units at a 10-unit staff space).

// ── Staff dimensions ────────────────────────────────────────────────
pub(super) const REFERENCE_STAFF_SPACING: f64 = 10.0; // spacing the prefix widths below are tuned for
pub(super) const STAFF_SPACES: f64 = 4.0; // 5 lines, 4 spaces
pub(super) const LEDGER_HEADROOM_SPACES: f64 = 2.0; // room above and below the staff

// ── Prefix widths ───────────────────────────────────────────────────
pub(super) const CLEF_SPACE: f64 = 32.0;
pub(super) const KEY_SIG_SHARP_SPACE: f64 = 10.0;
pub(super) const KEY_SIG_FLAT_SPACE: f64 = 8.0;
pub(super) const TIME_SIG_SPACE: f64 = 24.0;

// ── Element frames ──────────────────────────────────────────────────
pub(super) const NOTE_FRAME: f64 = 10.0;
pub(super) const REST_FRAME: f64 = 8.0;

// ── Multi-voice head offsets ────────────────────────────────────────
pub(super) const SPLIT_OFFSET: f64 = 4.0; // unisons and seconds: voice 0 left, voice 1 right
pub(super) const LOWER_VOICE_OFFSET: f64 = 9.0;
pub(super) const SECOND_TOLERANCE: f64 = 0.75;

// ── Beat accounting ─────────────────────────────────────────────────
pub(super) const BEAT_EPSILON: f64 = 1e-9;
pub(super) const MIN_BEAMED_DENOMINATOR: u32 = 8;
