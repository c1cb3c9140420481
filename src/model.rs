//! Data model for notation events, edit operations and layout options.
//!
//! Everything here is a plain value: layout engines read these and never
//! mutate them, and edits produce new copies (see [`crate::transform`]).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ModelError};

// ═══════════════════════════════════════════════════════════════════════
// Pitch
// ═══════════════════════════════════════════════════════════════════════

/// Diatonic step letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Position within the octave, C = 0 through B = 6.
    pub fn index(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 1,
            Step::E => 2,
            Step::F => 3,
            Step::G => 4,
            Step::A => 5,
            Step::B => 6,
        }
    }

    /// Semitones above C of the natural step.
    pub fn semitone(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }
}

/// Pitch of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    /// Note name: A–G
    pub step: Step,
    /// Chromatic alteration in semitones: -1 = flat, 1 = sharp, ±2 = double
    pub alter: i32,
    /// Octave number (middle C = C4)
    pub octave: i32,
}

impl Pitch {
    pub fn new(step: Step, alter: i32, octave: i32) -> Self {
        Self { step, alter, octave }
    }

    /// Natural pitch (no alteration).
    pub fn natural(step: Step, octave: i32) -> Self {
        Self::new(step, 0, octave)
    }

    /// Diatonic index: octave·7 + step index. Basis for staff placement;
    /// the alteration does not move a notehead.
    pub fn diatonic_index(&self) -> i32 {
        self.octave * 7 + self.step.index()
    }

    /// Convert pitch to MIDI note number.
    /// Middle C (C4) = 60.
    pub fn to_midi(&self) -> i32 {
        (self.octave + 1) * 12 + self.step.semitone() + self.alter
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Duration
// ═══════════════════════════════════════════════════════════════════════

/// Rational fraction of a whole note. Both parts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDuration", into = "RawDuration")]
pub struct Duration {
    num: u32,
    den: u32,
}

#[derive(Serialize, Deserialize)]
struct RawDuration {
    num: u32,
    den: u32,
}

impl TryFrom<RawDuration> for Duration {
    type Error = ModelError;

    fn try_from(raw: RawDuration) -> Result<Self, Self::Error> {
        Duration::new(raw.num, raw.den)
    }
}

impl From<Duration> for RawDuration {
    fn from(d: Duration) -> Self {
        RawDuration { num: d.num, den: d.den }
    }
}

impl Duration {
    pub const WHOLE: Duration = Duration { num: 1, den: 1 };
    pub const HALF: Duration = Duration { num: 1, den: 2 };
    pub const QUARTER: Duration = Duration { num: 1, den: 4 };
    pub const EIGHTH: Duration = Duration { num: 1, den: 8 };
    pub const SIXTEENTH: Duration = Duration { num: 1, den: 16 };
    pub const THIRTY_SECOND: Duration = Duration { num: 1, den: 32 };

    pub fn new(num: u32, den: u32) -> Result<Self, ModelError> {
        if num == 0 || den == 0 {
            return Err(ModelError::InvalidDuration { num, den });
        }
        Ok(Self { num, den })
    }

    pub fn num(&self) -> u32 {
        self.num
    }

    pub fn den(&self) -> u32 {
        self.den
    }

    /// Dotted version of this duration (3/2 of its length).
    pub fn dotted(self) -> Self {
        Self {
            num: self.num.saturating_mul(3),
            den: self.den.saturating_mul(2),
        }
    }

    /// Length in whole notes.
    pub fn as_whole_notes(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Number of flags (or beams) the notated value carries:
    /// quarter and longer 0, eighth 1, 16th 2, 32nd 3.
    pub fn flag_count(&self) -> u8 {
        if self.den <= 4 {
            return 0;
        }
        let log2 = 31 - self.den.leading_zeros();
        (log2 as u8).saturating_sub(2)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Events and decorations
// ═══════════════════════════════════════════════════════════════════════

/// A note or a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Note { pitch: Pitch, duration: Duration },
    Rest { duration: Duration },
}

impl Event {
    pub fn duration(&self) -> Duration {
        match self {
            Event::Note { duration, .. } | Event::Rest { duration } => *duration,
        }
    }

    pub fn pitch(&self) -> Option<&Pitch> {
        match self {
            Event::Note { pitch, .. } => Some(pitch),
            Event::Rest { .. } => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Event::Rest { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Articulation {
    Staccato,
    Staccatissimo,
    Accent,
    Tenuto,
    Marcato,
    Fermata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HairpinKind {
    Crescendo,
    Decrescendo,
}

/// Named dynamic level, ordered from softest to loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dynamic {
    Pp,
    P,
    Mp,
    Mf,
    F,
    Ff,
}

impl Dynamic {
    pub const ALL: [Dynamic; 6] = [
        Dynamic::Pp,
        Dynamic::P,
        Dynamic::Mp,
        Dynamic::Mf,
        Dynamic::F,
        Dynamic::Ff,
    ];

    /// Velocity factor used when no dynamic has been marked yet.
    pub const UNSET_FACTOR: f64 = 0.70;

    /// Fraction of the maximum velocity for this level.
    pub fn velocity_factor(self) -> f64 {
        match self {
            Dynamic::Pp => 0.25,
            Dynamic::P => 0.40,
            Dynamic::Mp => 0.55,
            Dynamic::Mf => 0.70,
            Dynamic::F => 0.85,
            Dynamic::Ff => 1.00,
        }
    }

    /// Named level whose factor is closest to `factor`. Ties go to the softer level.
    pub fn nearest(factor: f64) -> Dynamic {
        let mut best = Dynamic::Pp;
        let mut best_dist = f64::MAX;
        for d in Dynamic::ALL {
            let dist = (d.velocity_factor() - factor).abs();
            if dist < best_dist - 1e-9 {
                best = d;
                best_dist = dist;
            }
        }
        best
    }

    pub fn louder(self) -> Dynamic {
        match self {
            Dynamic::Pp => Dynamic::P,
            Dynamic::P => Dynamic::Mp,
            Dynamic::Mp => Dynamic::Mf,
            Dynamic::Mf => Dynamic::F,
            Dynamic::F | Dynamic::Ff => Dynamic::Ff,
        }
    }

    pub fn softer(self) -> Dynamic {
        match self {
            Dynamic::Pp | Dynamic::P => Dynamic::Pp,
            Dynamic::Mp => Dynamic::P,
            Dynamic::Mf => Dynamic::Mp,
            Dynamic::F => Dynamic::Mf,
            Dynamic::Ff => Dynamic::F,
        }
    }
}

/// An event plus its notational decorations.
///
/// A start flag on event `i` and the nearest later end flag of the same
/// spanner kind on event `j > i` define a span `[i, j]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotatedEvent {
    pub event: Event,
    #[serde(default)]
    pub slur_start: bool,
    #[serde(default)]
    pub slur_end: bool,
    #[serde(default)]
    pub tie_start: bool,
    #[serde(default)]
    pub tie_end: bool,
    /// At most one entry per kind
    #[serde(default)]
    pub articulations: Vec<Articulation>,
    #[serde(default)]
    pub hairpin_start: Option<HairpinKind>,
    #[serde(default)]
    pub hairpin_end: bool,
    #[serde(default)]
    pub dynamic: Option<Dynamic>,
}

impl From<Event> for NotatedEvent {
    fn from(event: Event) -> Self {
        Self {
            event,
            slur_start: false,
            slur_end: false,
            tie_start: false,
            tie_end: false,
            articulations: Vec::new(),
            hairpin_start: None,
            hairpin_end: false,
            dynamic: None,
        }
    }
}

impl NotatedEvent {
    pub fn note(pitch: Pitch, duration: Duration) -> Self {
        Event::Note { pitch, duration }.into()
    }

    pub fn rest(duration: Duration) -> Self {
        Event::Rest { duration }.into()
    }

    pub fn pitch(&self) -> Option<&Pitch> {
        self.event.pitch()
    }

    pub fn duration(&self) -> Duration {
        self.event.duration()
    }

    pub fn is_rest(&self) -> bool {
        self.event.is_rest()
    }

    /// Add an articulation unless one of the same kind is already present.
    /// Returns whether the event changed.
    pub fn add_articulation(&mut self, kind: Articulation) -> bool {
        if self.articulations.contains(&kind) {
            return false;
        }
        self.articulations.push(kind);
        true
    }

    pub fn with_slur_start(mut self) -> Self {
        self.slur_start = true;
        self
    }

    pub fn with_slur_end(mut self) -> Self {
        self.slur_end = true;
        self
    }

    pub fn with_tie_start(mut self) -> Self {
        self.tie_start = true;
        self
    }

    pub fn with_tie_end(mut self) -> Self {
        self.tie_end = true;
        self
    }

    pub fn with_hairpin_start(mut self, kind: HairpinKind) -> Self {
        self.hairpin_start = Some(kind);
        self
    }

    pub fn with_hairpin_end(mut self) -> Self {
        self.hairpin_end = true;
        self
    }

    pub fn with_articulation(mut self, kind: Articulation) -> Self {
        self.add_articulation(kind);
        self
    }

    pub fn with_dynamic(mut self, level: Dynamic) -> Self {
        self.dynamic = Some(level);
        self
    }
}

/// One voice: an ordered sequence of decorated events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Voice {
    pub events: Vec<NotatedEvent>,
}

impl From<Vec<NotatedEvent>> for Voice {
    fn from(events: Vec<NotatedEvent>) -> Self {
        Self { events }
    }
}

impl FromIterator<NotatedEvent> for Voice {
    fn from_iter<I: IntoIterator<Item = NotatedEvent>>(iter: I) -> Self {
        Self { events: iter.into_iter().collect() }
    }
}

impl Voice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NotatedEvent> {
        self.events.iter()
    }
}

/// Unit of semantic edit reporting. Ranges are inclusive `(start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Slur { range: (usize, usize) },
    Hairpin { range: (usize, usize), kind: HairpinKind },
    Articulation { index: usize, kind: Articulation },
    Dynamic { index: usize, level: Dynamic },
}

// ═══════════════════════════════════════════════════════════════════════
// Staff context
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
    Tenor,
}

impl Clef {
    /// Diatonic index of the pitch sitting on the top staff line.
    pub fn top_line_diatonic(self) -> i32 {
        match self {
            Clef::Treble => 5 * 7 + 3, // F5
            Clef::Bass => 3 * 7 + 5,   // A3
            Clef::Alto => 4 * 7 + 4,   // G4
            Clef::Tenor => 4 * 7 + 2,  // E4
        }
    }
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats_per_bar: u32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_unit: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats_per_bar: 4, beat_unit: 4 }
    }
}

impl TimeSignature {
    pub fn new(beats_per_bar: u32, beat_unit: u32) -> Self {
        Self { beats_per_bar, beat_unit }
    }

    /// Beats an event occupies: `beat_unit / max(1, den)`. Notes and rests
    /// weigh the same; the numerator is not consulted.
    pub fn beat_weight(&self, duration: Duration) -> f64 {
        self.beat_unit as f64 / duration.den().max(1) as f64
    }

    /// Beats per bar, never zero.
    pub fn bar_beats(&self) -> f64 {
        self.beats_per_bar.max(1) as f64
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Geometry (device space, y grows downward)
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rect of the given size centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Grow by `amount` on every side.
    pub fn expanded(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Layout options
// ═══════════════════════════════════════════════════════════════════════

/// Options for every layout call. Passed explicitly; engines hold no state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Distance between staff lines
    pub staff_spacing: f64,
    /// Nominal horizontal advance per event (scaled by duration)
    pub note_advance: f64,
    pub clef: Clef,
    /// Number of sharps (positive) or flats (negative)
    pub key_fifths: i32,
    pub time_signature: TimeSignature,
    pub padding: f64,
    /// Event indices that get a bar line in front of them regardless of meter
    pub forced_bars: BTreeSet<usize>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            staff_spacing: 10.0,
            note_advance: 24.0,
            clef: Clef::Treble,
            key_fifths: 0,
            time_signature: TimeSignature::default(),
            padding: 16.0,
            forced_bars: BTreeSet::new(),
        }
    }
}

impl LayoutOptions {
    /// Load options from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_clef(mut self, clef: Clef) -> Self {
        self.clef = clef;
        self
    }

    pub fn with_time_signature(mut self, beats_per_bar: u32, beat_unit: u32) -> Self {
        self.time_signature = TimeSignature::new(beats_per_bar, beat_unit);
        self
    }

    pub fn with_forced_bar(mut self, index: usize) -> Self {
        self.forced_bars.insert(index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_rejects_zero_parts() {
        assert_eq!(
            Duration::new(0, 4),
            Err(ModelError::InvalidDuration { num: 0, den: 4 })
        );
        assert!(Duration::new(1, 0).is_err());
        assert_eq!(Duration::new(1, 8).unwrap(), Duration::EIGHTH);
    }

    #[test]
    fn duration_deserialization_checks_invariant() {
        let ok: Duration = serde_json::from_str(r#"{"num":3,"den":8}"#).unwrap();
        assert_eq!(ok, Duration::QUARTER.dotted());
        assert_eq!((ok.num(), ok.den()), (3, 8));
        assert!(serde_json::from_str::<Duration>(r#"{"num":1,"den":0}"#).is_err());
    }

    #[test]
    fn flag_counts() {
        assert_eq!(Duration::WHOLE.flag_count(), 0);
        assert_eq!(Duration::HALF.flag_count(), 0);
        assert_eq!(Duration::QUARTER.flag_count(), 0);
        assert_eq!(Duration::EIGHTH.flag_count(), 1);
        assert_eq!(Duration::SIXTEENTH.flag_count(), 2);
        assert_eq!(Duration::THIRTY_SECOND.flag_count(), 3);
        // Triplet eighths share the eighth's flag
        assert_eq!(Duration::new(1, 12).unwrap().flag_count(), 1);
    }

    #[test]
    fn pitch_equality_covers_alteration() {
        let c = Pitch::natural(Step::C, 4);
        let c_sharp = Pitch::new(Step::C, 1, 4);
        assert_ne!(c, c_sharp);
        assert_eq!(c.diatonic_index(), c_sharp.diatonic_index());
        assert_eq!(c.to_midi(), 60);
        assert_eq!(Pitch::new(Step::B, -2, 3).to_midi(), 57);
    }

    #[test]
    fn articulations_are_unique_per_kind() {
        let mut ev = NotatedEvent::note(Pitch::natural(Step::E, 4), Duration::QUARTER);
        assert!(ev.add_articulation(Articulation::Staccato));
        assert!(!ev.add_articulation(Articulation::Staccato));
        assert!(ev.add_articulation(Articulation::Accent));
        assert_eq!(ev.articulations, vec![Articulation::Staccato, Articulation::Accent]);
    }

    #[test]
    fn voice_builds_from_events() {
        let empty = Voice::new();
        assert!(empty.is_empty());
        assert_eq!(empty, Voice::default());

        let voice: Voice = [Step::C, Step::E]
            .into_iter()
            .map(|step| NotatedEvent::note(Pitch::natural(step, 4), Duration::HALF))
            .collect();
        assert_eq!(voice.len(), 2);
        assert_eq!(serde_json::to_value(&voice).unwrap().as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn dynamic_nearest_snaps_to_named_level() {
        assert_eq!(Dynamic::nearest(0.41), Dynamic::P);
        assert_eq!(Dynamic::nearest(0.62), Dynamic::Mp);
        assert_eq!(Dynamic::nearest(0.70), Dynamic::Mf);
        assert_eq!(Dynamic::nearest(2.0), Dynamic::Ff);
        assert_eq!(Dynamic::nearest(0.0), Dynamic::Pp);
    }

    #[test]
    fn options_from_partial_json_keep_defaults() {
        let opts = LayoutOptions::from_json(
            r#"{"clef":"bass","time_signature":{"beats_per_bar":3,"beat_unit":4}}"#,
        )
        .unwrap();
        assert_eq!(opts.clef, Clef::Bass);
        assert_eq!(opts.time_signature, TimeSignature::new(3, 4));
        assert_eq!(opts.staff_spacing, 10.0);
        assert!(opts.forced_bars.is_empty());

        assert!(LayoutOptions::from_json("{not json").is_err());
    }

    #[test]
    fn zero_meter_never_yields_zero_bar() {
        assert_eq!(TimeSignature::new(0, 4).bar_beats(), 1.0);
        assert_eq!(TimeSignature::new(6, 8).beat_weight(Duration::EIGHTH), 1.0);
        assert_eq!(TimeSignature::default().beat_weight(Duration::EIGHTH), 0.5);
    }
}
