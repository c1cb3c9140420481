//! Semantic edits over voices.
//!
//! Edits never touch their input: each returns a new [`Voice`]. Degenerate
//! ranges and out-of-bounds indices leave the copy unchanged, so an editor
//! can forward user gestures without validating them first.

use crate::layout::resolve_spans;
use crate::model::*;

/// Apply one patch operation, returning the edited copy.
pub fn apply_patch(voice: &Voice, op: &PatchOp) -> Voice {
    let mut next = voice.clone();
    let len = next.len();

    match *op {
        PatchOp::Slur { range: (start, end) } => {
            if start < end && end < len {
                next.events[start].slur_start = true;
                next.events[end].slur_end = true;
            } else {
                log::debug!("ignoring slur over {start}..={end} in a voice of {len} events");
            }
        }
        PatchOp::Hairpin { range: (start, end), kind } => {
            if start < end && end < len {
                next.events[start].hairpin_start = Some(kind);
                next.events[end].hairpin_end = true;
            } else {
                log::debug!("ignoring hairpin over {start}..={end} in a voice of {len} events");
            }
        }
        PatchOp::Articulation { index, kind } => match next.events.get_mut(index) {
            Some(ev) => {
                ev.add_articulation(kind);
            }
            None => log::debug!("ignoring articulation at {index} in a voice of {len} events"),
        },
        PatchOp::Dynamic { index, level } => match next.events.get_mut(index) {
            Some(ev) => ev.dynamic = Some(level),
            None => log::debug!("ignoring dynamic at {index} in a voice of {len} events"),
        },
    }

    next
}

/// Apply operations in order.
pub fn apply_patches<'a, I>(voice: &Voice, ops: I) -> Voice
where
    I: IntoIterator<Item = &'a PatchOp>,
{
    ops.into_iter()
        .fold(voice.clone(), |current, op| apply_patch(&current, op))
}

/// Operations present in `new` but not in `old`: new slur spans, new
/// hairpin spans, added articulations and changed dynamics, in that order.
/// Removals are not reported.
pub fn semantic_diff(old: &Voice, new: &Voice) -> Vec<PatchOp> {
    let old_spans = resolve_spans(&old.events);
    let new_spans = resolve_spans(&new.events);
    let mut ops = Vec::new();

    for &range in &new_spans.slurs {
        if !old_spans.slurs.contains(&range) {
            ops.push(PatchOp::Slur { range });
        }
    }

    for &(start, end, kind) in &new_spans.hairpins {
        if !old_spans.hairpins.contains(&(start, end, kind)) {
            ops.push(PatchOp::Hairpin { range: (start, end), kind });
        }
    }

    for (index, ev) in new.events.iter().enumerate() {
        let before = old.events.get(index);
        for &kind in &ev.articulations {
            if !before.is_some_and(|b| b.articulations.contains(&kind)) {
                ops.push(PatchOp::Articulation { index, kind });
            }
        }
    }

    for (index, ev) in new.events.iter().enumerate() {
        if let Some(level) = ev.dynamic {
            if old.events.get(index).and_then(|b| b.dynamic) != Some(level) {
                ops.push(PatchOp::Dynamic { index, level });
            }
        }
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> Voice {
        [Step::C, Step::D, Step::E, Step::F]
            .into_iter()
            .map(|step| NotatedEvent::note(Pitch::natural(step, 4), Duration::QUARTER))
            .collect()
    }

    #[test]
    fn slur_patch_sets_both_ends_and_leaves_input_alone() {
        let voice = scale();
        let edited = apply_patch(&voice, &PatchOp::Slur { range: (1, 3) });
        assert!(edited.events[1].slur_start);
        assert!(edited.events[3].slur_end);
        assert!(!voice.events[1].slur_start);
    }

    #[test]
    fn degenerate_and_out_of_bounds_patches_are_no_ops() {
        let voice = scale();
        let ops = [
            PatchOp::Slur { range: (2, 2) },
            PatchOp::Slur { range: (3, 1) },
            PatchOp::Hairpin { range: (0, 9), kind: HairpinKind::Crescendo },
            PatchOp::Articulation { index: 4, kind: Articulation::Accent },
            PatchOp::Dynamic { index: 100, level: Dynamic::F },
        ];
        assert_eq!(apply_patches(&voice, &ops), voice);
    }

    #[test]
    fn articulation_patch_is_idempotent() {
        let op = PatchOp::Articulation { index: 0, kind: Articulation::Tenuto };
        let once = apply_patch(&scale(), &op);
        let twice = apply_patch(&once, &op);
        assert_eq!(once, twice);
        assert_eq!(twice.events[0].articulations, vec![Articulation::Tenuto]);
    }

    #[test]
    fn diff_reports_each_applied_patch() {
        let voice = scale();
        let ops = vec![
            PatchOp::Slur { range: (0, 2) },
            PatchOp::Hairpin { range: (1, 3), kind: HairpinKind::Decrescendo },
            PatchOp::Articulation { index: 3, kind: Articulation::Fermata },
            PatchOp::Dynamic { index: 0, level: Dynamic::Mp },
        ];
        let edited = apply_patches(&voice, &ops);
        assert_eq!(semantic_diff(&voice, &edited), ops);
        assert!(semantic_diff(&edited, &edited).is_empty());
    }

    #[test]
    fn diff_reports_changed_dynamic_level() {
        let soft = apply_patch(&scale(), &PatchOp::Dynamic { index: 2, level: Dynamic::P });
        let loud = apply_patch(&soft, &PatchOp::Dynamic { index: 2, level: Dynamic::Ff });
        assert_eq!(
            semantic_diff(&soft, &loud),
            vec![PatchOp::Dynamic { index: 2, level: Dynamic::Ff }]
        );
    }
}
