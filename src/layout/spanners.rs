//! Spanner pairing (slurs, ties, hairpins) and event-attached marks.

use std::collections::BTreeMap;

use crate::model::*;
use super::tree::SpanSet;

/// Pair spanner start and end flags in one left-to-right scan.
///
/// Each spanner kind keeps the starts still waiting for an end. Ends are
/// handled before starts on the same event, so an event never closes its
/// own span and can end one slur while starting the next. Every waiting
/// start pairs with the nearest later end. A tie also needs the same pitch
/// at both ends; a start whose nearest end does not match is dropped.
/// Unmatched starts and ends produce nothing.
pub fn resolve_spans(events: &[NotatedEvent]) -> SpanSet {
    let mut spans = SpanSet::default();
    let mut open_slurs: Vec<usize> = Vec::new();
    let mut open_ties: Vec<usize> = Vec::new();
    let mut open_hairpins: Vec<(usize, HairpinKind)> = Vec::new();

    for (i, ev) in events.iter().enumerate() {
        if ev.slur_end {
            spans.slurs.extend(open_slurs.drain(..).map(|start| (start, i)));
        }
        if ev.tie_end {
            for start in open_ties.drain(..) {
                match (events[start].pitch(), ev.pitch()) {
                    (Some(a), Some(b)) if a == b => spans.ties.push((start, i)),
                    _ => log::debug!("dropping tie {start}→{i}: pitches differ"),
                }
            }
        }
        if ev.hairpin_end {
            spans
                .hairpins
                .extend(open_hairpins.drain(..).map(|(start, kind)| (start, i, kind)));
        }

        if ev.slur_start {
            open_slurs.push(i);
        }
        if ev.tie_start {
            open_ties.push(i);
        }
        if let Some(kind) = ev.hairpin_start {
            open_hairpins.push((i, kind));
        }
    }

    let unmatched = open_slurs.len() + open_ties.len() + open_hairpins.len();
    if unmatched > 0 {
        log::debug!("{unmatched} spanner start(s) without a matching end");
    }

    spans
}

/// Articulations and dynamics keyed by event index. Events without marks
/// are absent; duplicate articulation kinds collapse to the first.
pub(crate) fn resolve_marks(
    events: &[NotatedEvent],
) -> (BTreeMap<usize, Vec<Articulation>>, BTreeMap<usize, Dynamic>) {
    let mut articulations = BTreeMap::new();
    let mut dynamics = BTreeMap::new();

    for (i, ev) in events.iter().enumerate() {
        if !ev.articulations.is_empty() {
            let mut kinds: Vec<Articulation> = Vec::with_capacity(ev.articulations.len());
            for &kind in &ev.articulations {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            articulations.insert(i, kinds);
        }
        if let Some(level) = ev.dynamic {
            dynamics.insert(i, level);
        }
    }

    (articulations, dynamics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c4() -> NotatedEvent {
        NotatedEvent::note(Pitch::natural(Step::C, 4), Duration::QUARTER)
    }

    fn d4() -> NotatedEvent {
        NotatedEvent::note(Pitch::natural(Step::D, 4), Duration::QUARTER)
    }

    #[test]
    fn slur_pairs_with_first_later_end() {
        let events = vec![
            c4().with_slur_start(),
            d4(),
            c4().with_slur_end(),
            d4().with_slur_end(),
        ];
        assert_eq!(resolve_spans(&events).slurs, vec![(0, 2)]);
    }

    #[test]
    fn unmatched_start_and_stray_end_are_dropped() {
        let events = vec![c4().with_slur_end(), d4(), c4().with_slur_start()];
        assert!(resolve_spans(&events).is_empty());
    }

    #[test]
    fn event_never_closes_its_own_slur() {
        let events = vec![c4().with_slur_start().with_slur_end(), d4().with_slur_end()];
        assert_eq!(resolve_spans(&events).slurs, vec![(0, 1)]);
    }

    #[test]
    fn chained_slurs_share_an_event() {
        let events = vec![
            c4().with_slur_start(),
            d4().with_slur_end().with_slur_start(),
            c4().with_slur_end(),
        ];
        assert_eq!(resolve_spans(&events).slurs, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn waiting_starts_all_close_on_nearest_end() {
        let events = vec![c4().with_slur_start(), d4().with_slur_start(), c4().with_slur_end()];
        assert_eq!(resolve_spans(&events).slurs, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn tie_requires_identical_pitch() {
        let tied = vec![c4().with_tie_start(), c4().with_tie_end()];
        assert_eq!(resolve_spans(&tied).ties, vec![(0, 1)]);

        let mismatched = vec![c4().with_tie_start(), d4().with_tie_end()];
        assert!(resolve_spans(&mismatched).ties.is_empty());

        let sharp = NotatedEvent::note(Pitch::new(Step::C, 1, 4), Duration::QUARTER);
        let alteration = vec![c4().with_tie_start(), sharp.with_tie_end()];
        assert!(resolve_spans(&alteration).ties.is_empty());

        let to_rest = vec![c4().with_tie_start(), NotatedEvent::rest(Duration::QUARTER).with_tie_end()];
        assert!(resolve_spans(&to_rest).ties.is_empty());
    }

    #[test]
    fn mismatched_tie_consumes_its_start() {
        let events = vec![c4().with_tie_start(), d4().with_tie_end(), c4().with_tie_end()];
        assert!(resolve_spans(&events).ties.is_empty());
    }

    #[test]
    fn hairpins_keep_kind_and_ignore_pitch() {
        let events = vec![
            c4().with_hairpin_start(HairpinKind::Decrescendo),
            NotatedEvent::rest(Duration::QUARTER),
            d4().with_hairpin_end(),
        ];
        assert_eq!(
            resolve_spans(&events).hairpins,
            vec![(0, 2, HairpinKind::Decrescendo)]
        );
    }

    #[test]
    fn marks_collapse_duplicate_articulations() {
        let mut accented = c4();
        accented.articulations = vec![Articulation::Accent, Articulation::Accent, Articulation::Tenuto];
        let events = vec![d4(), accented, c4().with_dynamic(Dynamic::Ff)];
        let (articulations, dynamics) = resolve_marks(&events);
        assert_eq!(articulations.len(), 1);
        assert_eq!(articulations[&1], vec![Articulation::Accent, Articulation::Tenuto]);
        assert_eq!(dynamics.get(&2), Some(&Dynamic::Ff));
    }
}
