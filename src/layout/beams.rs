//! Beam grouping.

use crate::model::{NotatedEvent, TimeSignature};
use super::constants::{BEAT_EPSILON, MIN_BEAMED_DENOMINATOR};
use super::tree::BeamGroup;

/// Partition events into beam groups.
///
/// A run collects consecutive notes of an eighth or shorter that start in
/// the same beat. Rests, longer notes and a new beat close the run; runs of
/// two or more become groups. Each adjacent pair is joined by as many beams
/// as the shorter flag count of the two allows.
pub(crate) fn find_beam_groups(events: &[NotatedEvent], time: &TimeSignature) -> Vec<BeamGroup> {
    let mut groups: Vec<BeamGroup> = Vec::new();
    let mut current_group: Vec<usize> = Vec::new();
    let mut current_beat: Option<i64> = None;
    let mut position = 0.0_f64;

    for (i, ev) in events.iter().enumerate() {
        let duration = ev.duration();
        let beat = (position + BEAT_EPSILON).floor() as i64;
        position += time.beat_weight(duration);

        let beamable = !ev.is_rest() && duration.den() >= MIN_BEAMED_DENOMINATOR;
        if !beamable {
            close_group(&mut current_group, events, &mut groups);
            current_beat = None;
            continue;
        }

        if current_beat != Some(beat) {
            close_group(&mut current_group, events, &mut groups);
        }
        current_group.push(i);
        current_beat = Some(beat);
    }
    close_group(&mut current_group, events, &mut groups);

    groups
}

fn close_group(run: &mut Vec<usize>, events: &[NotatedEvent], groups: &mut Vec<BeamGroup>) {
    if run.len() >= 2 {
        let levels = run
            .windows(2)
            .map(|pair| {
                let a = events[pair[0]].duration().flag_count();
                let b = events[pair[1]].duration().flag_count();
                a.min(b)
            })
            .collect();
        groups.push(BeamGroup { elements: run.clone(), levels });
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Duration, Pitch, Step};

    fn notes(durations: &[Duration]) -> Vec<NotatedEvent> {
        durations
            .iter()
            .map(|&d| NotatedEvent::note(Pitch::natural(Step::G, 4), d))
            .collect()
    }

    #[test]
    fn eighths_group_per_beat() {
        let events = notes(&[Duration::EIGHTH; 4]);
        let groups = find_beam_groups(&events, &TimeSignature::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].elements, vec![0, 1]);
        assert_eq!(groups[1].elements, vec![2, 3]);
        assert_eq!(groups[0].levels, vec![1]);
    }

    #[test]
    fn sixteenths_in_one_beat_share_a_group() {
        let events = notes(&[Duration::SIXTEENTH; 4]);
        let groups = find_beam_groups(&events, &TimeSignature::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].elements, vec![0, 1, 2, 3]);
        assert!(groups[0].levels.iter().all(|&l| l >= 2));
    }

    #[test]
    fn mixed_values_take_the_smaller_flag_count() {
        let events = notes(&[Duration::EIGHTH, Duration::SIXTEENTH, Duration::SIXTEENTH]);
        let groups = find_beam_groups(&events, &TimeSignature::default());
        assert_eq!(groups[0].elements, vec![0, 1, 2]);
        assert_eq!(groups[0].levels, vec![1, 2]);
    }

    #[test]
    fn rests_and_long_notes_break_runs() {
        let mut events = notes(&[Duration::SIXTEENTH, Duration::SIXTEENTH]);
        events.push(NotatedEvent::rest(Duration::SIXTEENTH));
        events.extend(notes(&[Duration::SIXTEENTH, Duration::QUARTER, Duration::EIGHTH]));
        let groups = find_beam_groups(&events, &TimeSignature::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].elements, vec![0, 1]);
    }

    #[test]
    fn single_short_note_is_not_a_group() {
        let events = notes(&[Duration::QUARTER, Duration::EIGHTH, Duration::QUARTER]);
        assert!(find_beam_groups(&events, &TimeSignature::default()).is_empty());
    }

    #[test]
    fn compound_meter_keeps_each_beat_unit_separate() {
        // In 6/8 every eighth is its own beat under the same-beat rule.
        let events = notes(&[Duration::EIGHTH; 6]);
        assert!(find_beam_groups(&events, &TimeSignature::new(6, 8)).is_empty());
    }
}
