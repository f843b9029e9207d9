//! Question generation for the three phases of a quiz.
//!
//! All generators take the shuffled event pool of a [`QuizData`](crate::QuizData)
//! and a random source supplied by the caller.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::quiz::QuizEvent;

/// Amount of multiple-choice questions in phase 1
pub const P1_QUESTIONS: usize = 3;
/// Amount of choices per question of phase 1
pub const P1_CHOICES: usize = 3;
/// Highest possible difference between the correct year and a distractor
pub const P1_MAX_DISTANCE: i32 = 10;
/// Amount of free-entry questions in phase 2
pub const P2_QUESTIONS: usize = 4;

/// Name of the form field holding the answer to the question at `index`
pub fn form_id(index: usize) -> String {
    format!("q{index}")
}

/// Multiple-choice question of phase 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceQuestion {
    pub form_id: String,
    pub event_title: String,
    /// The correct year and two distractors, in random order
    pub choices: [i32; P1_CHOICES],
}

/// Free-entry question of phase 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryQuestion {
    pub form_id: String,
    pub event_title: String,
}

/// One event to be matched with a year in phase 3
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchItem {
    pub form_id: String,
    pub event_title: String,
}

/// Matching exercise of phase 3.
///
/// `items[i]` is answered through the form field `q{i}` with one of `years`.
/// Items keep the order of the (already shuffled) pool while the years are
/// shuffled separately, so the expected answer for `q{i}` is the year of the
/// pool's `i`-th event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingQuestion {
    pub items: Vec<MatchItem>,
    pub years: Vec<i32>,
}

/// Generate the multiple-choice questions for the first [`P1_QUESTIONS`] events.
pub fn phase1_questions<R: Rng>(events: &[QuizEvent], rng: &mut R) -> Vec<ChoiceQuestion> {
    events
        .iter()
        .take(P1_QUESTIONS)
        .enumerate()
        .map(|(index, event)| ChoiceQuestion {
            form_id: form_id(index),
            event_title: event.title.clone(),
            choices: choices_for(event.year, rng),
        })
        .collect()
}

/// Mix `year` with distinct random years at most [`P1_MAX_DISTANCE`] away.
pub fn choices_for<R: Rng>(year: i32, rng: &mut R) -> [i32; P1_CHOICES] {
    let mut choices = [year; P1_CHOICES];
    let mut filled = 1;

    // The window holds 20 other years, so rejection terminates quickly
    while filled < P1_CHOICES {
        let candidate = rng.gen_range(year - P1_MAX_DISTANCE..=year + P1_MAX_DISTANCE);
        if !choices[..filled].contains(&candidate) {
            choices[filled] = candidate;
            filled += 1;
        }
    }

    choices.shuffle(rng);
    choices
}

/// Questions for events 3-6 of the pool; only the titles are exposed.
pub fn phase2_questions(events: &[QuizEvent]) -> Vec<EntryQuestion> {
    events
        .iter()
        .skip(P1_QUESTIONS)
        .take(P2_QUESTIONS)
        .enumerate()
        .map(|(index, event)| EntryQuestion {
            form_id: form_id(index),
            event_title: event.title.clone(),
        })
        .collect()
}

/// Matching exercise over the whole pool
pub fn phase3_question<R: Rng>(events: &[QuizEvent], rng: &mut R) -> MatchingQuestion {
    let items = events
        .iter()
        .enumerate()
        .map(|(index, event)| MatchItem {
            form_id: form_id(index),
            event_title: event.title.clone(),
        })
        .collect();

    let mut years: Vec<i32> = events.iter().map(|event| event.year).collect();
    years.shuffle(rng);

    MatchingQuestion { items, years }
}

/// Shuffle an event pool in place with the given random source
pub fn shuffle_pool<T, R: Rng + ?Sized>(pool: &mut [T], rng: &mut R) {
    pool.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::tests::pool;
    use rand::{SeedableRng, rngs::StdRng};

    fn events_with_years(years: &[i32]) -> Vec<QuizEvent> {
        years
            .iter()
            .enumerate()
            .map(|(i, &year)| QuizEvent {
                id: i as i64,
                title: format!("Event in {year}"),
                year,
            })
            .collect()
    }

    #[test]
    fn test_choices_are_distinct_and_contain_year() {
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            for year in [1, 476, 1789, 1945, 2020] {
                let choices = choices_for(year, &mut rng);

                assert!(choices.contains(&year), "seed {seed}: {choices:?}");
                assert_ne!(choices[0], choices[1], "seed {seed}: {choices:?}");
                assert_ne!(choices[0], choices[2], "seed {seed}: {choices:?}");
                assert_ne!(choices[1], choices[2], "seed {seed}: {choices:?}");
            }
        }
    }

    #[test]
    fn test_distractors_stay_within_range() {
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let choices = choices_for(1848, &mut rng);
            for choice in choices {
                assert!(
                    (1848 - P1_MAX_DISTANCE..=1848 + P1_MAX_DISTANCE).contains(&choice),
                    "seed {seed}: {choice} out of range"
                );
            }
        }
    }

    #[test]
    fn test_correct_year_is_not_always_first() {
        let mut rng = StdRng::seed_from_u64(7);
        let positions: Vec<usize> = (0..100)
            .map(|_| {
                let choices = choices_for(1500, &mut rng);
                choices.iter().position(|&c| c == 1500).unwrap()
            })
            .collect();

        for slot in 0..P1_CHOICES {
            assert!(positions.contains(&slot), "year never placed at {slot}");
        }
    }

    #[test]
    fn test_phase1_questions_for_known_years() {
        let events = events_with_years(&[1945, 1960, 1981]);
        let mut rng = StdRng::seed_from_u64(42);

        let questions = phase1_questions(&events, &mut rng);

        assert_eq!(questions.len(), 3);
        for (index, (question, event)) in questions.iter().zip(&events).enumerate() {
            assert_eq!(question.form_id, format!("q{index}"));
            assert_eq!(question.event_title, event.title);
            assert!(question.choices.contains(&event.year));
            for choice in question.choices {
                assert!((choice - event.year).abs() <= P1_MAX_DISTANCE);
            }
            let mut sorted = question.choices;
            sorted.sort_unstable();
            assert!(sorted.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn test_phase2_questions_use_events_three_to_six() {
        let events = pool(10);
        let questions = phase2_questions(&events);

        assert_eq!(questions.len(), P2_QUESTIONS);
        assert_eq!(questions[0].event_title, events[3].title);
        assert_eq!(questions[3].event_title, events[6].title);
        assert_eq!(questions[0].form_id, "q0");
    }

    #[test]
    fn test_phase3_question_covers_whole_pool() {
        let events = pool(9);
        let mut rng = StdRng::seed_from_u64(3);

        let question = phase3_question(&events, &mut rng);

        assert_eq!(question.items.len(), 9);
        assert_eq!(question.items[4].event_title, events[4].title);

        let mut years = question.years.clone();
        years.sort_unstable();
        let mut expected: Vec<i32> = events.iter().map(|e| e.year).collect();
        expected.sort_unstable();
        assert_eq!(years, expected);
    }

    #[test]
    fn test_shuffle_pool_is_deterministic_per_seed() {
        let mut a = pool(12);
        let mut b = pool(12);
        shuffle_pool(&mut a, &mut StdRng::seed_from_u64(99));
        shuffle_pool(&mut b, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_pool_keeps_every_event() {
        let mut shuffled = pool(12);
        shuffle_pool(&mut shuffled, &mut StdRng::seed_from_u64(5));

        let mut ids: Vec<i64> = shuffled.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        let expected: Vec<i64> = pool(12).iter().map(|e| e.id).collect();
        assert_eq!(ids, expected);
    }
}
