// src/scoring.rs

use std::collections::HashSet;

/// Partial-credit score table for one tier, keyed by
/// `(correct_checked, incorrect_checked)`.
type Tier = &'static [((usize, usize), f64)];

/// Score tables indexed by the number of correct answers a question has.
/// A question with a correct-answer count outside these tiers is scored
/// with the strict all-or-nothing rule.
const SCORING_TABLES: [(usize, Tier); 5] = [
    (1, &[((1, 0), 1.0), ((1, 1), 0.5), ((1, 2), 0.0)]),
    (
        2,
        &[
            ((2, 0), 1.0),
            ((2, 1), 0.66),
            ((2, 2), 0.5),
            ((2, 3), 0.4),
            ((1, 0), 0.5),
            ((1, 1), 0.25),
            ((1, 2), 0.0),
        ],
    ),
    (
        3,
        &[
            ((3, 0), 1.0),
            ((3, 1), 0.66),
            ((3, 2), 0.33),
            ((2, 0), 0.66),
            ((2, 1), 0.33),
            ((2, 2), 0.0),
            ((1, 0), 0.33),
            ((1, 1), 0.0),
        ],
    ),
    (
        4,
        &[
            ((4, 0), 1.0),
            ((4, 1), 0.75),
            ((3, 0), 0.75),
            ((3, 1), 0.5),
            ((2, 0), 0.5),
            ((2, 1), 0.25),
            ((1, 0), 0.2),
            ((1, 1), 0.0),
        ],
    ),
    (
        5,
        &[
            ((5, 0), 1.0),
            ((4, 0), 0.8),
            ((3, 0), 0.6),
            ((2, 0), 0.4),
            ((1, 0), 0.2),
            ((0, 0), 0.0),
        ],
    ),
];

/// How a user's selection lines up against one question's answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub total_correct: usize,
    pub correct_checked: usize,
    pub incorrect_checked: usize,
}

impl Tally {
    /// Counts the selected ids falling in each partition.
    /// Ids belonging to neither partition are ignored.
    pub fn new(correct: &HashSet<i64>, incorrect: &HashSet<i64>, selected: &HashSet<i64>) -> Self {
        Self {
            total_correct: correct.len(),
            correct_checked: selected.intersection(correct).count(),
            incorrect_checked: selected.intersection(incorrect).count(),
        }
    }

    /// Resolves the tally to a score in `[0.0, 1.0]`.
    pub fn score(&self) -> f64 {
        let Some(table) = tier(self.total_correct) else {
            return strict_score(self);
        };

        let key = (self.correct_checked, self.incorrect_checked);
        if let Some(&(_, score)) = table.iter().find(|(k, _)| *k == key) {
            return score;
        }

        excess_incorrect_rule(self).unwrap_or(0.0)
    }
}

fn tier(total_correct: usize) -> Option<Tier> {
    SCORING_TABLES
        .iter()
        .find(|(n, _)| *n == total_correct)
        .map(|&(_, table)| table)
}

/// All-or-nothing rule for questions outside the tabulated tiers
/// (no correct answer at all, or more than five).
fn strict_score(t: &Tally) -> f64 {
    if t.correct_checked == t.total_correct && t.incorrect_checked == 0 {
        1.0
    } else {
        0.0
    }
}

/// "N or more incorrect" catch-alls for pairs missing from a tier.
/// Only the five-correct tier changes the outcome versus the 0.0 default,
/// the others are kept so every documented case has an explicit rule.
fn excess_incorrect_rule(t: &Tally) -> Option<f64> {
    let (cc, ic) = (t.correct_checked, t.incorrect_checked);
    match t.total_correct {
        1 | 2 if cc == 1 && ic >= 2 => Some(0.0),
        3 if cc == 2 && ic >= 2 => Some(0.0),
        3 if cc == 1 && ic >= 1 => Some(0.0),
        5 if ic > 0 => Some(0.0),
        _ => None,
    }
}

/// Scores one question.
///
/// `correct` and `incorrect` partition the question's answer ids;
/// `selected` is whatever the user checked. Pure and total: every input
/// resolves to a value in `[0.0, 1.0]`.
pub fn score(correct: &HashSet<i64>, incorrect: &HashSet<i64>, selected: &HashSet<i64>) -> f64 {
    Tally::new(correct, incorrect, selected).score()
}

/// Mean of per-question scores, as a percentage. A quiz without questions
/// scores 0.
pub fn overall_percentage(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64 * 100.0
}
