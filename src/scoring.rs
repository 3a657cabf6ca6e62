// 🎯 Scoring Engine - weighted distance between a guess and the real baby
//
// score = |Δlength| / 1.0 + |Δweight| / 50.0 + |Δdays| / 1.0 + gender penalty
// Lower is better. Records that do not parse score +∞ and never win.

use crate::entry::{days_between, ActualOutcome, Guess, GuessRecord};
use crate::error::{Result, TombolaError};
use crate::store::EntryStore;
use tracing::{debug, warn};

/// Centimeters worth one point
pub const LENGTH_SCALE: f64 = 1.0;
/// Grams worth one point
pub const WEIGHT_SCALE: f64 = 50.0;
/// Days worth one point
pub const DATE_SCALE: f64 = 1.0;
/// Added when the gender token differs
pub const GENDER_PENALTY: f64 = 10.0;

pub fn score(guess: &Guess, actual: &ActualOutcome) -> f64 {
    let length_diff = (guess.length - actual.length).abs() / LENGTH_SCALE;
    let weight_diff = (guess.weight - actual.weight).abs() / WEIGHT_SCALE;
    let date_diff = days_between(guess.date_of_birth, actual.date_of_birth).abs() as f64 / DATE_SCALE;
    let gender_penalty = if guess.gender == actual.gender {
        0.0
    } else {
        GENDER_PENALTY
    };

    length_diff + weight_diff + date_diff + gender_penalty
}

/// Score a stored record; malformed records are infinitely far away
pub fn score_record(record: &GuessRecord, actual: &ActualOutcome) -> f64 {
    match record.parse() {
        Ok(guess) => score(&guess, actual),
        Err(e) => {
            warn!(name = %record.name, error = %e, "stored entry cannot be scored");
            f64::INFINITY
        }
    }
}

// ============================================================================
// STANDINGS
// ============================================================================

/// Every stored entry with its score, plus the winner's position
#[derive(Debug, Clone)]
pub struct Standings {
    pub entries: Vec<GuessRecord>,
    pub scores: Vec<f64>,
    pub winner: Option<usize>,
}

impl Standings {
    pub fn compute(entries: Vec<GuessRecord>, actual: &ActualOutcome) -> Self {
        let scores: Vec<f64> = entries.iter().map(|e| score_record(e, actual)).collect();

        // Strict `<` keeps the earliest entry on ties
        let mut winner: Option<usize> = None;
        for (index, value) in scores.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            match winner {
                Some(best) if scores[best] <= *value => {}
                _ => winner = Some(index),
            }
        }

        Self {
            entries,
            scores,
            winner,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn winner_entry(&self) -> Option<&GuessRecord> {
        self.winner.map(|i| &self.entries[i])
    }

    pub fn winner_score(&self) -> Option<f64> {
        self.winner.map(|i| self.scores[i])
    }

    /// The winning entry and its score, or why there is none
    pub fn require_winner(&self) -> Result<(&GuessRecord, f64)> {
        match self.winner {
            Some(i) => Ok((&self.entries[i], self.scores[i])),
            None if self.entries.is_empty() => Err(TombolaError::NoEntries),
            None => Err(TombolaError::NoValidWinner),
        }
    }

    /// (position in store, entry, score) by ascending score, file order on ties
    pub fn ranked(&self) -> Vec<(usize, &GuessRecord, f64)> {
        let mut ranked: Vec<(usize, &GuessRecord, f64)> = self
            .entries
            .iter()
            .zip(self.scores.iter().copied())
            .enumerate()
            .map(|(i, (entry, value))| (i, entry, value))
            .collect();
        ranked.sort_by(|a, b| a.2.total_cmp(&b.2));
        ranked
    }
}

/// Read every entry and pick the closest guess to the actual outcome
pub fn select_winner(store: &dyn EntryStore, actual: &ActualOutcome) -> Result<Standings> {
    let entries = store.read_all()?;
    let standings = Standings::compute(entries, actual);

    debug!(
        entries = standings.entries.len(),
        winner = ?standings.winner_entry().map(|e| e.name.as_str()),
        "standings computed"
    );

    Ok(standings)
}
