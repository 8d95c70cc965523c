//! Sorted Set Module
//!
//! Score-ordered member collection backing `recent:`, `viewed:`, `schedule:` and `delay:`.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

// == Score ==
/// Totally ordered wrapper so scores can live in a BTreeSet.
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// == Sorted Set ==
/// Members ordered ascending by (score, member).
#[derive(Debug, Clone, Default)]
pub struct SortedSet {
    /// Member -> score lookup
    scores: HashMap<String, f64>,
    /// Rank order
    order: BTreeSet<(Score, String)>,
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Adds or re-scores a member. Returns true if the member is new.
    pub fn insert(&mut self, member: &str, score: f64) -> bool {
        let previous = self.scores.insert(member.to_string(), score);
        if let Some(old) = previous {
            self.order.remove(&(Score(old), member.to_string()));
        }
        self.order.insert((Score(score), member.to_string()));
        previous.is_none()
    }

    // == Increment ==
    /// Adds `delta` to a member's score, starting from zero. Returns the new score.
    pub fn increment(&mut self, member: &str, delta: f64) -> f64 {
        let score = self.scores.get(member).copied().unwrap_or(0.0) + delta;
        self.insert(member, score);
        score
    }

    // == Remove ==
    pub fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                self.order.remove(&(Score(score), member.to_string()));
                true
            }
            None => false,
        }
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    // == Rank ==
    /// Zero-based ascending position of a member.
    pub fn rank(&self, member: &str) -> Option<usize> {
        let score = self.score(member)?;
        Some(self.order.range(..(Score(score), member.to_string())).count())
    }

    // == Range By Rank ==
    /// Members in `start..=stop`; negative indices count from the end.
    pub fn range_by_rank(&self, start: isize, stop: isize) -> Vec<(String, f64)> {
        match normalize_range(start, stop, self.len()) {
            Some((from, to)) => self
                .order
                .iter()
                .skip(from)
                .take(to - from + 1)
                .map(|(score, member)| (member.clone(), score.0))
                .collect(),
            None => Vec::new(),
        }
    }

    // == Range By Score ==
    /// Members with `min <= score <= max`, ascending.
    pub fn range_by_score(&self, min: f64, max: f64) -> Vec<(String, f64)> {
        self.order
            .iter()
            .skip_while(|(score, _)| score.0 < min)
            .take_while(|(score, _)| score.0 <= max)
            .map(|(score, member)| (member.clone(), score.0))
            .collect()
    }

    // == Remove Range By Rank ==
    pub fn remove_range_by_rank(&mut self, start: isize, stop: isize) -> usize {
        let doomed = self.range_by_rank(start, stop);
        for (member, _) in &doomed {
            self.remove(member);
        }
        doomed.len()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Resolves an inclusive rank range against `len`, clamping like the store's range commands.
pub fn normalize_range(start: isize, stop: isize, len: usize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}
