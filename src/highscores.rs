//! High score leaderboard system
//!
//! Lives for the lifetime of the process only and keeps the top 3 scores.
//! Each run ("session") may commit at most one score: death, victory, exit
//! and return-to-menu can all try to record the same run.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 3;

/// A single high score entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Insertion order, newer entries win ties
    pub seq: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
    next_seq: u64,
    session_recorded: bool,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session; the next positive score may be recorded again
    pub fn begin_session(&mut self) {
        self.session_recorded = false;
    }

    /// Whether the current session has already committed its score
    pub fn session_recorded(&self) -> bool {
        self.session_recorded
    }

    /// Commit a score for the current session.
    ///
    /// Ignored when the score is zero or the session already committed.
    /// Returns the rank achieved (1-indexed), or None if nothing was stored or
    /// the score fell off the bottom of the board.
    pub fn record(&mut self, score: u64) -> Option<usize> {
        if score == 0 || self.session_recorded {
            return None;
        }
        self.session_recorded = true;
        self.next_seq += 1;

        let entry = HighScoreEntry {
            score,
            seq: self.next_seq,
        };
        self.entries.push(entry);
        self.entries
            .sort_by(|a, b| (b.score, b.seq).cmp(&(a.score, a.seq)));
        self.entries.truncate(MAX_HIGH_SCORES);

        let rank = self.entries.iter().position(|e| e.seq == entry.seq);
        match rank {
            Some(i) => log::info!("High score {} recorded at rank {}", score, i + 1),
            None => log::info!("Score {} did not make the hall of fame", score),
        }
        rank.map(|i| i + 1)
    }

    /// The retained entries, best first
    pub fn top_three(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
