//! Local ranking store for finished games
//!
//! Scores arrive already scaled by the mode multiplier. Entries are kept
//! sorted by score (highest first); equal scores keep submission order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::game::GameMode;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard I/O failed for {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("leaderboard file is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// A finished game to be ranked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub username: String,
    /// Final score, multiplier already applied
    pub score: u32,
    pub mode: GameMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: u64,
    pub rank: usize,
    pub username: String,
    pub score: u32,
    pub mode: GameMode,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a score and return its entry with the rank it landed on
    pub fn submit(&mut self, username: &str, score: u32, mode: GameMode) -> LeaderboardEntry {
        let id = self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;

        // Behind every equal score, so ties stay in submission order
        let index = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(
            index,
            LeaderboardEntry {
                id,
                rank: 0,
                username: username.to_string(),
                score,
                mode,
                played_at: Utc::now(),
            },
        );
        self.rerank();

        self.entries[index].clone()
    }

    /// Ranked view, optionally restricted to one mode
    ///
    /// Ranks are renumbered from 1 inside the filtered view.
    pub fn entries(&self, mode: Option<GameMode>) -> Vec<LeaderboardEntry> {
        self.entries
            .iter()
            .filter(|e| mode.is_none_or(|m| e.mode == m))
            .enumerate()
            .map(|(i, e)| LeaderboardEntry {
                rank: i + 1,
                ..e.clone()
            })
            .collect()
    }

    /// Best final score for a player in a mode, if any
    pub fn best_for(&self, username: &str, mode: GameMode) -> Option<u32> {
        self.entries
            .iter()
            .filter(|e| e.username == username && e.mode == mode)
            .map(|e| e.score)
            .max()
    }

    /// Load from a JSON file; a missing file is an empty board
    pub fn load(path: &Path) -> Result<Self, LeaderboardError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(LeaderboardError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let mut board: Leaderboard = serde_json::from_str(&json)?;
        // Hand-edited files may be out of order
        board.entries.sort_by(|a, b| b.score.cmp(&a.score));
        board.rerank();
        Ok(board)
    }

    fn rerank(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), LeaderboardError> {
        let io_err = |source| LeaderboardError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(io_err)
    }
}

/// Anything that can rank a finished game
pub trait ScoreSink {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<LeaderboardEntry, LeaderboardError>;
}

impl ScoreSink for Leaderboard {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<LeaderboardEntry, LeaderboardError> {
        Ok(Leaderboard::submit(
            self,
            &submission.username,
            submission.score,
            submission.mode,
        ))
    }
}

/// Leaderboard stored in a JSON file, re-read on every submission so that
/// concurrent games in other terminals are not overwritten
#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    path: PathBuf,
}

impl FileLeaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Leaderboard, LeaderboardError> {
        Leaderboard::load(&self.path)
    }
}

impl ScoreSink for FileLeaderboard {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<LeaderboardEntry, LeaderboardError> {
        let mut board = Leaderboard::load(&self.path)?;
        let entry = board.submit(&submission.username, submission.score, submission.mode);
        board.save(&self.path)?;
        Ok(entry)
    }
}

/// Retry schedule for score reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

/// Submit a score, retrying with exponential backoff
///
/// Failures are logged and swallowed: a lost score must never disturb the
/// game in progress.
pub async fn report_score<K: ScoreSink>(
    sink: &mut K,
    submission: &ScoreSubmission,
    policy: RetryPolicy,
) -> Option<LeaderboardEntry> {
    let mut backoff = policy.initial_backoff;

    for attempt in 1..=policy.max_attempts.max(1) {
        match sink.submit(submission) {
            Ok(entry) => {
                info!(
                    username = %submission.username,
                    score = submission.score,
                    rank = entry.rank,
                    "score recorded"
                );
                return Some(entry);
            }
            Err(e) if attempt < policy.max_attempts => {
                warn!(attempt, error = %e, "score submission failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }
            Err(e) => {
                error!(attempt, error = %e, "giving up on score submission");
            }
        }
    }

    None
}
