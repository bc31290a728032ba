use std::time::{Duration, Instant};

/// Play-time clock and per-run records shown in the header
pub struct GameMetrics {
    running_since: Option<Instant>,
    accumulated: Duration,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            running_since: None,
            accumulated: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.accumulated
            + self
                .running_since
                .map(|since| since.elapsed())
                .unwrap_or_default();
    }

    pub fn on_game_start(&mut self) {
        self.accumulated = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    /// Stop the clock without losing the time played so far
    pub fn on_pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
        self.update();
    }

    pub fn on_resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// Back to an idle board: clock stopped at zero
    pub fn on_reset(&mut self) {
        self.running_since = None;
        self.accumulated = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.on_pause();
        self.games_played += 1;
        if final_score > self.high_score {
            self.high_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_high_score_tracking() {
        let mut metrics = GameMetrics::new();

        metrics.on_game_over(10);
        assert_eq!(metrics.high_score, 10);
        assert_eq!(metrics.games_played, 1);

        metrics.on_game_over(5);
        assert_eq!(metrics.high_score, 10); // Should not decrease
        assert_eq!(metrics.games_played, 2);

        metrics.on_game_over(15);
        assert_eq!(metrics.high_score, 15); // Should update
        assert_eq!(metrics.games_played, 3);
    }

    #[test]
    fn test_clock_idle_until_started() {
        let mut metrics = GameMetrics::new();
        std::thread::sleep(Duration::from_millis(20));
        metrics.update();
        assert_eq!(metrics.elapsed_time, Duration::ZERO);
    }

    #[test]
    fn test_game_start_resets_time() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start();
        std::thread::sleep(Duration::from_millis(50));
        metrics.update();

        assert!(metrics.elapsed_time.as_millis() >= 50);

        metrics.on_game_start();
        metrics.update();
        assert!(metrics.elapsed_time.as_millis() < 50);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start();
        std::thread::sleep(Duration::from_millis(30));
        metrics.on_pause();
        let frozen = metrics.elapsed_time;

        std::thread::sleep(Duration::from_millis(30));
        metrics.update();
        assert_eq!(metrics.elapsed_time, frozen);

        metrics.on_resume();
        std::thread::sleep(Duration::from_millis(10));
        metrics.update();
        assert!(metrics.elapsed_time > frozen);
    }
}
