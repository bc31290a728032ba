use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::Frame;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, interval, interval_at};
use tracing::{info, warn};

use crate::game::{GameMode, GameStatus};
use crate::input::{InputHandler, KeyAction};
use crate::leaderboard::{
    FileLeaderboard, Leaderboard, LeaderboardEntry, RetryPolicy, ScoreSubmission, report_score,
};
use crate::metrics::GameMetrics;
use crate::modes::terminal::{GameTerminal, restore_terminal, setup_terminal};
use crate::persistence::save_state;
use crate::render::{Hud, Renderer};
use crate::session::GameSession;

pub struct HumanMode {
    session: GameSession,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    scores: FileLeaderboard,
    /// Last known contents of the leaderboard file
    leaderboard: Leaderboard,
    last_entry: Option<LeaderboardEntry>,
    /// Entries recorded by background score reports
    reports_tx: mpsc::UnboundedSender<LeaderboardEntry>,
    reports_rx: mpsc::UnboundedReceiver<LeaderboardEntry>,
    save_path: Option<PathBuf>,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(session: GameSession, scores: FileLeaderboard) -> Self {
        let leaderboard = scores.load().unwrap_or_else(|e| {
            warn!(error = %e, path = ?scores.path(), "could not read leaderboard");
            Leaderboard::new()
        });
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();

        Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            scores,
            leaderboard,
            last_entry: None,
            reports_tx,
            reports_rx,
            save_path: None,
            should_quit: false,
        }
    }

    /// Where to leave an unfinished game on quit
    pub fn with_save_path(mut self, save_path: Option<PathBuf>) -> Self {
        self.save_path = save_path;
        self
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        restore_terminal(&mut terminal)?;
        self.save_on_exit()?;

        result
    }

    async fn run_game_loop(&mut self, terminal: &mut GameTerminal) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks at the current speed; re-armed whenever it changes
        let mut tick_period = self.session.tick_interval();
        let mut tick_timer = interval(tick_period);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if self.session.state().is_playing() {
                        self.update_game();
                    }
                }

                // Score report finished in the background
                Some(entry) = self.reports_rx.recv() => {
                    self.on_score_recorded(entry);
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| self.draw(frame)).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.session.tick_interval() != tick_period {
                tick_period = self.session.tick_interval();
                tick_timer = interval_at(Instant::now() + tick_period, tick_period);
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let state = self.session.state();
        let entries = self.leaderboard.entries(Some(state.mode));
        let hud = Hud {
            final_score: self.session.final_score(),
            multiplier: self.session.engine().score_multiplier(state.mode),
            player: self.session.player(),
            last_entry: self.last_entry.as_ref(),
            leaderboard: &entries,
            spectating: false,
        };
        self.renderer.render(frame, state, &hud, &self.metrics);
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Turn(direction) => {
                    self.session.queue_direction(direction);
                }
                KeyAction::StartOrPause => self.start_or_pause(),
                KeyAction::TogglePause => self.toggle_pause(),
                KeyAction::Restart => self.reset_game(None),
                KeyAction::ToggleMode => {
                    let mode = self.session.state().mode.toggled();
                    self.reset_game(Some(mode));
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }
    }

    fn start_or_pause(&mut self) {
        match self.session.state().status {
            GameStatus::Idle => self.start_game(),
            GameStatus::GameOver => {
                self.reset_game(None);
                self.start_game();
            }
            GameStatus::Playing | GameStatus::Paused => self.toggle_pause(),
        }
    }

    fn start_game(&mut self) {
        if self.session.start() {
            self.metrics.on_game_start();
        }
    }

    fn toggle_pause(&mut self) {
        if !self.session.toggle_pause() {
            return;
        }
        if self.session.state().is_playing() {
            self.metrics.on_resume();
        } else {
            self.metrics.on_pause();
        }
    }

    fn update_game(&mut self) {
        let outcome = self.session.tick();

        if outcome.ended {
            self.metrics.on_game_over(self.session.final_score());
        }
        if let Some(submission) = outcome.game_over {
            self.record_score(submission);
        }
    }

    /// Report off the game loop so retries never stall input or drawing
    fn record_score(&self, submission: ScoreSubmission) {
        let mut scores = self.scores.clone();
        let reports = self.reports_tx.clone();
        tokio::spawn(async move {
            let recorded = report_score(&mut scores, &submission, RetryPolicy::default()).await;
            if let Some(entry) = recorded {
                // Receiver only goes away when the game has quit
                let _ = reports.send(entry);
            }
        });
    }

    fn on_score_recorded(&mut self, entry: LeaderboardEntry) {
        self.last_entry = Some(entry);
        match self.scores.load() {
            Ok(board) => self.leaderboard = board,
            Err(e) => warn!(error = %e, "could not refresh leaderboard"),
        }
    }

    fn reset_game(&mut self, mode: Option<GameMode>) {
        let mode = mode.unwrap_or(self.session.state().mode);
        self.session.set_mode(mode);
        self.metrics.on_reset();
        self.last_entry = None;
    }

    /// Keep an unfinished game so it can be resumed later
    fn save_on_exit(&self) -> Result<()> {
        let Some(path) = &self.save_path else {
            return Ok(());
        };

        let state = self.session.state();
        if matches!(state.status, GameStatus::Playing | GameStatus::Paused) {
            save_state(&state.with_status(GameStatus::Paused), path)?;
            info!(path = ?path, score = state.score, "game saved");
        }
        Ok(())
    }
}
