//! Spectator mode: the autopilot plays, you watch
//!
//! # Controls
//!
//! - Space/P: Pause/unpause
//! - R: Restart the run
//! - M: Switch between pass-through and walls
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::Frame;
use std::time::Duration;
use tokio::time::{Instant, interval, interval_at};
use tracing::info;

use crate::autopilot::choose_direction;
use crate::game::{CellSource, GameMode, GameStatus, RandomCells};
use crate::input::{InputHandler, KeyAction};
use crate::leaderboard::Leaderboard;
use crate::metrics::GameMetrics;
use crate::modes::terminal::{GameTerminal, restore_terminal, setup_terminal};
use crate::render::{Hud, Renderer};
use crate::session::GameSession;

pub struct WatchMode<S = RandomCells> {
    session: GameSession<S>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    /// Shown for reference; autopilot runs are never submitted
    leaderboard: Leaderboard,
    games_watched: u32,
    should_quit: bool,
}

impl<S: CellSource> WatchMode<S> {
    /// Watch the session's game, or a fresh one if it has not started or is over
    pub fn new(session: GameSession<S>, leaderboard: Leaderboard) -> Self {
        let mut mode = Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            leaderboard,
            games_watched: 0,
            should_quit: false,
        };
        match mode.session.state().status {
            GameStatus::Idle | GameStatus::GameOver => mode.restart(None),
            GameStatus::Playing => mode.metrics.on_game_start(),
            GameStatus::Paused => {
                mode.metrics.on_game_start();
                mode.metrics.on_pause();
            }
        }
        mode
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;

        let result = self.run_watch_loop(&mut terminal).await;

        restore_terminal(&mut terminal)?;
        info!(games_watched = self.games_watched, "watch mode finished");

        result
    }

    async fn run_watch_loop(&mut self, terminal: &mut GameTerminal) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_period = self.session.tick_interval();
        let mut tick_timer = interval(tick_period);

        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                _ = tick_timer.tick() => {
                    self.step();
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| self.draw(frame)).context("Failed to draw frame")?;
                }

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

    /// One autopilot move; a finished run is replaced by a fresh one
    fn step(&mut self) {
        if !self.session.state().is_playing() {
            return;
        }

        let direction = choose_direction(self.session.state());
        self.session.queue_direction(direction);
        let outcome = self.session.tick();

        if outcome.ended {
            self.games_watched += 1;
            self.metrics.on_game_over(self.session.final_score());
            self.restart(None);
        }
    }

    fn restart(&mut self, mode: Option<GameMode>) {
        let mode = mode.unwrap_or(self.session.state().mode);
        self.session.set_mode(mode);
        self.session.start();
        self.metrics.on_game_start();
    }

    fn draw(&self, frame: &mut Frame) {
        let state = self.session.state();
        let entries = self.leaderboard.entries(Some(state.mode));
        let hud = Hud {
            final_score: self.session.final_score(),
            multiplier: self.session.engine().score_multiplier(state.mode),
            player: Some("autopilot"),
            last_entry: None,
            leaderboard: &entries,
            spectating: true,
        };
        self.renderer.render(frame, state, &hud, &self.metrics);
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::StartOrPause | KeyAction::TogglePause => {
                    if self.session.toggle_pause() {
                        if self.session.state().is_playing() {
                            self.metrics.on_resume();
                        } else {
                            self.metrics.on_pause();
                        }
                    }
                }
                KeyAction::Restart => self.restart(None),
                KeyAction::ToggleMode => {
                    let mode = self.session.state().mode.toggled();
                    self.restart(Some(mode));
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                // The autopilot steers
                KeyAction::Turn(_) | KeyAction::None => {}
            }
        }
    }
}
