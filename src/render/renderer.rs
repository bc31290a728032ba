use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GRID_SIZE, GameMode, GameState, GameStatus, Position};
use crate::leaderboard::LeaderboardEntry;
use crate::metrics::GameMetrics;

/// Everything on screen that is not part of the game state itself
pub struct Hud<'a> {
    pub final_score: u32,
    pub multiplier: f64,
    pub player: Option<&'a str>,
    /// Entry recorded for the game that just ended
    pub last_entry: Option<&'a LeaderboardEntry>,
    /// Ranked entries for the current mode
    pub leaderboard: &'a [LeaderboardEntry],
    /// True when the autopilot is playing
    pub spectating: bool,
}

const LEADERBOARD_ROWS: usize = 10;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, hud: &Hud, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(state, hud, metrics);
        frame.render_widget(stats, chunks[0]);

        // Grid on the left, leaderboard on the right
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length((GRID_SIZE * 2 + 2) as u16),
                Constraint::Min(24),
            ])
            .split(chunks[1]);

        if state.status == GameStatus::GameOver {
            let game_over = self.render_game_over(state, hud);
            frame.render_widget(game_over, body[0]);
        } else {
            let grid = self.render_grid(state, hud);
            frame.render_widget(grid, body[0]);
        }

        let board = self.render_leaderboard(state.mode, hud);
        frame.render_widget(board, body[1]);

        let controls = self.render_controls(hud.spectating);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, state: &GameState, hud: &Hud) -> Paragraph<'_> {
        let mut lines = Vec::new();

        for y in 0..GRID_SIZE {
            let mut spans = Vec::new();

            for x in 0..GRID_SIZE {
                let pos = Position::new(x, y);

                let cell = if pos == state.head() {
                    // Snake head - distinct color
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.is_occupied_by_snake(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let title = match state.status {
            GameStatus::Idle if hud.spectating => " Snake ".to_string(),
            GameStatus::Idle => " Press SPACE to start ".to_string(),
            GameStatus::Paused => " Paused: SPACE to resume ".to_string(),
            _ => format!(" Snake ({}) ", state.mode.as_str()),
        };

        // Double border marks deadly walls
        let border_type = match state.mode {
            GameMode::Walls => BorderType::Double,
            GameMode::PassThrough => BorderType::Plain,
        };

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
    }

    fn render_stats(&self, state: &GameState, hud: &Hud, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut spans = vec![
            Span::styled("Score: ", label),
            Span::styled(
                state.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" (x{} = {})", hud.multiplier, hud.final_score), value),
            Span::raw("    "),
            Span::styled("Mode: ", label),
            Span::styled(state.mode.as_str(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{}ms", state.speed), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.high_score.to_string(), value),
        ];

        if let Some(player) = hud.player {
            spans.push(Span::raw("    "));
            spans.push(Span::styled("Player: ", label));
            spans.push(Span::styled(player.to_string(), value));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, state: &GameState, hud: &Hud) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    hud.final_score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![Span::styled(
                format!("{} points, {} mode", state.score, state.mode.as_str()),
                Style::default().fg(Color::Gray),
            )]),
        ];

        if let Some(entry) = hud.last_entry {
            text.push(Line::from(""));
            text.push(Line::from(vec![
                Span::styled("Leaderboard rank: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("#{}", entry.rank),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "SPACE",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to play again or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_leaderboard(&self, mode: GameMode, hud: &Hud) -> Paragraph<'_> {
        let mut lines = Vec::new();

        if hud.leaderboard.is_empty() {
            lines.push(Line::from(Span::styled(
                "No scores yet",
                Style::default().fg(Color::DarkGray),
            )));
        }

        for entry in hud.leaderboard.iter().take(LEADERBOARD_ROWS) {
            let highlight = hud.last_entry.is_some_and(|last| last.id == entry.id);
            let style = if highlight {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:>2}. ", entry.rank), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:<12} {:>6}", entry.username, entry.score), style),
            ]));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Top scores: {} ", mode.as_str())),
        )
    }

    fn render_controls(&self, spectating: bool) -> Paragraph<'_> {
        let mut spans = Vec::new();
        if !spectating {
            spans.extend([
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
            ]);
        }
        spans.extend([
            Span::styled("SPACE", Style::default().fg(Color::Cyan)),
            Span::raw(" start/pause | "),
            Span::styled("M", Style::default().fg(Color::Cyan)),
            Span::raw(" mode | "),
            Span::styled("R", Style::default().fg(Color::Cyan)),
            Span::raw(" reset | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
