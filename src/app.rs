//! App: terminal init, main loop, tick and key handling.

use crate::game::{Game, GameEvent, Input, Phase};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::GameOverFx;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

pub struct App {
    args: Args,
    theme: Theme,
    game: Game,
    /// Last time gravity was advanced.
    last_tick: Instant,
    /// Score reported by the last game-over event.
    final_score: Option<u32>,
    game_over_fx: GameOverFx,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        let mut game = Game::new(&config);
        if args.autostart {
            game.start();
        }
        let game_over_fx = GameOverFx::new(!args.no_animation);
        Self {
            args,
            theme,
            game,
            last_tick: Instant::now(),
            final_score: None,
            game_over_fx,
        }
    }

    /// Enter doubles as the start / pause / play-again button depending on the phase.
    fn dispatch(&mut self, action: Action) {
        let input = match (action, self.game.phase()) {
            (Action::Start, Phase::Running | Phase::Paused) => Some(Input::TogglePause),
            (Action::Start, Phase::GameOver) => Some(Input::Restart),
            _ => action.as_input(),
        };
        if let Some(input) = input {
            if input == Input::Restart {
                self.final_score = None;
                self.game_over_fx.reset();
            }
            self.game.apply(input);
        }
    }

    fn handle_game_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::PieceLocked(kind) => log::trace!("locked {kind:?}"),
                GameEvent::LinesCleared(n) => log::debug!("{n} line(s) cleared"),
                GameEvent::ScoreChanged {
                    score,
                    lines,
                    level,
                } => log::info!("score {score}, lines {lines}, level {level}"),
                GameEvent::GameOver { final_score } => {
                    log::info!("final score {final_score}");
                    self.final_score = Some(final_score);
                }
            }
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal =
            DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.clamp(1.0, 240.0));
        self.last_tick = Instant::now();
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.game.snapshot(),
                    &self.theme,
                    self.final_score,
                    &mut self.game_over_fx,
                    now,
                );
            })?;

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Held keys arrive as Repeat on terminals that report them.
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        let action = key_to_action(key);
                        if action == Action::Quit {
                            log::info!("quit");
                            return Ok(());
                        }
                        self.dispatch(action);
                        self.handle_game_events();
                    }
                }
            }

            let tick_at = Instant::now();
            self.game.tick(tick_at.saturating_duration_since(self.last_tick));
            self.last_tick = tick_at;
            self.handle_game_events();
        }
    }
}
