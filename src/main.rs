//! Tetrotui: classic falling-block puzzle game in the terminal.

mod app;
mod game;
mod grid;
mod input;
mod piece;
mod scoring;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Options derived from CLI that shape a play session (board size, RNG seed).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Fixed seed for the piece sequence; random when `None`.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: grid::DEFAULT_ROWS,
            cols: grid::DEFAULT_COLS,
            seed: None,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = match theme::Theme::load(args.theme.as_deref()) {
        Ok(theme) => theme,
        Err(e) => {
            log::warn!("failed to load theme, using default: {e}");
            theme::Theme::default()
        }
    };
    let config = GameConfig {
        rows: usize::from(args.rows),
        cols: usize::from(args.cols),
        seed: args.seed,
    };
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// Logs go to `--log-file` when given, since stderr shares the terminal with the game.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("failed to initialise logger")?;
    Ok(())
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetrotui",
    version,
    about = "Classic falling-block puzzle in the terminal. Complete horizontal lines to clear them and score.",
    long_about = "Tetrotui is a terminal falling-block puzzle game.\n\n\
        Steer falling tetrominoes and complete full horizontal rows to clear them. \
        Every 10 lines the level rises and pieces fall faster. The game ends when a \
        new piece has no room to spawn.\n\n\
        CONTROLS:\n  Left/Right h/l  Move      Up/k/x     Rotate CW   z/u        Rotate CCW\n  \
        Down/j          Soft drop Space      Hard drop   Enter/s    Start\n  \
        p               Pause     r          Restart     q / Esc    Quit\n\n\
        Set RUST_LOG (e.g. RUST_LOG=debug) together with --log-file to record a session log."
)]
pub struct Args {
    /// Board height in rows.
    #[arg(long, default_value_t = 20, value_name = "ROWS", value_parser = clap::value_parser!(u16).range(4..=40))]
    pub rows: u16,

    /// Board width in columns.
    #[arg(long, default_value_t = 10, value_name = "COLS", value_parser = clap::value_parser!(u16).range(4..=30))]
    pub cols: u16,

    /// Seed for the piece sequence (same seed, same pieces).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Skip the start screen and begin playing immediately.
    #[arg(long)]
    pub autostart: bool,

    /// Disable the game-over fade animation.
    #[arg(long)]
    pub no_animation: bool,

    /// Write log output to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["tetrotui"]).unwrap();
        assert_eq!((args.rows, args.cols), (20, 10));
        assert_eq!(args.seed, None);
        assert!(!args.autostart);
        let config = GameConfig::default();
        assert_eq!((config.rows, config.cols), (usize::from(args.rows), usize::from(args.cols)));
    }

    #[test]
    fn test_board_size_is_range_checked() {
        assert!(Args::try_parse_from(["tetrotui", "--rows", "2"]).is_err());
        assert!(Args::try_parse_from(["tetrotui", "--cols", "31"]).is_err());
        let args = Args::try_parse_from(["tetrotui", "--rows", "24", "--cols", "12", "--seed", "7"])
            .unwrap();
        assert_eq!((args.rows, args.cols, args.seed), (24, 12, Some(7)));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
