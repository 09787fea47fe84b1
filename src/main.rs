//! Tilemerge — sliding-tile merge puzzle (2048-style) in the terminal.

mod app;
mod error;
mod game;
mod grid;
mod highscores;
mod input;
mod line;
mod moves;
mod spawn;
mod status;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use env_logger::Env;
use grid::Grid;
use std::path::PathBuf;

/// Options derived from CLI that affect game behaviour (board size, win tile, settle delay).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub size: usize,
    pub win_tile: u32,
    pub settle_delay_ms: u64,
    pub animations: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: grid::DEFAULT_SIZE,
            win_tile: status::DEFAULT_WIN_TILE,
            settle_delay_ms: 150,
            animations: true,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref())
        .with_context(|| format!("loading theme {:?}", args.theme))?;
    let config = GameConfig {
        size: args.start_board.as_ref().map_or(usize::from(args.size), Grid::size),
        win_tile: args.win_tile,
        settle_delay_ms: args.settle_ms,
        animations: !args.no_animation,
    };
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file. Filter via RUST_LOG.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Sliding-tile merge puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tilemerge",
    version,
    about = "Slide tiles on a square grid; equal neighbours merge. Reach 2048 to win.",
    long_about = "Tilemerge is a terminal take on the 2048 sliding-tile puzzle.\n\n\
        Every move slides all tiles toward one edge; two equal tiles that meet merge into \
        one tile of double value and add it to your score. After each move a 2 (or \
        sometimes a 4) appears in a random empty cell. Reach the win tile to win; you can \
        keep playing afterwards. The game ends when no move changes the board.\n\n\
        CONTROLS:\n  Arrows / hjkl / wasd  Move    R  Restart    C  Continue after win    Q / Esc  Quit"
)]
pub struct Args {
    /// Board edge length in cells.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=8), value_name = "N")]
    pub size: u8,

    /// Tile value that wins the game (power of two, at least 4).
    #[arg(long, default_value_t = status::DEFAULT_WIN_TILE, value_parser = parse_win_tile, value_name = "VALUE")]
    pub win_tile: u32,

    /// Pause in ms between a move and the new tile appearing. Input is ignored meanwhile.
    #[arg(long, default_value_t = 150, value_name = "MS")]
    pub settle_ms: u64,

    /// Start from this board instead of two random tiles, e.g. "2,2,0,0/0,4,0,0/0,0,0,0/0,0,0,0".
    /// Rows are separated by '/', cells by ','. Sets the board size; restarts are random.
    #[arg(long, value_parser = parse_board, value_name = "ROWS", conflicts_with = "size")]
    pub start_board: Option<Grid>,

    /// Seed for tile placement (reproducible games). Uses OS entropy if not set.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Disable the spawn fade-in and merge flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Skip the start screen and begin playing immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Keep the high score in memory only.
    #[arg(long)]
    pub no_save: bool,

    /// Path to theme file (btop-style theme[key]="value"). Uses the classic palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Write logs to this file (level from RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

fn parse_win_tile(s: &str) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|e| format!("{e}"))?;
    if v < 4 || !v.is_power_of_two() {
        return Err(format!("{v} is not a power of two >= 4"));
    }
    Ok(v)
}

fn parse_board(s: &str) -> Result<Grid, String> {
    let rows = s
        .split('/')
        .map(|row| {
            row.split(',')
                .map(|cell| {
                    let cell = cell.trim();
                    cell.parse::<u32>().map_err(|e| format!("{cell:?}: {e}"))
                })
                .collect::<Result<Vec<u32>, String>>()
        })
        .collect::<Result<Vec<_>, String>>()?;
    Grid::from_rows(&rows).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_win_tile() {
        assert_eq!(parse_win_tile("2048"), Ok(2048));
        assert_eq!(parse_win_tile("4"), Ok(4));
        assert!(parse_win_tile("2").is_err());
        assert!(parse_win_tile("1000").is_err());
        assert!(parse_win_tile("abc").is_err());
    }

    #[test]
    fn test_args_defaults_and_size_bounds() {
        let args = Args::try_parse_from(["tilemerge"]).unwrap();
        assert_eq!(args.size, 4);
        assert_eq!(args.win_tile, 2048);
        assert_eq!(args.settle_ms, 150);
        assert!(Args::try_parse_from(["tilemerge", "--size", "1"]).is_err());
        assert!(Args::try_parse_from(["tilemerge", "--size", "9"]).is_err());
        assert!(Args::try_parse_from(["tilemerge", "--size", "5"]).is_ok());
    }

    #[test]
    fn test_parse_board() {
        let g = parse_board("2,2,0/0, 4,0/0,0,8").unwrap();
        assert_eq!(g.size(), 3);
        assert_eq!(g.row(1), &[0, 4, 0]);
        assert_eq!(g.get(2, 2), Some(8));

        assert!(parse_board("2,2/0").unwrap_err().contains("not square"));
        assert!(parse_board("2,3/0,0").unwrap_err().contains("invalid tile value 3"));
        assert!(parse_board("2,x/0,0").is_err());
        assert!(parse_board("2").is_err());
    }

    #[test]
    fn test_start_board_sets_size_and_conflicts_with_size() {
        let args = Args::try_parse_from(["tilemerge", "--start-board", "2,0/0,2"]).unwrap();
        assert_eq!(args.start_board.map(|g| g.size()), Some(2));
        assert!(
            Args::try_parse_from(["tilemerge", "--start-board", "2,0/0,2", "--size", "3"]).is_err()
        );
    }

    #[test]
    fn test_clap_command_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
