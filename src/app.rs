//! App: terminal init, main loop, turn timing and key handling.

use crate::game::{GameSession, SubmitOutcome, TurnReport};
use crate::highscores::{FileStore, HighScoreStore, MemoryStore};
use crate::input::{Action, key_to_action};
use crate::moves::Direction;
use crate::status::GameStatus;
use crate::theme::Theme;
use crate::ui::{self, TileEffects};
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Frame budget for the render loop (~60 FPS).
const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    /// Win overlay; shown once, then play continues.
    Won,
    GameOver,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    session: GameSession<StdRng>,
    screen: Screen,
    effects: TileEffects,
    /// High score when the current game started, for the "new record" banner.
    best_at_start: u64,
    /// Set once this game's score passes `best_at_start`.
    new_record: bool,
    /// Last non-fatal problem to show in the sidebar (e.g. high score not saved).
    notice: Option<String>,
}

fn open_store(no_save: bool) -> Box<dyn HighScoreStore> {
    if no_save {
        return Box::new(MemoryStore::default());
    }
    match FileStore::default_location() {
        Ok(store) => {
            info!("high score file: {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            warn!("high score will not persist: {e}");
            Box::new(MemoryStore::default())
        }
    }
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Result<Self> {
        let rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let session = GameSession::new(&config, rng, open_store(args.no_save))?;
        let mut app = Self {
            config,
            theme,
            best_at_start: session.high_score(),
            session,
            screen: Screen::Menu,
            effects: TileEffects::default(),
            new_record: false,
            notice: None,
        };
        if let Some(board) = args.start_board {
            app.reset_presentation();
            app.session.start_from(board);
            if app.session.status() == GameStatus::Lost {
                app.screen = Screen::GameOver;
            }
        } else if args.no_menu {
            app.new_game();
        }
        Ok(app)
    }

    fn new_game(&mut self) {
        self.reset_presentation();
        self.session.restart();
    }

    fn reset_presentation(&mut self) {
        self.effects.clear();
        self.notice = None;
        self.best_at_start = self.session.high_score();
        self.new_record = false;
        self.screen = Screen::Playing;
    }

    fn submit(&mut self, direction: Direction) {
        match self.session.submit_move(direction, Instant::now()) {
            SubmitOutcome::Rejected | SubmitOutcome::Unchanged => {}
            SubmitOutcome::Settling { merged_cells } => {
                if self.config.animations {
                    self.effects.flash_merges(&merged_cells);
                }
            }
            SubmitOutcome::Completed(report) => {
                if self.config.animations {
                    self.effects.flash_merges(&report.merged_cells);
                }
                self.on_turn(report);
            }
        }
    }

    /// Apply a finished turn to the presentation state.
    fn on_turn(&mut self, report: TurnReport) {
        if self.config.animations {
            if let Some(cell) = report.spawned {
                self.effects.fade_in(cell);
            }
        }
        debug!(
            "turn shown: +{} -> {} (best {})",
            report.score_delta, report.score, report.high_score
        );
        if !self.new_record && report.score > self.best_at_start {
            self.new_record = true;
            info!("new high score {}", report.high_score);
        }
        if let Some(e) = &report.store_error {
            self.notice = Some(format!("High score not saved: {e}"));
        }
        if report.status() == GameStatus::Lost {
            self.screen = Screen::GameOver;
        } else if report.newly_won {
            self.screen = Screen::Won;
        }
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let action = key_to_action(key);
        if action == Action::Quit {
            return true;
        }
        match self.screen {
            Screen::Menu => {
                if action == Action::Continue {
                    self.new_game();
                }
            }
            Screen::Playing => match action {
                Action::Move(direction) => self.submit(direction),
                Action::Restart => self.new_game(),
                _ => {}
            },
            Screen::Won => match action {
                Action::Continue => self.screen = Screen::Playing,
                Action::Restart => self.new_game(),
                _ => {}
            },
            Screen::GameOver => {
                if action == Action::Restart {
                    self.new_game();
                }
            }
        }
        false
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableFocusChange, EnableFocusChange},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        // Focus events let a hidden terminal release a turn still settling.
        let _ = execute!(stdout, EnableFocusChange);

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = execute!(std::io::stdout(), DisableFocusChange);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            if let Some(report) = self.session.tick(now) {
                self.on_turn(report);
            }

            terminal.draw(|f| {
                ui::draw(
                    f,
                    self.screen,
                    &self.session,
                    &self.theme,
                    &mut self.effects,
                    now,
                    self.new_record,
                    self.notice.as_deref(),
                )
            })?;

            let timeout = Duration::from_millis(FRAME_MS).saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        // Repeats and releases are ignored; one press is one move.
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key) {
                                return Ok(());
                            }
                        }
                        Event::FocusLost => {
                            if let Some(report) = self.session.suspend() {
                                self.on_turn(report);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
