//! App: terminal init, main loop, engine pacing and key handling.

use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, View};
use crate::Args;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use matchtui::store::{FileStore, LEADERBOARD_SIZE, Progress, ProgressStore};
use matchtui::{
    Direction, GameConfig, GameSession, LevelOutcome, Pos, SessionEvent, SwapRejection,
    SwapRequest,
};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// How long a status message stays in the sidebar.
const STATUS_TTL: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    FirstLevel,
    Exit,
}

impl QuitOption {
    fn next(self) -> Self {
        match self {
            Self::Resume => Self::FirstLevel,
            Self::FirstLevel => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::FirstLevel => Self::Resume,
            Self::Exit => Self::FirstLevel,
        }
    }
}

/// Fade over the cells of the current match. The renderer builds the effect on first use,
/// once it knows where the board sits on screen.
#[derive(Default)]
pub struct ClearFx {
    pub cells: Vec<Pos>,
    pub effect: Option<Effect>,
    /// Last time the effect was processed (for delta).
    pub last_process: Option<Instant>,
}

impl ClearFx {
    fn start(&mut self, cells: impl IntoIterator<Item = Pos>) {
        self.cells = cells.into_iter().collect();
        self.effect = None;
        self.last_process = None;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        !self.cells.is_empty()
    }
}

pub struct App {
    args: Args,
    theme: Theme,
    session: GameSession,
    /// Only present for signed-in players.
    store: Option<FileStore>,
    screen: Screen,
    paused: bool,
    cursor: Pos,
    /// When the engine is owed its next `step`. `None` while idle.
    next_step_at: Option<Instant>,
    clear_fx: ClearFx,
    status: Option<(String, Instant)>,
    leaderboard: Vec<Progress>,
    quit_selected: QuitOption,
}

fn rejection_message(reason: SwapRejection) -> Option<&'static str> {
    match reason {
        SwapRejection::Busy => None,
        SwapRejection::NoMovesLeft => Some("No moves left"),
        SwapRejection::LevelOver => Some("Level is over"),
        SwapRejection::OutOfBounds => Some("Nothing to swap with there"),
        SwapRejection::SameCell => Some("Pick a different tile"),
        SwapRejection::NotAdjacent => Some("Tiles must be neighbours"),
    }
}

impl App {
    pub fn new(
        args: Args,
        config: GameConfig,
        theme: Theme,
        progress: Progress,
        store: Option<FileStore>,
    ) -> Self {
        let mut session = GameSession::new(&config, &progress);
        // Startup events (first LevelStarted) carry nothing the screen needs.
        session.drain_events();
        let cursor = Pos::new(config.rows / 2, config.cols / 2);
        let mut app = Self {
            args,
            theme,
            session,
            store,
            screen: Screen::Playing,
            paused: false,
            cursor,
            next_step_at: None,
            clear_fx: ClearFx::default(),
            status: None,
            leaderboard: Vec::new(),
            quit_selected: QuitOption::Resume,
        };
        app.refresh_leaderboard();
        app
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some((msg.into(), Instant::now()));
    }

    fn refresh_leaderboard(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        match store.leaderboard(LEADERBOARD_SIZE) {
            Ok(rows) => self.leaderboard = rows,
            Err(e) => log::warn!("could not read leaderboard: {}", e),
        }
    }

    fn save_progress(&mut self, progress: &Progress) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        match store.save_progress(progress) {
            Ok(()) => {
                log::info!(
                    "saved progress for {}: level {}, total {}",
                    progress.username,
                    progress.level,
                    progress.total_score
                );
                self.refresh_leaderboard();
            }
            Err(e) => {
                log::warn!("could not save progress: {}", e);
                self.set_status(format!("Progress not saved: {}", e));
            }
        }
    }

    /// Schedule the first step of a swap the engine just accepted.
    fn on_swap_request(&mut self, request: SwapRequest, now: Instant) {
        if request == SwapRequest::Accepted {
            self.next_step_at = Some(now + self.session.current_delay());
        }
        self.handle_session_events();
    }

    /// Run every engine step that is due. Zero pacing resolves a whole cascade in one call.
    fn pump_engine(&mut self, now: Instant) {
        while let Some(at) = self.next_step_at {
            if now < at {
                break;
            }
            self.next_step_at = self.session.step().map(|delay| now + delay);
            self.handle_session_events();
        }
    }

    fn handle_session_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                SessionEvent::Matched { cells } if !self.args.no_animation => {
                    self.clear_fx.start(cells);
                }
                SessionEvent::Cleared { .. } | SessionEvent::LevelStarted { .. } => {
                    self.clear_fx.reset();
                }
                SessionEvent::SwapRejected { reason } => {
                    if let Some(msg) = rejection_message(reason) {
                        self.set_status(msg);
                    }
                }
                SessionEvent::Shuffled { .. } => self.set_status("No moves left, board shuffled"),
                SessionEvent::LevelWon { level, score } => {
                    self.set_status(format!("Level {} cleared with {} points", level, score));
                }
                SessionEvent::LevelLost { level, .. } => {
                    self.set_status(format!("Out of moves on level {}", level));
                }
                _ => {}
            }
        }
    }

    fn move_cursor(&mut self, dir: Direction) {
        if let Some(next) = self.session.grid().neighbor(self.cursor, dir) {
            self.cursor = next;
        }
    }

    fn next_level(&mut self) {
        if let Some(progress) = self.session.advance_level() {
            self.handle_session_events();
            self.save_progress(&progress);
        }
    }

    fn apply_action(&mut self, action: Action, now: Instant) {
        match (self.session.outcome(), action) {
            (_, Action::Quit) => {
                self.screen = Screen::QuitMenu;
                self.quit_selected = QuitOption::Resume;
            }
            (_, Action::Pause) => self.paused = true,
            (_, Action::Cursor(dir)) => self.move_cursor(dir),
            (LevelOutcome::Won, Action::NextLevel | Action::Select) => self.next_level(),
            (LevelOutcome::Lost, Action::Retry) => {
                self.session.retry_level();
                self.handle_session_events();
            }
            (LevelOutcome::Lost, Action::FirstLevel) => {
                self.session.restart_from_first_level();
                self.handle_session_events();
            }
            (LevelOutcome::Playing, Action::Select) => {
                match self.session.select(self.cursor) {
                    Some(request) => self.on_swap_request(request, now),
                    None => self.handle_session_events(),
                }
            }
            (LevelOutcome::Playing, Action::Swipe(dir)) => {
                let request = self.session.swipe(self.cursor, dir);
                self.on_swap_request(request, now);
            }
            _ => {}
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
                PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Shift+arrow is only reported reliably with disambiguated escape codes.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.clamp(1.0, 240.0));
        loop {
            let now = Instant::now();
            if self
                .status
                .as_ref()
                .is_some_and(|(_, at)| now.duration_since(*at) >= STATUS_TTL)
            {
                self.status = None;
            }

            let view = View {
                session: &self.session,
                theme: &self.theme,
                screen: self.screen,
                paused: self.paused,
                cursor: self.cursor,
                quit_selected: self.quit_selected,
                status: self.status.as_ref().map(|(msg, _)| msg.as_str()),
                leaderboard: &self.leaderboard,
                signed_in: self.store.is_some(),
            };
            let clear_fx = &mut self.clear_fx;
            terminal.draw(|f| ui::draw(f, &view, clear_fx, now))?;

            if self.screen == Screen::Playing && !self.paused {
                self.pump_engine(Instant::now());
            }

            // Wake for the next frame or the next engine step, whichever is first.
            let mut timeout = frame_duration.saturating_sub(now.elapsed());
            if let Some(at) = self.next_step_at {
                timeout = timeout.min(at.saturating_duration_since(Instant::now()));
            }

            if !event::poll(timeout)? {
                continue;
            }
            while event::poll(Duration::ZERO)? {
                let Event::Key(key) = event::read()? else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = key_to_action(key);
                match self.screen {
                    Screen::Playing if self.paused => match action {
                        Action::Pause => self.paused = false,
                        Action::Quit => {
                            self.screen = Screen::QuitMenu;
                            self.quit_selected = QuitOption::Resume;
                        }
                        _ => {}
                    },
                    Screen::Playing => self.apply_action(action, Instant::now()),
                    Screen::QuitMenu => match action {
                        Action::Cursor(Direction::Down | Direction::Right) => {
                            self.quit_selected = self.quit_selected.next();
                        }
                        Action::Cursor(Direction::Up | Direction::Left) => {
                            self.quit_selected = self.quit_selected.prev();
                        }
                        Action::Select => match self.quit_selected {
                            QuitOption::Resume => self.screen = Screen::Playing,
                            QuitOption::FirstLevel => {
                                self.session.restart_from_first_level();
                                self.next_step_at = None;
                                self.handle_session_events();
                                self.paused = false;
                                self.screen = Screen::Playing;
                            }
                            QuitOption::Exit => return Ok(()),
                        },
                        Action::Pause | Action::Quit => self.screen = Screen::Playing,
                        _ => {}
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_options_cycle() {
        let mut opt = QuitOption::Resume;
        for _ in 0..3 {
            opt = opt.next();
        }
        assert_eq!(opt, QuitOption::Resume);
        assert_eq!(QuitOption::Resume.prev(), QuitOption::Exit);
    }

    #[test]
    fn test_busy_rejections_are_silent() {
        assert_eq!(rejection_message(SwapRejection::Busy), None);
        assert!(rejection_message(SwapRejection::NotAdjacent).is_some());
    }
}
