//! matchtui — match-3 tile puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result, bail};
use app::App;
use clap::{Parser, ValueEnum};
use matchtui::store::{self, AccountStore, FileStore, LEADERBOARD_SIZE, Progress, ProgressStore};
use matchtui::{GameConfig, MAX_BOARD_SIDE, MIN_BOARD_SIDE, Pacing};
use std::path::{Path, PathBuf};

/// Name shown for players who are not signed in. Guest progress is never saved.
pub const GUEST: &str = "guest";

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let store_path = args.store.clone().unwrap_or_else(store::default_store_path);
    let token_dir = store_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(store::config_dir);
    let opened = FileStore::open(&store_path);

    if args.leaderboard || args.logout {
        let mut file_store =
            opened.with_context(|| format!("cannot open store {}", store_path.display()))?;
        return if args.leaderboard {
            print_leaderboard(&file_store)
        } else {
            logout(&mut file_store, &token_dir)
        };
    }

    // A broken store never blocks play; the game continues as a guest.
    let (store, progress) = match opened {
        Ok(mut file_store) => match sign_in(&args, &mut file_store, &token_dir)? {
            Some(name) => {
                let progress = file_store.load_progress(&name).unwrap_or_else(|e| {
                    log::warn!("could not load progress for {}: {}", name, e);
                    Progress::fresh(&name)
                });
                (Some(file_store), progress)
            }
            None => (None, Progress::fresh(GUEST)),
        },
        Err(e) if args.user.is_some() => {
            return Err(e).with_context(|| format!("cannot open store {}", store_path.display()));
        }
        Err(e) => {
            log::warn!("store {} unavailable: {}", store_path.display(), e);
            (None, Progress::fresh(GUEST))
        }
    };

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        rows: args.rows,
        cols: args.cols,
        seed: args.seed,
        pacing: if args.no_animation {
            Pacing::instant()
        } else {
            Pacing::default()
        },
    };
    let mut app = App::new(args, config, theme, progress, store);
    app.run()?;
    Ok(())
}

/// Logs go to `--log-file` only; the terminal UI owns stdout and stderr.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Resolve who is playing: explicit `--user`, else the remembered token, else a guest.
fn sign_in(args: &Args, store: &mut FileStore, token_dir: &Path) -> Result<Option<String>> {
    if let Some(user) = &args.user {
        let password = args.password.as_deref().unwrap_or_default();
        let session = if args.register {
            store.register(user, password)
        } else {
            store.login(user, password)
        }
        .with_context(|| format!("cannot sign in as {}", user))?;
        if let Err(e) = store::save_token(token_dir, &session.token) {
            log::warn!("could not remember session: {}", e);
        }
        log::info!("signed in as {}", session.username);
        return Ok(Some(session.username));
    }
    if args.register {
        bail!("--register needs --user and --password");
    }
    let Some(token) = store::load_saved_token(token_dir) else {
        return Ok(None);
    };
    match store.resume(&token) {
        Ok(session) => {
            log::info!("resumed session for {}", session.username);
            Ok(Some(session.username))
        }
        Err(e) => {
            log::warn!("saved session rejected ({}), playing as guest", e);
            if let Err(e) = store::clear_saved_token(token_dir) {
                log::warn!("could not forget saved session: {}", e);
            }
            Ok(None)
        }
    }
}

fn logout(store: &mut FileStore, token_dir: &Path) -> Result<()> {
    if let Some(token) = store::load_saved_token(token_dir) {
        store.logout(&token)?;
    }
    store::clear_saved_token(token_dir)?;
    println!("Signed out.");
    Ok(())
}

fn print_leaderboard(store: &FileStore) -> Result<()> {
    let rows = store.leaderboard(LEADERBOARD_SIZE)?;
    if rows.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }
    println!("{:>3}  {:<16} {:>5} {:>8}", "#", "Player", "Level", "Score");
    for (i, p) in rows.iter().enumerate() {
        println!(
            "{:>3}  {:<16} {:>5} {:>8}",
            i + 1,
            p.username,
            p.level,
            p.total_score
        );
    }
    Ok(())
}

fn board_dimension(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("{} is not a number", s))?;
    if (MIN_BOARD_SIDE..=MAX_BOARD_SIDE).contains(&n) {
        Ok(n)
    } else {
        Err(format!(
            "{} is outside {}..={}",
            n, MIN_BOARD_SIDE, MAX_BOARD_SIDE
        ))
    }
}

/// Match-3 tile puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "matchtui",
    version,
    about = "Match-3 tile puzzle in the terminal. Swap neighbouring tiles to line up three or more of a kind.",
    long_about = "matchtui is a terminal match-3 game.\n\n\
        Swap two neighbouring tiles to form a line of three or more of the same colour. \
        Matched tiles clear, the rest fall, new tiles drop in and chains resolve on their own. \
        The star tile matches anything and clears its whole row and column. Reach the \
        target score before running out of moves to advance.\n\n\
        CONTROLS:\n  Arrows / hjkl       Move cursor      Space / Enter   Select (pick two neighbours)\n  \
        Shift+Arrow / HJKL  Swap with neighbour  P  Pause     Q / Esc   Quit menu\n  \
        N  Next level (after a win)   R  Retry   M  Back to level 1 (after a loss)\n\n\
        Use --user/--password (and --register once) to save progress and join the leaderboard."
)]
pub struct Args {
    /// Board rows.
    #[arg(long, default_value = "8", value_name = "N", value_parser = board_dimension)]
    pub rows: usize,

    /// Board columns.
    #[arg(long, default_value = "8", value_name = "N", value_parser = board_dimension)]
    pub cols: usize,

    /// Seed for a reproducible game.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Resolve matches instantly (no settle delays, no fade).
    #[arg(long)]
    pub no_animation: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Account name. Progress is only saved when signed in.
    #[arg(short, long, value_name = "NAME")]
    pub user: Option<String>,

    /// Account password.
    #[arg(long, value_name = "PASSWORD", requires = "user")]
    pub password: Option<String>,

    /// Create the account given by --user before playing.
    #[arg(long)]
    pub register: bool,

    /// Forget the remembered session and exit.
    #[arg(long, conflicts_with_all = ["user", "leaderboard"])]
    pub logout: bool,

    /// Print the top players and exit.
    #[arg(long)]
    pub leaderboard: bool,

    /// Store file (accounts, progress). Defaults to $XDG_CONFIG_HOME/matchtui/store.json.
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Write logs here (filter with RUST_LOG). No logging without it.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_dimension_range() {
        assert_eq!(board_dimension("8"), Ok(8));
        assert!(board_dimension("4").is_err());
        assert!(board_dimension("13").is_err());
        assert!(board_dimension("x").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["matchtui"]);
        assert_eq!((args.rows, args.cols), (8, 8));
        assert!(!args.no_animation);
        assert_eq!(args.palette, Palette::Normal);
    }

    #[test]
    fn test_stale_saved_session_falls_back_to_guest() {
        let dir = std::env::temp_dir().join(format!("matchtui-signin-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut store = FileStore::open(dir.join("store.json")).unwrap();
        store::save_token(&dir, "not-a-real-token").unwrap();

        let args = Args::parse_from(["matchtui"]);
        assert_eq!(sign_in(&args, &mut store, &dir).unwrap(), None);
        assert_eq!(store::load_saved_token(&dir), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_password_requires_user() {
        assert!(Args::try_parse_from(["matchtui", "--password", "pw"]).is_err());
        assert!(Args::try_parse_from(["matchtui", "-u", "ada", "--password", "pw"]).is_ok());
    }
}
