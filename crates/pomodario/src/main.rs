//! pomodario - Pomodoro timer with task tracking and focus statistics
//!
//! Usage:
//!   pomodario run [--mode MODE] [--start]   Run the interactive timer (default)
//!   pomodario task add TEXT                 Add a task
//!   pomodario task list                     List tasks
//!   pomodario task done ID                  Toggle a task's completed flag
//!   pomodario task edit ID TEXT             Change a task's text
//!   pomodario task rm ID                    Delete a task
//!   pomodario settings [show|set ...]       Show or change timer settings
//!   pomodario stats [--json]                Show focus statistics

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use pomodario_core::{format, Config, Paths};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use pomodario::{
    AlarmSound, Clock, DesktopNotifier, FileStorage, Mode, PomoStore, Ports, SessionConfig,
    SoundFilePlayer, StatsRecord, SystemClock, TaskList, TaskPatch, TickHandle, TickOutcome,
    Timer, TokioScheduler,
};

/// Pomodario - Pomodoro timer with task tracking and focus statistics
#[derive(Parser)]
#[command(name = "pomodario")]
#[command(about = "Pomodoro timer with task tracking and focus statistics")]
#[command(version)]
#[command(after_help = r#"WHEN TO USE:
    Work in focused intervals with short breaks in between and a long
    break after every few sessions. Completed sessions feed the stats.

TIMER KEYS (type and press Enter while 'run' is active):
    p / Enter   Start, pause or resume
    r           Reset the current mode
    f / s / l   Switch to focus, short break, long break
    a TEXT      Add a task
    d ID        Toggle a task done
    t           Show tasks
    q           Quit

EXAMPLES:
    pomodario                         # Interactive timer, stopped in focus mode
    pomodario run --start             # Start focusing right away
    pomodario task add Write report   # Add a task
    pomodario settings set --pomodoro 50 --short 10
    pomodario stats                   # Totals, last 7 days, achievements

CONFIGURATION:
    ~/.config/pomodario/config.json   data_dir, sounds_dir, notifications
    POMODARIO_DATA_DIR                Override the data directory
    RUST_LOG=pomodario=debug          Log to stderr

ALIASES:
    pomodario r     # run
    pomodario t     # task
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Data directory (overrides config file and POMODARIO_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive timer
    #[command(alias = "r")]
    Run {
        /// Mode to start in: focus, short, long
        #[arg(long, default_value = "focus", value_parser = parse_mode)]
        mode: Mode,

        /// Start counting immediately
        #[arg(long)]
        start: bool,
    },

    /// Manage the task list
    #[command(alias = "t", alias = "tasks")]
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Show or change timer settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Show focus statistics
    #[command(alias = "statistics")]
    Stats {
        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// List tasks
    #[command(alias = "ls")]
    List,

    /// Toggle a task's completed flag
    #[command(alias = "toggle")]
    Done {
        /// Task id
        id: i64,
    },

    /// Change a task's text
    Edit {
        /// Task id
        id: i64,

        /// New text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Delete a task
    #[command(alias = "delete")]
    Rm {
        /// Task id
        id: i64,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings
    Show,

    /// Change settings; values below 1 are raised to 1
    Set {
        /// Focus duration in minutes
        #[arg(long, value_name = "MINS", allow_hyphen_values = true)]
        pomodoro: Option<String>,

        /// Short break duration in minutes
        #[arg(long, value_name = "MINS", allow_hyphen_values = true)]
        short: Option<String>,

        /// Long break duration in minutes
        #[arg(long, value_name = "MINS", allow_hyphen_values = true)]
        long: Option<String>,

        /// Focus sessions before a long break
        #[arg(long, value_name = "N", allow_hyphen_values = true)]
        goal: Option<String>,

        /// Start breaks automatically
        #[arg(long, value_name = "BOOL")]
        auto_breaks: Option<bool>,

        /// Start focus sessions automatically after a break
        #[arg(long, value_name = "BOOL")]
        auto_pomodoros: Option<bool>,

        /// Alarm sound: bell, digital, kitchen, bird
        #[arg(long, value_parser = parse_sound)]
        sound: Option<AlarmSound>,

        /// Alarm volume between 0 and 1
        #[arg(long)]
        volume: Option<f64>,
    },
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str(s).ok_or_else(|| format!("unknown mode '{}' (focus, short, long)", s))
}

fn parse_sound(s: &str) -> Result<AlarmSound, String> {
    AlarmSound::from_str(s)
        .ok_or_else(|| format!("unknown sound '{}' (bell, digital, kitchen, bird)", s))
}

// ANSI color codes
const RED: &str = "\x1b[0;31m";
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[0;33m";
const CYAN: &str = "\x1b[0;36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const NC: &str = "\x1b[0m";

/// Check if stdout is a TTY and colors should be used
fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Conditionally apply color
fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

fn mode_color(mode: Mode) -> &'static str {
    match mode {
        Mode::Focus => RED,
        Mode::ShortBreak => CYAN,
        Mode::LongBreak => GREEN,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let config = Config::load_or_default(&paths);
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data_dir(&paths));
    tracing::debug!(data_dir = %data_dir.display(), "resolved data directory");

    let storage = FileStorage::new(&data_dir)?;
    let store = PomoStore::new(Box::new(storage));

    match cli.command {
        Some(Commands::Run { mode, start }) => run_timer(store, &config, &paths, mode, start),
        Some(Commands::Task { action }) => cmd_task(&store, action),
        Some(Commands::Settings { action }) => cmd_settings(&store, action),
        Some(Commands::Stats { json }) => cmd_stats(&store, json),
        None => run_timer(store, &config, &paths, Mode::Focus, false),
    }
}

/// Run the interactive timer until the user quits
fn run_timer(store: PomoStore, config: &Config, paths: &Paths, mode: Mode, start: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    rt.block_on(async {
        let (scheduler, ticks) = TokioScheduler::new(config.tick_interval());
        let timer = Timer::load(Ports {
            store,
            scheduler: Box::new(scheduler),
            alarm: Arc::new(SoundFilePlayer::new(config.sounds_dir(paths))),
            notifier: Arc::new(DesktopNotifier::new(config.notifications)),
            clock: Box::new(SystemClock),
        });
        timer_loop(timer, ticks, mode, start).await
    })
}

/// Single-task event loop over ticks, stdin lines and Ctrl-C
async fn timer_loop(
    timer: Timer,
    mut ticks: tokio::sync::mpsc::UnboundedReceiver<TickHandle>,
    mode: Mode,
    start: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut repl = Repl::new(timer, Display::new());
    repl.open(mode, start);

    loop {
        tokio::select! {
            Some(handle) = ticks.recv() => repl.on_tick(handle),
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if repl.on_line(&line) == Flow::Quit {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    repl.close();
    Ok(())
}

const SWITCH_PROMPT: &str = "Timer is running. Switch modes? [y/N] ";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive state around the timer.
///
/// A mode switch that needs confirmation leaves the question open and takes
/// the next line as the answer, so ticks keep counting while it is pending.
struct Repl {
    timer: Timer,
    display: Display,
    pending_switch: Option<Mode>,
}

impl Repl {
    fn new(timer: Timer, display: Display) -> Self {
        Self {
            timer,
            display,
            pending_switch: None,
        }
    }

    fn open(&mut self, mode: Mode, start: bool) {
        if mode != Mode::Focus {
            self.timer.switch_mode(mode, || true);
        }
        if start {
            self.timer.toggle_run();
        }

        println!("{}", color(BOLD, "POMODARIO"));
        println!("Type '?' and press Enter for keys.");
        println!();
        self.redraw();
    }

    fn on_tick(&mut self, handle: TickHandle) {
        match self.timer.handle_tick(handle) {
            Ok(TickOutcome::Expired(expiry)) => {
                self.display.line(&format!(
                    "{} {} complete. Up next: {}",
                    color(GREEN, "[done]"),
                    expiry.finished.label(),
                    expiry.next.label()
                ));
                if !expiry.auto_started {
                    self.display.line("Press Enter to start.");
                }
                self.redraw();
            }
            Ok(TickOutcome::Counted { .. }) if self.pending_switch.is_none() => self.redraw(),
            Ok(_) => {}
            Err(e) => {
                self.warn(&e);
                self.redraw();
            }
        }
    }

    fn on_line(&mut self, line: &str) -> Flow {
        if let Some(target) = self.pending_switch.take() {
            if is_yes(line) {
                self.timer.switch_mode(target, || true);
            }
            self.redraw();
            return Flow::Continue;
        }

        match parse_line(line) {
            LineCommand::Quit => return Flow::Quit,
            LineCommand::Toggle => self.timer.toggle_run(),
            LineCommand::Reset => self.timer.reset(),
            LineCommand::Switch(target) => {
                if self.timer.state().running {
                    self.pending_switch = Some(target);
                } else {
                    self.timer.switch_mode(target, || true);
                }
            }
            LineCommand::AddTask(text) => match self.timer.add_task(&text) {
                Ok(Some(task)) => self
                    .display
                    .line(&format!("{} Added task {}", color(GREEN, "[ok]"), task.id)),
                Ok(None) => self.display.line("Task text is empty"),
                Err(e) => self.warn(&e),
            },
            LineCommand::ToggleTask(id) => match self.timer.toggle_task(id) {
                Ok(true) => {}
                Ok(false) => self.display.line(&format!("No task with id {}", id)),
                Err(e) => self.warn(&e),
            },
            LineCommand::Tasks => {
                println!();
                print_tasks(self.timer.tasks());
            }
            LineCommand::Help => {
                println!();
                print_keys();
            }
            LineCommand::Unknown(cmd) => self
                .display
                .line(&format!("Unknown key '{}', type '?' for help", cmd)),
        }

        self.redraw();
        Flow::Continue
    }

    fn redraw(&self) {
        match self.pending_switch {
            Some(_) => self.display.prompt(SWITCH_PROMPT),
            None => self.display.status(&self.timer),
        }
    }

    fn warn(&self, e: &anyhow::Error) {
        self.display
            .line(&format!("{} {:#}", color(YELLOW, "[warn]"), e));
    }

    fn close(mut self) {
        self.timer.wait_for_alerts();
        println!();
        println!(
            "Today: {} pomodoros, this week: {}",
            self.timer.today_count(),
            self.timer.week_count()
        );
    }
}

/// A command typed into the running timer
#[derive(Debug, PartialEq)]
enum LineCommand {
    Toggle,
    Reset,
    Switch(Mode),
    AddTask(String),
    ToggleTask(i64),
    Tasks,
    Help,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> LineCommand {
    let trimmed = line.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    match head.to_lowercase().as_str() {
        "" | "p" | "space" | "pause" | "start" => LineCommand::Toggle,
        "r" | "reset" => LineCommand::Reset,
        "f" | "focus" => LineCommand::Switch(Mode::Focus),
        "s" | "short" => LineCommand::Switch(Mode::ShortBreak),
        "l" | "long" => LineCommand::Switch(Mode::LongBreak),
        "a" | "add" => LineCommand::AddTask(rest.to_string()),
        "d" | "done" => match rest.parse() {
            Ok(id) => LineCommand::ToggleTask(id),
            Err(_) => LineCommand::Unknown(trimmed.to_string()),
        },
        "t" | "tasks" => LineCommand::Tasks,
        "?" | "h" | "help" => LineCommand::Help,
        "q" | "quit" | "exit" => LineCommand::Quit,
        _ => LineCommand::Unknown(trimmed.to_string()),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Status line rendering; redraws in place on a terminal
struct Display {
    tty: bool,
}

impl Display {
    fn new() -> Self {
        Self { tty: use_colors() }
    }

    fn status(&self, timer: &Timer) {
        let line = status_line(timer);
        let mut stdout = std::io::stdout();
        if self.tty {
            let _ = write!(stdout, "\r\x1b[2K{}", line);
        } else {
            let _ = writeln!(stdout, "{}", line);
        }
        let _ = stdout.flush();
    }

    fn line(&self, text: &str) {
        if self.tty {
            print!("\r\x1b[2K");
        }
        println!("{}", text);
    }

    /// Replaces the status line with a question awaiting an answer line
    fn prompt(&self, text: &str) {
        let mut stdout = std::io::stdout();
        if self.tty {
            let _ = write!(stdout, "\r\x1b[2K{}", text);
        } else {
            let _ = writeln!(stdout, "{}", text);
        }
        let _ = stdout.flush();
    }
}

fn status_line(timer: &Timer) -> String {
    let state = timer.state();
    let config = timer.config();
    let progress = timer.progress_percent();

    let run_state = if state.running {
        "running"
    } else if state.paused {
        "paused"
    } else {
        "stopped"
    };

    format!(
        "{} {} [{}] {:>3.0}%  Pomodoros: {} / {}  {}",
        color(mode_color(state.mode), &format!("{:<11}", state.mode.label())),
        color(BOLD, &format::clock(state.seconds_remaining)),
        format::progress_bar(progress, 20),
        progress,
        state.completed_focus_in_cycle,
        config.pomodoro_goal,
        color(DIM, run_state),
    )
}

fn print_keys() {
    println!("  {}  start, pause or resume", color(CYAN, "p / Enter"));
    println!("  {}          reset the current mode", color(CYAN, "r"));
    println!("  {}  focus, short break, long break", color(CYAN, "f / s / l"));
    println!("  {}     add a task", color(CYAN, "a TEXT"));
    println!("  {}       toggle a task done", color(CYAN, "d ID"));
    println!("  {}          show tasks", color(CYAN, "t"));
    println!("  {}          quit", color(CYAN, "q"));
}

fn print_tasks(tasks: &TaskList) {
    if tasks.is_empty() {
        println!("No tasks yet. Add one with: pomodario task add TEXT");
        return;
    }

    println!(
        "{}",
        color(
            BOLD,
            &format!("Tasks ({} open, {} done)", tasks.pending_count(), tasks.completed_count())
        )
    );
    for task in tasks.iter() {
        let created: DateTime<Local> = task.created_at.into();
        let mark = if task.completed {
            color(GREEN, "[x]")
        } else {
            "[ ]".to_string()
        };
        println!(
            "  {} {}  {}  {}",
            mark,
            task.id,
            format::truncate(&task.text, 60),
            color(DIM, &created.format("%Y-%m-%d %H:%M").to_string())
        );
    }
}

/// Task list subcommands
fn cmd_task(store: &PomoStore, action: TaskAction) -> Result<()> {
    let mut tasks = store.load_tasks();

    match action {
        TaskAction::List => {
            print_tasks(&tasks);
            return Ok(());
        }
        TaskAction::Add { text } => {
            let text = text.join(" ");
            let Some(task) = tasks.add(&text, SystemClock.now()).cloned() else {
                bail!("Task text is empty");
            };
            store.save_tasks(&tasks)?;
            println!("{} Added task {}: {}", color(GREEN, "[ok]"), task.id, task.text);
        }
        TaskAction::Done { id } => {
            if !tasks.toggle_complete(id) {
                bail!("No task with id {}", id);
            }
            store.save_tasks(&tasks)?;
            let done = tasks.get(id).map(|t| t.completed).unwrap_or(false);
            let verb = if done { "Completed" } else { "Reopened" };
            println!("{} {} task {}", color(GREEN, "[ok]"), verb, id);
        }
        TaskAction::Edit { id, text } => {
            let text = text.join(" ");
            if text.trim().is_empty() {
                bail!("Task text is empty");
            }
            if !tasks.update(id, TaskPatch::text(text)) {
                bail!("No task with id {}", id);
            }
            store.save_tasks(&tasks)?;
            println!("{} Updated task {}", color(GREEN, "[ok]"), id);
        }
        TaskAction::Rm { id } => {
            if !tasks.delete(id) {
                bail!("No task with id {}", id);
            }
            store.save_tasks(&tasks)?;
            println!("{} Deleted task {}", color(GREEN, "[ok]"), id);
        }
    }

    Ok(())
}

/// Settings subcommands
fn cmd_settings(store: &PomoStore, action: Option<SettingsAction>) -> Result<()> {
    let current = store.load_settings();

    let Some(SettingsAction::Set {
        pomodoro,
        short,
        long,
        goal,
        auto_breaks,
        auto_pomodoros,
        sound,
        volume,
    }) = action
    else {
        print_settings(&current);
        return Ok(());
    };

    let mut updated = current.clone();
    if let Some(v) = pomodoro {
        updated.pomodoro_minutes = pomodario::settings::coerce_minutes(&v);
    }
    if let Some(v) = short {
        updated.short_break_minutes = pomodario::settings::coerce_minutes(&v);
    }
    if let Some(v) = long {
        updated.long_break_minutes = pomodario::settings::coerce_minutes(&v);
    }
    if let Some(v) = goal {
        updated.pomodoro_goal = pomodario::settings::coerce_minutes(&v);
    }
    if let Some(v) = auto_breaks {
        updated.auto_start_breaks = v;
    }
    if let Some(v) = auto_pomodoros {
        updated.auto_start_pomodoros = v;
    }
    if let Some(v) = sound {
        updated.alarm_sound = v;
    }
    if let Some(v) = volume {
        updated.alarm_volume = v;
    }
    let updated = updated.normalized();

    if updated == current {
        println!("{} Settings unchanged", color(CYAN, "[info]"));
    } else {
        store.save_settings(&updated)?;
        println!("{} Settings saved", color(GREEN, "[ok]"));
    }
    println!();
    print_settings(&updated);
    Ok(())
}

fn print_settings(config: &SessionConfig) {
    let on_off = |b: bool| if b { "on" } else { "off" };

    println!("{}", color(BOLD, "Timer Settings"));
    println!();
    println!("  {}          {} minutes", color(CYAN, "Pomodoro:"), config.pomodoro_minutes);
    println!("  {}       {} minutes", color(CYAN, "Short Break:"), config.short_break_minutes);
    println!("  {}        {} minutes", color(CYAN, "Long Break:"), config.long_break_minutes);
    println!("  {} {} pomodoros", color(CYAN, "Long Break After:"), config.pomodoro_goal);
    println!("  {}  {}", color(CYAN, "Auto-start Breaks:"), on_off(config.auto_start_breaks));
    println!("  {}  {}", color(CYAN, "Auto-start Focus:"), on_off(config.auto_start_pomodoros));
    println!(
        "  {}             {} ({:.0}%)",
        color(CYAN, "Alarm:"),
        config.alarm_sound.label(),
        config.alarm_volume * 100.0
    );
}

/// Show focus statistics
fn cmd_stats(store: &PomoStore, json: bool) -> Result<()> {
    let stats = store.load_stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_stats(&stats, SystemClock.today());
    Ok(())
}

fn print_stats(stats: &StatsRecord, today: chrono::NaiveDate) {
    println!("{}", color(BOLD, "Your Statistics"));
    println!();
    println!("  {}     {}", color(CYAN, "Total Pomodoros:"), stats.completed_pomodoros);
    println!(
        "  {}    {}",
        color(CYAN, "Total Focus Time:"),
        format::duration(stats.total_focus_time)
    );
    println!("  {}   {}", color(CYAN, "Today's Pomodoros:"), stats.today_count(today));
    println!("  {}         {}", color(CYAN, "This Week:"), stats.week_count(today));
    println!();

    println!("{}", color(BOLD, "Daily Pomodoros"));
    println!();
    let series = stats.daily_series(today, 7);
    let max = series.iter().map(|d| d.count).max().unwrap_or(0);
    for day in &series {
        let width = if max == 0 {
            0
        } else {
            ((day.count as f64 / max as f64) * 30.0).round() as usize
        };
        println!(
            "  {} {} {}",
            day.label,
            color(RED, &"\u{2588}".repeat(width)),
            day.count
        );
    }

    let achievements = stats.achievements(today);
    println!();
    println!("{}", color(BOLD, "Achievements"));
    println!();
    if achievements.is_empty() {
        println!("  Complete your first pomodoro to unlock achievements.");
    }
    for achievement in achievements {
        println!(
            "  {}  {}",
            color(YELLOW, achievement.title()),
            color(DIM, achievement.description())
        );
    }
}
