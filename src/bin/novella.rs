use std::{
    collections::HashSet,
    io::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "novella", version)]
struct Cli {
    /// Log verbosity (logs go to stderr).
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a story and report unresolvable asset references.
    Check(CheckArgs),
    /// Print the resolved slide state at one cursor.
    State(StateArgs),
    /// Advance from the beginning to the end, printing every cursor and its state.
    Play(PlayArgs),
    /// Restore a cursor from a URL query and print its state.
    Url(UrlArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct StateArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scene index (0-based).
    #[arg(long)]
    scene: usize,

    /// Slide index within the scene (0-based).
    #[arg(long)]
    slide: usize,

    /// Step index, `-1` for the initial state.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    step: i64,

    /// Asset directory; when given, print the render view instead of the raw state.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Pretty-print JSON.
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Step to land on when entering a slide.
    #[arg(long, value_enum, default_value_t = EntryChoice::Initial)]
    entry: EntryChoice,

    /// Resolve without the memo cache.
    #[arg(long)]
    no_memo: bool,
}

#[derive(Parser, Debug)]
struct UrlArgs {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// URL carrying `scene`, `slide`, `step` and `complete` query parameters.
    #[arg(long)]
    url: String,

    /// Pretty-print JSON.
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EntryChoice {
    Initial,
    FirstStep,
}

impl From<EntryChoice> for novella::EntryStep {
    fn from(v: EntryChoice) -> Self {
        match v {
            EntryChoice::Initial => novella::EntryStep::Initial,
            EntryChoice::FirstStep => novella::EntryStep::FirstStep,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(v: LogLevel) -> Self {
        match v {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::State(args) => cmd_state(args),
        Command::Play(args) => cmd_play(args),
        Command::Url(args) => cmd_url(args),
    }
}

fn read_story(path: &Path) -> anyhow::Result<novella::Story> {
    let story = novella::Story::from_path(path)
        .with_context(|| format!("load story '{}'", path.display()))?;
    Ok(story)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{s}");
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let story = read_story(&args.in_path)?;
    story
        .validate()
        .with_context(|| format!("validate story '{}'", args.in_path.display()))?;

    let warnings = story.lint_assets();
    for w in &warnings {
        eprintln!("warning: {w}");
    }
    eprintln!(
        "ok: {} scene(s), {} slide(s), {} asset warning(s)",
        story.scenes.len(),
        story.slide_count(),
        warnings.len()
    );
    Ok(())
}

fn cmd_state(args: StateArgs) -> anyhow::Result<()> {
    let story = read_story(&args.in_path)?;
    let cursor = novella::Cursor::new(args.scene, args.slide, args.step);
    let state = novella::Resolver::resolve(&story, cursor)
        .with_context(|| format!("resolve cursor {cursor}"))?;

    match &args.assets {
        Some(root) => {
            let catalog = novella::AssetCatalog::scan(root)
                .with_context(|| format!("scan assets '{}'", root.display()))?;
            let view = novella::RenderView::project(&story, &state, &catalog);
            print_json(&view, args.pretty)
        }
        None => print_json(&state, args.pretty),
    }
}

#[derive(serde::Serialize)]
struct PlayLine<'a> {
    cursor: novella::Cursor,
    state: &'a novella::SlideState,
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let story = Arc::new(read_story(&args.in_path)?);
    let opts = novella::SessionOpts {
        entry: args.entry.into(),
        memoize: !args.no_memo,
    };
    let mut session = novella::Session::new(story, opts)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut seen = HashSet::new();
    while !session.is_complete() {
        if !seen.insert(session.cursor()) {
            anyhow::bail!(
                "playback revisits {} without completing; check the story's next pointers",
                session.cursor()
            );
        }
        let state = session.state()?;
        let line = PlayLine {
            cursor: session.cursor(),
            state: &state,
        };
        serde_json::to_writer(&mut out, &line)?;
        out.write_all(b"\n")?;
        session.advance()?;
    }

    if let Some(stats) = session.cache_stats() {
        tracing::info!(
            hits = stats.hits,
            misses = stats.misses,
            entries = stats.entries,
            "resolve cache"
        );
    }
    Ok(())
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct UrlReport {
    cursor: novella::Cursor,
    is_complete: bool,
    restored: bool,
    state: novella::SlideState,
}

fn cmd_url(args: UrlArgs) -> anyhow::Result<()> {
    let story = Arc::new(read_story(&args.in_path)?);
    let url = url::Url::parse(&args.url).with_context(|| format!("parse url '{}'", args.url))?;

    let mut session = novella::Session::new(story, novella::SessionOpts::default())?;
    let restored = session.restore_from_url(&url)?;
    let report = UrlReport {
        cursor: session.cursor(),
        is_complete: session.is_complete(),
        restored,
        state: session.state()?,
    };
    print_json(&report, args.pretty)
}
