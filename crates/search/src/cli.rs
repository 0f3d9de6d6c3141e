use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use purr_search::{
    default_config_path, default_export_name, event_json, format_results, Config, CsvSink,
    HistoryStore, JsonHistory, ScanView,
};
use purr_search_core::{classify_file, ScanEvent, ScanOutcome, SearchRequest, Searcher};

const TICK_MS: u64 = 80;

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(":: {spinner} ━{bar:30}━ {pos:>3}% {wide_msg}")
        .expect("progress template is valid")
        .tick_chars("▏▎▍▌▋▊▉█▉▋▌▍▎")
        .progress_chars("━━░")
}

#[derive(Parser)]
#[command(name = "purr-search")]
#[command(version)]
#[command(about = "Search documents, spreadsheets, PDFs, diagrams and logs for a term")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "PURR_SEARCH_CONFIG",
        help = "Config file [default: <config dir>/purr-search/config.json]"
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every supported file under a directory
    Search {
        #[arg(help = "Term to look for")]
        term: String,
        #[arg(short, long, help = "Directory to search [default: last used, then current dir]")]
        dir: Option<PathBuf>,
        #[arg(long, help = "Match case exactly in log files")]
        case_sensitive: bool,
        #[arg(long, help = "Characters of context around plain-text matches")]
        context: Option<usize>,
        #[arg(
            long,
            num_args = 0..=1,
            help = "Export results as CSV [default: search_results_<date>.csv]"
        )]
        export: Option<Option<PathBuf>>,
        #[arg(long, help = "Emit scan events as JSON lines")]
        json: bool,
        #[arg(long, help = "Do not record the term or directory in history")]
        no_history: bool,
    },
    /// Show which extraction strategy applies to each file
    Classify {
        #[arg(required = true, help = "Files to classify")]
        files: Vec<PathBuf>,
    },
    /// Show or clear recent search terms
    History {
        #[arg(long, help = "Forget all terms and the last directory")]
        clear: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(help = "Shell to generate for (bash, zsh, fish, powershell)")]
        shell: Shell,
    },
}

struct SearchArgs {
    term: String,
    dir: Option<PathBuf>,
    case_sensitive: bool,
    context: Option<usize>,
    export: Option<Option<PathBuf>>,
    json: bool,
    no_history: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            term,
            dir,
            case_sensitive,
            context,
            export,
            json,
            no_history,
        } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_search(
                SearchArgs {
                    term,
                    dir,
                    case_sensitive,
                    context,
                    export,
                    json,
                    no_history,
                },
                &config,
            )
        }
        Commands::Classify { files } => cmd_classify(&files),
        Commands::History { clear } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_history(&config, clear)
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "purr-search", &mut io::stdout());
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => Config::load_or_default(&path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn open_history(config: &Config) -> Result<JsonHistory> {
    let path = config
        .history_file()
        .context("could not determine a config directory for history")?;
    Ok(JsonHistory::with_limit(path, config.history_limit))
}

fn resolve_root(dir: Option<PathBuf>, history: Option<&JsonHistory>) -> Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir);
    }

    let remembered = history
        .and_then(|h| h.load_last_path().ok().flatten())
        .filter(|p| p.is_dir());
    match remembered {
        Some(path) => {
            eprintln!("Searching last used directory {}", path.display());
            Ok(path)
        }
        None => Ok(std::env::current_dir()?),
    }
}

fn cmd_search(args: SearchArgs, config: &Config) -> Result<()> {
    let mut history = open_history(config).ok();
    let root = resolve_root(args.dir, history.as_ref())?;

    let mut options = config.search_options();
    if let Some(context) = args.context {
        options.context_chars = context;
    }
    options.case_sensitive = args.case_sensitive;

    let request = SearchRequest::new(&root, &args.term)?.with_options(options);

    if let Some(history) = history.as_mut().filter(|_| !args.no_history) {
        if let Err(e) = history
            .save_term(&args.term)
            .and_then(|_| history.save_last_path(&root))
        {
            warn!(error = %e, "could not update history");
        }
    }

    let mut searcher = Searcher::new();
    let rx = searcher
        .start(request)
        .context("a search is already running")?;
    if let Some(token) = searcher.cancellation_token() {
        ctrlc::set_handler(move || token.cancel()).context("installing Ctrl-C handler")?;
    }

    let pb = if args.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(100)
    };
    pb.set_style(bar_style());
    pb.enable_steady_tick(Duration::from_millis(TICK_MS));

    let mut view = ScanView::new();
    for event in rx {
        if args.json {
            println!("{}", event_json(&event)?);
        } else {
            match &event {
                ScanEvent::Progress { percent, .. } => pb.set_position(u64::from(*percent)),
                ScanEvent::StatusBar(message) => pb.set_message(message.clone()),
                ScanEvent::Status(message) | ScanEvent::Error(message) => pb.println(message),
                ScanEvent::FileResult(result) => pb.println(format!(
                    "  [+] {} ({} matches)",
                    result.file_name, result.match_count
                )),
                ScanEvent::Complete | ScanEvent::Cancelled => {}
            }
        }
        view.apply(&event);
    }
    pb.finish_and_clear();

    let outcome = searcher.wait();

    if !args.json && !view.cancelled {
        print!("{}", format_results(view.results.results(), &args.term));
    }

    if let Some(target) = args.export {
        let path = target.unwrap_or_else(|| PathBuf::from(default_export_name()));
        let mut sink = CsvSink::create(&path)
            .with_context(|| format!("creating export {}", path.display()))?;
        let written = view.results.export_to(&mut sink)?;
        eprintln!("Exported {} results to {}", written, path.display());
    }

    match outcome {
        Some(ScanOutcome::Failed(message)) => anyhow::bail!(message),
        _ => Ok(()),
    }
}

fn cmd_classify(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let classification = classify_file(file);
        let kind = if classification.is_log { " (log)" } else { "" };
        println!("{:<6} {}{}", classification.strategy, file.display(), kind);
    }
    Ok(())
}

fn cmd_history(config: &Config, clear: bool) -> Result<()> {
    let mut history = open_history(config)?;

    if clear {
        history.clear_all()?;
        println!("History cleared.");
        return Ok(());
    }

    let terms = history.load_recent_terms()?;
    if terms.is_empty() {
        println!("No recent searches.");
    } else {
        println!("Recent searches:");
        for (i, term) in terms.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, term);
        }
    }

    if let Some(path) = history.load_last_path()? {
        println!("\nLast directory: {}", path.display());
    }

    Ok(())
}
