use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::catalog::Catalog;
use crate::cli::args::CliArgs;
use crate::cli::commands::{self, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::controller::{LoadState, Theme, UiEvent, ViewController, ViewMode};
use crate::loader::{self, DataLoader, LoadError, LoaderOptions, Source};
use crate::output::{self, OutputFormat};
use crate::prefs::{self, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
use crate::query::SortKey;
use crate::stats::{StatsPolicy, StatsSource};

const DEFAULT_WORKERS: usize = 2;

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = format!(
        "{} {}\n",
        cmd.get_name(),
        cmd.get_version().unwrap_or_default()
    );
    if let Some(long_about) = cmd.get_long_about().or_else(|| cmd.get_about()) {
        out.push_str(&format!("\n{long_about}\n"));
    }
    out.push_str(&format!("\nUsage: {} [OPTIONS]\n", cmd.get_name()));

    // headings in first-seen order
    let mut sections: Vec<(&str, Vec<&clap::Arg>)> = Vec::new();
    for arg in cmd.get_arguments().filter(|a| !a.is_hide_set()) {
        let heading = arg.get_help_heading().unwrap_or("Options");
        match sections.iter_mut().find(|(h, _)| *h == heading) {
            Some((_, args)) => args.push(arg),
            None => sections.push((heading, vec![arg])),
        }
    }

    for (heading, args) in sections {
        out.push_str(&format!("\n{heading}:\n"));
        for arg in args {
            let mut names: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                names.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                names.push(format!("--{long}"));
            }
            for alias in arg.get_visible_aliases().unwrap_or_default() {
                let alias = format!("--{alias}");
                if !names.contains(&alias) {
                    names.push(alias);
                }
            }
            let mut flags = names.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                flags.push_str(&format!(" <{value_name}>"));
            }
            out.push_str(&format!("  {flags}\n"));
            if let Some(help) = arg.get_help() {
                let help = help.to_string();
                if !help.trim().is_empty() {
                    out.push_str(&format!("          {}\n", help.trim()));
                }
            }
        }
    }
    out
}

#[derive(Clone, Debug)]
struct RunConfig {
    loader: LoaderOptions,
    policy: StatsPolicy,
    workers: usize,
    no_color: bool,
    output: Option<String>,
    output_format: OutputFormat,
    prefs_path: Option<PathBuf>,
    view: Option<ViewMode>,
    search: Option<String>,
    sort: Vec<SortKey>,
    source: Option<StatsSource>,
    toggle_theme: bool,
    interactive: bool,
}

impl RunConfig {
    // the CLI view flags, replayed as if the user clicked them after load
    fn startup_events(&self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        if let Some(mode) = self.view {
            events.push(UiEvent::SetView(mode));
        }
        if let Some(query) = self.search.as_ref() {
            events.push(UiEvent::Search(query.clone()));
        }
        events.extend(self.sort.iter().copied().map(UiEvent::ClickSort));
        if let Some(source) = self.source {
            events.push(UiEvent::SetStatsSource(source));
        }
        if self.toggle_theme {
            events.push(UiEvent::ToggleTheme);
        }
        events
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let base = args
        .base
        .or(cfg.base)
        .unwrap_or_else(|| ".".to_string());
    let source = Source::parse(&base).map_err(|e| e.to_string())?;
    let timeout = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(loader::DEFAULT_TIMEOUT_SECONDS);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let loader = LoaderOptions {
        source,
        collection_file: args
            .collection_file
            .or(cfg.collection_file)
            .unwrap_or_else(|| loader::DEFAULT_COLLECTION_FILE.to_string()),
        wantlist_file: args
            .wantlist_file
            .or(cfg.wantlist_file)
            .unwrap_or_else(|| loader::DEFAULT_WANTLIST_FILE.to_string()),
        timeout_seconds: timeout,
    };

    let mut policy = StatsPolicy::default();
    if let Some(top) = args.top_genres.or(cfg.top_genres) {
        policy.top_genres = top.max(1);
    }

    let workers = args
        .workers
        .or(cfg.workers)
        .unwrap_or(DEFAULT_WORKERS)
        .max(1);

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json, or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    // escape codes do not belong in files
    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false) || output.is_some()
    };

    let prefs_path = if args.no_prefs {
        None
    } else {
        args.prefs
            .or(cfg.preferences)
            .map(|p| config::expand_tilde(&p))
            .or_else(prefs::default_preferences_path)
    };

    Ok(RunConfig {
        loader,
        policy,
        workers,
        no_color,
        output,
        output_format,
        prefs_path,
        view: args.view.as_deref().and_then(ViewMode::parse),
        search: args.search,
        sort: args.sort.iter().filter_map(|k| SortKey::parse(k)).collect(),
        source: args.source.as_deref().and_then(StatsSource::parse),
        toggle_theme: args.toggle_theme,
        interactive: args.interactive,
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,recordshelf={level}")));
    // stdout carries the rendered screen
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn open_preferences(path: Option<&PathBuf>) -> Box<dyn PreferenceStore> {
    match path {
        Some(path) => {
            let store = FilePreferenceStore::open(path.clone());
            tracing::debug!("preferences: {}", store.path().display());
            Box::new(store)
        }
        None => Box::new(MemoryPreferenceStore::new()),
    }
}

async fn load_catalog(loader: &DataLoader, spinner: bool) -> Result<Catalog, LoadError> {
    if !spinner {
        return loader.load().await;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Loading...");
    pb.enable_steady_tick(Duration::from_millis(120));
    let result = loader.load().await;
    pb.finish_and_clear();
    result
}

async fn emit(controller: &mut ViewController, run: &RunConfig) -> Result<(), String> {
    let screen = controller.render();
    let rendered = output::render(&screen, run.output_format);

    match run.output.as_ref() {
        Some(path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output file: {e}"))?;
            tracing::info!("wrote {} view to {path}", screen.view.as_str());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
        }
    }
    Ok(())
}

async fn run_interactive(
    controller: &mut ViewController,
    loader: &DataLoader,
    run: &RunConfig,
) -> Result<(), String> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{}", "type 'help' for commands".dimmed());

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("failed to read stdin: {e}"))?
    {
        match commands::parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => {
                eprint!("{}", commands::HELP);
                continue;
            }
            Ok(Some(Command::Reload)) => {
                let result = load_catalog(loader, true).await;
                controller.finish_load(result);
            }
            Ok(Some(Command::Event(event))) => controller.apply(event),
            Err(e) => {
                eprintln!("{}", e.red());
                continue;
            }
        }
        emit(controller, run).await?;
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let loader = DataLoader::new(run.loader.clone()).map_err(|e| e.to_string())?;
    let mut controller = ViewController::new(
        open_preferences(run.prefs_path.as_ref()),
        run.policy.clone(),
    );
    controller.restore_preferences(Theme::from_terminal().unwrap_or(Theme::Light));

    let result = load_catalog(&loader, run.interactive).await;
    controller.finish_load(result);
    for event in run.startup_events() {
        controller.apply(event);
    }
    emit(&mut controller, &run).await?;

    if run.interactive {
        return run_interactive(&mut controller, &loader, &run).await;
    }
    match controller.load_state() {
        LoadState::Failed(message) => Err(format!("failed to load data: {message}")),
        _ => Ok(()),
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine home directory for config".to_string())?;
        config::ensure_default_config_file(&path)?;
        println!("config: {}", path.display());
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
