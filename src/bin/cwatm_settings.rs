//! Command-line front-end for the settings engine.
//!
//! ```text
//! cwatm-settings view settings.ini --collapse '[OPTIONS]'
//! cwatm-settings fields settings.ini
//! cwatm-settings set-dates settings.ini --spin 01/01/1990 --output new.ini
//! cwatm-settings option settings.ini OPTIONS gridSizeUserDefined true
//! cwatm-settings resolve settings.ini '$(FILE_PATHS:PathRoot)/ldd.map'
//! cwatm-settings run settings.ini --model cwatm --timeout 3600
//! ```
//!
//! Logging goes to stderr; pass `-v` or `-vv` for more.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use cwatm_settings::ansi::{self, AnsiWriter, ColorMode};
use cwatm_settings::runner::OutputStream;
use cwatm_settings::{
    CommandRunner, EditSession, EngineConfig, Error, FileStore, Result, RunEvent, RunHandle,
    RunOutcome, RunRequest, SimulationDates, StopOutcome, Style, parse_date,
};

#[derive(Parser, Debug)]
#[command(name = "cwatm-settings", version, about = "Inspect and edit CWatM settings files")]
struct Cli {
    /// Engine configuration (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the display form with section markers.
    View {
        file: PathBuf,
        /// Section to collapse, e.g. `[OPTIONS]`; repeatable.
        #[arg(long)]
        collapse: Vec<String>,
        #[arg(long)]
        collapse_all: bool,
        #[arg(long, value_enum, default_value_t)]
        color: ColorChoice,
    },
    /// List sections with their line counts.
    Sections { file: PathBuf },
    /// Show date and path fields.
    Fields { file: PathBuf },
    /// Rewrite the simulation dates, keeping start <= spin-up <= end.
    SetDates {
        file: PathBuf,
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        spin: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
        /// Write here instead of back to FILE.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Set `key = value` lines, matching keys case-insensitively.
    Set {
        file: PathBuf,
        /// Assignments as KEY=VALUE.
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Switch a boolean option.
    Option {
        file: PathBuf,
        /// Section name with or without brackets.
        section: String,
        key: String,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve `$(Section:Key)` placeholders in a path.
    Resolve { file: PathBuf, path: String },
    /// Run the model on a settings file, streaming its output.
    Run {
        file: PathBuf,
        /// Model executable; defaults to `run.program` from the configuration.
        #[arg(long)]
        model: Option<PathBuf>,
        /// Stop the run after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("`{s}` is not a dd/mm/yyyy or yyyy-mm-dd date"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn bracketed(section: &str) -> String {
    if section.starts_with('[') {
        section.to_string()
    } else {
        format!("[{section}]")
    }
}

fn open(store: &mut FileStore, file: &Path) -> Result<EditSession> {
    let mut session = EditSession::new();
    store.open_session(&mut session, file)?;
    Ok(session)
}

fn save(store: &mut FileStore, session: &mut EditSession, output: Option<&Path>) -> Result<()> {
    let report = store.save_session(session, output)?;
    println!("{}", report.message());
    Ok(())
}

/// Drive one model run to completion, printing its output as it arrives.
fn run_model(
    runner: CommandRunner,
    request: RunRequest,
    timeout: Option<Duration>,
    grace: Duration,
) -> Result<RunOutcome> {
    let mut handle = RunHandle::spawn(runner, request)?;
    let deadline = timeout.map(|t| Instant::now() + t);
    loop {
        for event in handle.poll() {
            match event {
                RunEvent::Progress(percent) => tracing::info!(percent, "model progress"),
                RunEvent::Output {
                    stream: OutputStream::Stdout,
                    line,
                } => println!("{line}"),
                RunEvent::Output { line, .. } => eprintln!("{line}"),
                RunEvent::Finished(_) => {}
            }
        }
        if let Some(result) = handle.result() {
            return result.clone().map_err(Error::Run);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!(grace_ms = grace.as_millis(), "timeout reached; stopping model");
            return match handle.stop(grace) {
                StopOutcome::Finished(result) => result.map_err(Error::Run),
                StopOutcome::Abandoned => {
                    Err(Error::Run("model did not stop within the grace period".into()))
                }
            };
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut store = FileStore::new();
    let stdout = std::io::stdout();

    match cli.command {
        Command::View {
            file,
            collapse,
            collapse_all,
            color,
        } => {
            let mut session = open(&mut store, &file)?;
            if collapse_all {
                session.collapse_all()?;
            }
            for id in &collapse {
                session.collapse(&bracketed(id))?;
            }
            let mode = match color {
                ColorChoice::Always => ColorMode::TrueColor,
                ColorChoice::Never => ColorMode::NoColor,
                ColorChoice::Auto if stdout.is_terminal() => ColorMode::TrueColor,
                ColorChoice::Auto => ColorMode::NoColor,
            };
            let mut theme = config.theme()?;
            if config.theme.default.is_none() {
                // keep the terminal's own foreground for unstyled text
                theme = theme.with_default_style(Style::NONE);
            }
            let mut writer = AnsiWriter::with_color_mode(stdout.lock(), mode);
            ansi::render_display(&mut writer, session.display(), &theme);
            writer.write_str("\n");
            writer.flush()?;
        }
        Command::Sections { file } => {
            let session = open(&mut store, &file)?;
            let doc = session.document();
            let duplicates = doc.duplicate_ids();
            for section in doc.sections() {
                let flag = if duplicates.contains(section.id()) {
                    format!(" (occurrence {})", section.occurrence() + 1)
                } else {
                    String::new()
                };
                println!("{:<32} {:>5} lines{flag}", section.id(), section.lines().len());
            }
        }
        Command::Fields { file } => {
            let session = open(&mut store, &file)?;
            let fields = session.fields();
            let dates = fields.simulation_dates();
            let show = |name: &str, literal: &Option<String>, parsed: Option<NaiveDate>| {
                let parsed = parsed.map_or_else(|| "-".to_string(), |d| d.to_string());
                println!("{name:<10} {:<24} {parsed}", literal.as_deref().unwrap_or("-"));
            };
            show("StepStart", &fields.dates.stepstart, dates.start);
            show("SpinUp", &fields.dates.spinup, dates.spin);
            show("StepEnd", &fields.dates.stepend, dates.end);
            println!("{:<10} {}", "PathOut", fields.paths.pathout.as_deref().unwrap_or("-"));
            println!("{:<10} {}", "MaskMap", fields.paths.maskmap.as_deref().unwrap_or("-"));
        }
        Command::SetDates {
            file,
            start,
            spin,
            end,
            output,
        } => {
            let mut session = open(&mut store, &file)?;
            let fields = session.fields();
            let current = fields.simulation_dates();
            let wanted = SimulationDates {
                start: start.or(current.start),
                spin: spin.or(current.spin),
                end: end.or(current.end),
            };
            let today = chrono::Local::now().date_naive();
            let range = wanted.normalized(today);
            if !range.differs_from(&fields.dates, &config.dates.output_format) {
                println!("Dates unchanged");
                return Ok(());
            }
            session.set_dates(&range, &config.dates.output_format);
            save(&mut store, &mut session, output.as_deref())?;
        }
        Command::Set {
            file,
            assignments,
            output,
        } => {
            let mut session = open(&mut store, &file)?;
            if !session.set_fields(&assignments) {
                tracing::warn!("no matching keys; file left as is");
            }
            save(&mut store, &mut session, output.as_deref())?;
        }
        Command::Option {
            file,
            section,
            key,
            value,
            output,
        } => {
            let mut session = open(&mut store, &file)?;
            let section = bracketed(&section);
            if !session.set_option(&section, &key, value) {
                println!("No option {key} in {section}; file left as is");
                return Ok(());
            }
            save(&mut store, &mut session, output.as_deref())?;
        }
        Command::Resolve { file, path } => {
            let session = open(&mut store, &file)?;
            let doc = session.clean_document();
            let resolution = config.resolver(&doc).resolve(&path);
            for warning in &resolution.unresolved {
                eprintln!("warning: {warning}");
            }
            let mut out = stdout.lock();
            writeln!(out, "{}", resolution.path)?;
        }
        Command::Run {
            file,
            model,
            timeout,
        } => {
            // an unreadable settings file fails here, before the model starts
            open(&mut store, &file)?;
            let program = model.or_else(|| config.run.program.clone()).ok_or_else(|| {
                Error::Config("no model program: pass --model or set run.program".into())
            })?;
            let outcome = run_model(
                CommandRunner::new(program),
                config.run_request(&file),
                timeout.map(Duration::from_secs),
                config.stop_grace(),
            )?;
            if !outcome.success {
                return Err(Error::Run("model reported failure".into()));
            }
            match outcome.last_discharge {
                Some(discharge) => println!("Model run finished; last discharge {discharge}"),
                None => println!("Model run finished"),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
