use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueHint};
use env_logger::Env;
use log::LevelFilter;
use photomirror::{
    config::{default_settings_path, SettingsValidator},
    LogActivity, MirrorEngine, MirrorSettings,
};
use std::{path::{Path, PathBuf}, sync::Arc};
use tokio::sync::broadcast::error::RecvError;
#[derive(Parser, Debug)]
#[command(
    name = "pmirror",
    author,
    version,
    about = "Keep a local mirror of a slow photo repository",
    long_about = r#"
Photomirror - Local Mirror for Photo Repositories

Photomirror copies every JPEG photo from a repository directory (often a
network share) into a fast local mirror directory and keeps the two in step.
Changes are picked up from filesystem notifications and from a periodic
content sampler that catches silent overwrites.

EXAMPLES:
  pmirror sync /mnt/photos ~/.cache/photos            # One sync pass
  pmirror watch /mnt/photos ~/.cache/photos           # Sync, then follow changes
  pmirror status /mnt/photos ~/.cache/photos          # Mirror statistics as JSON
  pmirror resolve /mnt/photos ~/.cache/photos a.jpg   # Local path of a photo
  pmirror settings show                               # Display current settings

For more information on any command, use: pmirror <command> --help
    "#
)]
struct Opt {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        help = "Settings file to use",
        long_help = "JSON settings file. Defaults to ~/.photomirror/settings.json; \
                    built-in defaults apply when the file does not exist."
    )]
    config: Option<PathBuf>,
}
#[derive(Subcommand, Debug)]
enum Commands {
    Sync {
        #[arg(
            value_name = "REPO",
            value_hint = ValueHint::DirPath,
            help = "Repository directory holding the photos"
        )]
        repository: PathBuf,
        #[arg(
            value_name = "MIRROR",
            value_hint = ValueHint::DirPath,
            help = "Local mirror directory (created when missing)"
        )]
        mirror: PathBuf,
    },
    Watch {
        #[arg(
            value_name = "REPO",
            value_hint = ValueHint::DirPath,
            help = "Repository directory holding the photos"
        )]
        repository: PathBuf,
        #[arg(
            value_name = "MIRROR",
            value_hint = ValueHint::DirPath,
            help = "Local mirror directory (created when missing)",
            long_help = "Local mirror directory. Sync events are printed to stdout \
                        as JSON lines until Ctrl-C is pressed."
        )]
        mirror: PathBuf,
    },
    Status {
        #[arg(value_name = "REPO", value_hint = ValueHint::DirPath)]
        repository: PathBuf,
        #[arg(value_name = "MIRROR", value_hint = ValueHint::DirPath)]
        mirror: PathBuf,
    },
    Resolve {
        #[arg(value_name = "REPO", value_hint = ValueHint::DirPath)]
        repository: PathBuf,
        #[arg(value_name = "MIRROR", value_hint = ValueHint::DirPath)]
        mirror: PathBuf,
        #[arg(
            value_name = "FILENAME",
            help = "Photo filename, matched case-insensitively",
            long_help = "Bare filename of the photo. Exits with status 1 when the \
                        photo is not present in the mirror."
        )]
        filename: String,
    },
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}
#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    Init {
        #[arg(
            short,
            long,
            help = "Overwrite an existing settings file"
        )]
        force: bool,
    },
}
#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let log_level = match opt.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(
            Env::default().default_filter_or(log_level.to_string()),
        )
        .init();
    let config_path = opt.config.unwrap_or_else(default_settings_path);
    match opt.command {
        Commands::Sync { repository, mirror } => {
            handle_sync(&config_path, repository, mirror).await?;
        }
        Commands::Watch { repository, mirror } => {
            handle_watch(&config_path, repository, mirror).await?;
        }
        Commands::Status { repository, mirror } => {
            handle_status(&config_path, repository, mirror).await?;
        }
        Commands::Resolve { repository, mirror, filename } => {
            handle_resolve(&config_path, repository, mirror, filename).await?;
        }
        Commands::Settings { action } => {
            handle_settings(&config_path, action)?;
        }
    }
    Ok(())
}
fn load_settings(path: &Path) -> Result<MirrorSettings> {
    let mut settings = MirrorSettings::load(path)?;
    let result = SettingsValidator::new().validate_and_fix(&mut settings);
    for error in &result.errors {
        log::warn!("{}: {} (using default)", error.field, error.message);
    }
    for warning in &result.warnings {
        log::warn!("{}: {}", warning.field, warning.message);
    }
    Ok(settings)
}
async fn open_engine(
    config_path: &Path,
    repository: PathBuf,
    mirror: PathBuf,
) -> Result<MirrorEngine> {
    let settings = load_settings(config_path)?;
    let engine = MirrorEngine::new(repository, mirror, settings, Arc::new(LogActivity));
    engine.initialize().await?;
    Ok(engine)
}
async fn handle_sync(config_path: &Path, repository: PathBuf, mirror: PathBuf) -> Result<()> {
    let engine = open_engine(config_path, repository, mirror).await?;
    let Some(completion) = engine.sync_now().await else {
        bail!("a sync pass is already running");
    };
    if !completion.success {
        bail!(
            "sync failed: {}", completion.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    println!("✓ Mirror sync complete");
    println!("  Copied:  {}", completion.synced);
    println!("  Skipped: {}", completion.skipped);
    println!("  Errors:  {}", completion.errors);
    println!("  Files:   {}", engine.get_stats().total_files);
    Ok(())
}
async fn handle_watch(config_path: &Path, repository: PathBuf, mirror: PathBuf) -> Result<()> {
    let engine = open_engine(config_path, repository, mirror).await?;
    let mut events = engine.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{}", line),
                        Err(e) => log::warn!("Cannot encode event: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Dropped {} event(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
    engine.start_sync();
    if !engine.start_watch() {
        log::warn!("Watch was already active");
    }
    tokio::signal::ctrl_c().await?;
    log::info!("Stopping mirror watch");
    engine.stop_watch();
    engine.stop_sync();
    printer.abort();
    Ok(())
}
async fn handle_status(config_path: &Path, repository: PathBuf, mirror: PathBuf) -> Result<()> {
    let engine = open_engine(config_path, repository, mirror).await?;
    println!("{}", serde_json::to_string_pretty(&engine.get_stats())?);
    Ok(())
}
async fn handle_resolve(
    config_path: &Path,
    repository: PathBuf,
    mirror: PathBuf,
    filename: String,
) -> Result<()> {
    let engine = open_engine(config_path, repository, mirror).await?;
    match engine.get_mirror_path(&filename) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => {
            eprintln!("✗ Not mirrored: {}", filename);
            std::process::exit(1);
        }
    }
}
fn handle_settings(config_path: &Path, action: SettingsCommand) -> Result<()> {
    match action {
        SettingsCommand::Show => {
            let settings = MirrorSettings::load(config_path)?;
            println!("Settings file: {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&settings)?);
            let result = SettingsValidator::new().validate(&settings);
            for error in &result.errors {
                println!("✗ {}: {}", error.field, error.message);
                if let Some(suggestion) = &error.suggestion {
                    println!("    {}", suggestion);
                }
            }
            for warning in &result.warnings {
                println!("! {}: {}", warning.field, warning.message);
                if let Some(suggestion) = &warning.suggestion {
                    println!("    {}", suggestion);
                }
            }
        }
        SettingsCommand::Init { force } => {
            if config_path.exists() && !force {
                bail!(
                    "settings file {} already exists (use --force to overwrite)", config_path
                    .display()
                );
            }
            MirrorSettings::default().save(config_path)?;
            println!("✓ Wrote default settings to {}", config_path.display());
        }
    }
    Ok(())
}
