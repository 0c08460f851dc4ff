use clap::{Parser, Subcommand};
use gallery_wall_cli::CliContext;
use gallery_wall_cli::commands;
use gallery_wall_cli::logging;
use gallery_wall_cli::readline;
use std::io::Write;
use std::path::PathBuf;

fn main() -> Result<(), String> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    // `gallery-wall <command> ...` runs once; bare `gallery-wall` opens the prompt
    if args.len() > 1 {
        let cli = Cli::try_parse_from(&args).map_err(|e| e.to_string())?;
        let mut ctx = match &cli.config {
            Some(path) => CliContext::with_config_file(path)?,
            None => CliContext::new(),
        };
        respond_to(cli, &mut ctx)?;
        return Ok(());
    }

    let mut ctx = CliContext::new();
    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut ctx) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Gallery Wall engine tools")]
struct Cli {
    /// Engine config to use instead of the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Which overrides a page path is eligible for
    Classify { path: String },
    /// CSS variables for the current preferences
    Variables,
    /// Set a preference the way the settings panel does
    Set { preference: String, value: String },
    /// Nudge a numeric preference
    Step {
        preference: String,
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },
    /// Load a raw stored string as the content script would read it
    Import { preference: String, raw: String },
    /// Validate an engine config file and make it active
    CheckConfig { file: String },
    /// Print the active engine config
    ShowConfig,
    /// Run activation and decoration against a synthetic page
    Preview { path: String },
    Exit,
}

fn respond(line: &str, ctx: &mut CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "gallery-wall".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    if let Some(path) = &cli.config {
        *ctx = CliContext::with_config_file(path)?;
    }
    respond_to(cli, ctx)
}

fn respond_to(cli: Cli, ctx: &mut CliContext) -> Result<bool, String> {
    match &cli.command {
        Some(Commands::Classify { path }) => commands::classify(path, ctx)?,
        Some(Commands::Variables) => commands::show_variables(ctx)?,
        Some(Commands::Set { preference, value }) => {
            commands::set_preference(preference, value, ctx)?
        }
        Some(Commands::Step { preference, delta }) => {
            commands::step_preference(preference, *delta, ctx)?
        }
        Some(Commands::Import { preference, raw }) => {
            commands::import_value(preference, raw, ctx)?
        }
        Some(Commands::CheckConfig { file }) => commands::check_config(file, ctx)?,
        Some(Commands::ShowConfig) => commands::show_config(ctx)?,
        Some(Commands::Preview { path }) => commands::preview(path, ctx)?,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
