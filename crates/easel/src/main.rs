//! Easel - a retained-mode 2D game engine
//!
//! Usage: easel <minesweeper|breakout> [OPTIONS]

mod settings;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use log::info;

use easel_games::{breakout, minesweeper, Game, Rng};
use easel_shell::Shell;

use crate::settings::Settings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Options {
    game: Option<Game>,
    config: Option<PathBuf>,
    assets: Option<PathBuf>,
    font: Option<PathBuf>,
    seed: Option<u32>,
    debug: bool,
    help: bool,
    version: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--version" | "-V" => options.version = true,
            "--debug" => options.debug = true,
            "--config" => options.config = Some(PathBuf::from(value("--config")?)),
            "--assets" => options.assets = Some(PathBuf::from(value("--assets")?)),
            "--font" => options.font = Some(PathBuf::from(value("--font")?)),
            "--seed" => {
                let seed = value("--seed")?;
                options.seed = Some(seed.parse().map_err(|_| format!("Invalid seed: {}", seed))?);
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown option: {}", flag)),
            name => {
                let game = Game::from_name(name).ok_or_else(|| format!("Unknown game: {}", name))?;
                options.game = Some(game);
            }
        }
    }

    Ok(options)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("easel");

    let options = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(program);
            return ExitCode::FAILURE;
        }
    };

    if options.help {
        print_usage(program);
        return ExitCode::SUCCESS;
    }
    if options.version {
        println!("Easel {}", VERSION);
        return ExitCode::SUCCESS;
    }
    let Some(game) = options.game else {
        print_usage(program);
        return ExitCode::FAILURE;
    };

    if let Err(e) = run(game, &options) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Open a window and play until it closes
fn run(game: Game, options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = match &options.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if options.debug {
        settings.debug = true;
    }
    if let Some(assets) = &options.assets {
        settings.asset_root = Some(assets.clone());
    }
    if let Some(font) = &options.font {
        settings.font_path = Some(font.clone());
    }

    let rng = options.seed.map(Rng::new).unwrap_or_else(Rng::from_time);
    let engine_config = settings.engine_config();
    let shell = Shell::new(settings.shell_config(game.title())?, tokio::runtime::Handle::current())?;
    info!("Starting {}", game.name());

    match game {
        Game::Minesweeper => shell.run(minesweeper::scene(rng).config(engine_config))?,
        Game::Breakout => shell.run(breakout::scene(rng).config(engine_config))?,
    }
    Ok(())
}

fn print_usage(program: &str) {
    println!(
        r#"Easel {} - a retained-mode 2D game engine

USAGE:
    {} <GAME> [OPTIONS]

GAMES:
    minesweeper       Clear a 10x15 field of 8 mines
    breakout          Break the wall with paddle and ball

OPTIONS:
    -h, --help        Print this help message
    -V, --version     Print version information
    --config <PATH>   Read settings from a JSON file
    --assets <DIR>    Directory holding the public/ assets
    --font <PATH>     TTF/OTF face used for text
    --seed <N>        Seed for board and launch randomness
    --debug           Outline every node

EXAMPLES:
    {} minesweeper --assets assets
    {} breakout --font /usr/share/fonts/TTF/DejaVuSansMono.ttf
"#,
        VERSION, program, program, program
    );
}
