mod align;
mod cli;
mod commands;
mod config;
mod error;
mod font;
mod hanzi;
mod layout;
mod paginate;
mod script;
mod subtitle;
mod timing;

use clap::Parser;
use cli::{Cli, Command};
use colored::*;
use config::ConfigUpdate;
use error::PinyinsubResult;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Tracing only when RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        if let Some(hint) = e.hint() {
            eprintln!("{} {}", "hint:".yellow().bold(), hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> PinyinsubResult<()> {
    match cli.command {
        Command::Init {
            path,
            fps,
            max_width,
            max_height,
            font_size,
            hanzi_fonts,
            latin_fonts,
        } => {
            let overrides = ConfigUpdate {
                max_width,
                max_height,
                base_font_size: font_size,
                hanzi_fonts,
                latin_fonts,
                fps,
                default_frames_per_word: None,
            };
            commands::init::run(&path, overrides)
        }
        Command::Align {
            hanzi,
            pinyin,
            json,
        } => commands::align::run(&hanzi, pinyin.as_deref(), json),
        Command::Layout {
            script,
            config,
            output,
            parallel,
        } => commands::layout::run(&script, config.as_deref(), output, parallel).await,
        Command::Srt {
            script,
            config,
            output,
        } => commands::srt::run(&script, config.as_deref(), output).await,
        Command::Fonts { config, strict } => commands::fonts::run(config.as_deref(), strict),
    }
}
