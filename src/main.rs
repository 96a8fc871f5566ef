use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use robochat::core::config::{self, CliOverrides, RobochatConfig};
use robochat::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "robochat", about = "Chat with a talking robot avatar")]
struct Args {
    /// Speech language tag (BCP 47), e.g. zh-CN
    #[arg(short, long)]
    lang: Option<String>,

    /// Disable text-to-speech
    #[arg(long)]
    no_speech: bool,

    /// Directory with hello.txt, hello1.txt, walk.txt and talk.txt clips
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Recompute the chat panel width on every resize
    #[arg(long)]
    recompute_width: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to robochat.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("robochat.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}; using defaults", e);
        RobochatConfig::default()
    });
    let cli = CliOverrides {
        lang: args.lang,
        no_speech: args.no_speech,
        asset_dir: args.assets,
        recompute_width: args.recompute_width,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!(
        "robochat starting up: speech {}, lang {}",
        if resolved.speech_enabled { "on" } else { "off" },
        resolved.speech.lang.as_deref().unwrap_or(robochat::speech::DEFAULT_LANG)
    );

    tui::run(resolved)
}
