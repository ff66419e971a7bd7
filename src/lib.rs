pub mod bazi;
pub mod bow;
mod cli;
pub mod db;
pub mod fortune;
pub mod ritual;
pub mod settings;
mod utils;

use clap::Parser;

pub use bazi::{calculate_bazi, calculate_chart, BaziChart, BirthInput, Pillar};
pub use bow::{BowController, BowDetector, BowEvent, DetectorState};
pub use fortune::{build_prompt, parse_fortune, Fortune, FortuneError, FortuneRequest, SseDecoder};
pub use ritual::{BowProgress, Ritual};

fn debug_mode() -> bool {
    std::env::var("BAZI_ORACLE_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn run() -> anyhow::Result<()> {
    // RUST_LOG still wins over the default level
    let default_level = if debug_mode() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let cli = cli::Cli::parse();

    log::info!("Bazi oracle starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(cli::dispatch(cli));

    // A pending stdin read would otherwise hold shutdown open.
    runtime.shutdown_background();
    result
}
