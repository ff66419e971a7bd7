use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::bazi::{calculate_chart, BaziChart, BirthInput};
use crate::bow::{BowController, BowEvent, SimulatedCamera, SimulatedPoseModel};
use crate::db::{Database, LastReading};
use crate::fortune::{Fortune, SseDecoder};
use crate::ritual::{BowProgress, Ritual};
use crate::settings::{RitualSettings, SettingsStore};

const SIMULATED_BOW_PERIOD: Duration = Duration::from_millis(2400);
const CAPTURE_CHUNK_BYTES: usize = 256;

/// Four Pillars fortune, earned with three bows.
#[derive(Parser)]
#[command(name = "bazi-oracle", version, about)]
pub struct Cli {
    /// Directory holding settings.json and the last-reading cache
    #[arg(long, global = true, default_value = ".bazi-oracle")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the Four Pillars for a birth date
    Chart(ChartArgs),

    /// Bow before the oracle, then print the prompt sent for the reading
    Ritual(RitualArgs),

    /// Decode a captured fortune stream and cache it as the last reading
    Decode(DecodeArgs),

    /// Show the cached last reading
    Last,
}

#[derive(Args)]
pub struct BirthArgs {
    /// Birth date, YYYY-MM-DD
    #[arg(long)]
    pub date: String,

    /// Birth time, HH:MM (omit if unknown)
    #[arg(long)]
    pub time: Option<String>,
}

impl BirthArgs {
    fn parse(&self) -> Result<BirthInput> {
        BirthInput::parse(&self.date, self.time.as_deref())
    }
}

#[derive(Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub birth: BirthArgs,

    /// Print the chart as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RitualArgs {
    #[command(flatten)]
    pub birth: BirthArgs,

    /// Skip the camera and count bows from Enter presses
    #[arg(long)]
    pub camera_unavailable: bool,
}

#[derive(Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub birth: BirthArgs,

    /// File containing the raw server-sent-event stream
    #[arg(long)]
    pub file: PathBuf,
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Chart(args) => chart(args),
        Command::Ritual(args) => ritual(&cli.data_dir, args).await,
        Command::Decode(args) => decode(&cli.data_dir, args).await,
        Command::Last => last(&cli.data_dir).await,
    }
}

fn open_settings(data_dir: &Path) -> Result<RitualSettings> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    let store = SettingsStore::new(data_dir.join("settings.json"))?;
    Ok(store.ritual())
}

fn open_database(data_dir: &Path) -> Result<Database> {
    Database::new(data_dir.join("bazi-oracle.sqlite3"))
}

fn chart(args: ChartArgs) -> Result<()> {
    let birth = args.birth.parse()?;
    let chart = calculate_chart(&birth);

    if args.json {
        let payload = serde_json::json!({ "birth": birth, "chart": chart });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", render_chart(&birth, &chart));
    }
    Ok(())
}

async fn ritual(data_dir: &Path, args: RitualArgs) -> Result<()> {
    let settings = open_settings(data_dir)?;
    let birth = args.birth.parse()?;
    let chart = calculate_chart(&birth);
    print!("{}", render_chart(&birth, &chart));

    let mut ritual = Ritual::new(birth, chart, settings.required_bows);

    let camera = if args.camera_unavailable {
        SimulatedCamera::unavailable()
    } else {
        SimulatedCamera::new()
    };
    let model = SimulatedPoseModel::new(SIMULATED_BOW_PERIOD, rand::random());
    let mut controller = BowController::new(camera, model);
    let mut events = controller.subscribe();

    let camera_ok = controller.start().await;
    if camera_ok {
        println!("\nStand still while the oracle finds you...");
    } else {
        println!(
            "\nCamera unavailable. Press Enter for each bow ({} needed).",
            ritual.required_bows()
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let fallback = tokio::time::sleep(Duration::from_secs(settings.fallback_after_secs));
    tokio::pin!(fallback);
    let mut fallback_offered = !camera_ok;

    while !ritual.is_complete() {
        tokio::select! {
            event = events.recv() => match event {
                Ok(BowEvent::Calibrated) => {
                    println!("The oracle sees you. Bow {} times.", ritual.required_bows());
                }
                Ok(BowEvent::StateChanged { state }) => debug!("detector is now {}", state.as_str()),
                Ok(BowEvent::Bowed { count }) => match ritual.record_bow(count) {
                    BowProgress::Pending { remaining } => {
                        println!("Bow {count}. {remaining} to go.");
                    }
                    BowProgress::Complete => println!("Bow {count}. The oracle is listening."),
                },
                Err(RecvError::Lagged(skipped)) => warn!("missed {skipped} bow events"),
                Err(RecvError::Closed) => bail!("bow detection ended unexpectedly"),
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(_) => {
                    if controller.manual_bow().await.is_none() {
                        println!("Too fast. Bow slowly.");
                    }
                }
                None => {
                    stdin_open = false;
                    if !camera_ok {
                        bail!("input closed after {} of {} bows", ritual.bows(), ritual.required_bows());
                    }
                }
            },
            _ = &mut fallback, if !fallback_offered => {
                fallback_offered = true;
                if ritual.bows() == 0 {
                    println!("Having trouble? Press Enter to bow instead.");
                }
            }
        }
    }

    controller.stop().await?;

    let request = ritual
        .fortune_request(settings.reading_year)
        .context("ritual finished without enough bows")?;
    info!("ritual complete for {}", request.birth.date_label());
    println!("\n{}", request.prompt);
    Ok(())
}

async fn decode(data_dir: &Path, args: DecodeArgs) -> Result<()> {
    let birth = args.birth.parse()?;
    let chart = calculate_chart(&birth);

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let fortune = decode_capture(&bytes)?;

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    let db = open_database(data_dir)?;
    let reading = LastReading::new(birth, chart, fortune);
    db.save_last_reading(&reading).await?;

    print!("{}", render_reading(&reading));
    Ok(())
}

async fn last(data_dir: &Path) -> Result<()> {
    if !data_dir.exists() {
        println!("No reading yet. Complete the ritual first.");
        return Ok(());
    }

    let db = open_database(data_dir)?;
    match db.load_last_reading().await? {
        Some(reading) => print!("{}", render_reading(&reading)),
        None => println!("No reading yet. Complete the ritual first."),
    }
    Ok(())
}

/// Feed a captured stream through the decoder the way it would arrive over
/// the network, in small chunks.
pub fn decode_capture(bytes: &[u8]) -> Result<Fortune> {
    let mut decoder = SseDecoder::new();
    for chunk in bytes.chunks(CAPTURE_CHUNK_BYTES) {
        for delta in decoder.feed(chunk) {
            debug!("delta: {delta}");
        }
    }
    Ok(decoder.into_fortune()?)
}

pub fn render_chart(birth: &BirthInput, chart: &BaziChart) -> String {
    let mut out = format!("Born {}", birth.date_label());
    match birth.time_label() {
        Some(time) => out.push_str(&format!(" at {time}\n")),
        None => out.push_str(" (time unknown)\n"),
    }

    for (slot, pillar) in chart.slots() {
        let label = pillar
            .map(|pillar| pillar.label())
            .unwrap_or_else(|| "Not provided".to_string());
        out.push_str(&format!("  {:<6} {}\n", slot.as_str(), label));
    }
    out
}

pub fn render_reading(reading: &LastReading) -> String {
    let fortune = &reading.fortune;
    let mut out = render_chart(&reading.birth, &reading.chart);

    out.push_str(&format!(
        "\n{} {}\n\n",
        fortune.zodiac_element, fortune.zodiac_animal
    ));
    for (title, body) in [
        ("Personality", &fortune.personality),
        ("Five Elements", &fortune.five_elements.reading),
        ("Wealth", &fortune.wealth),
        ("Relationships", &fortune.relationships),
        ("Compatibility", &fortune.compatibility.reading),
    ] {
        if !body.is_empty() {
            out.push_str(&format!("{title}: {body}\n"));
        }
    }

    if !fortune.lucky_numbers.is_empty() {
        let numbers: Vec<String> = fortune.lucky_numbers.iter().map(u32::to_string).collect();
        out.push_str(&format!("Lucky numbers: {}\n", numbers.join(", ")));
    }
    if !fortune.lucky_colors.is_empty() {
        out.push_str(&format!("Lucky colors: {}\n", fortune.lucky_colors.join(", ")));
    }
    if !fortune.lucky_directions.is_empty() {
        out.push_str(&format!(
            "Lucky directions: {}\n",
            fortune.lucky_directions.join(", ")
        ));
    }

    out.push_str(&format!("\n{}\n", fortune.overall));
    out.push_str(&format!(
        "(read {})\n",
        reading.saved_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out
}
