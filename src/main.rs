use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley::voice::{
    AudioCapture, AudioPlayback, PLAYBACK_SAMPLE_RATE, SAMPLE_RATE, apply_volume, calculate_rms,
    calibrated_threshold,
};
use parley::{Config, session};

/// Parley - talk to a tiny voice assistant
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Save each response to a file and open it with the default player
    #[arg(long)]
    persist: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Listen once and repeat what was heard
    Demo,
    /// Speak a line of text
    Say {
        /// Text to speak
        text: String,
        /// Save to response.mp3 (or `say_artifact_path`) and open it instead of playing directly
        #[arg(long)]
        save: bool,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info",
        1 => "info,parley=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();
    if cli.persist {
        config.session.persist = true;
    }
    tracing::debug!(capture = ?config.capture, session = ?config.session, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Demo => demo(&config).await,
            Command::Say { text, save } => Ok(session::say(&config, &text, save).await?),
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker(),
        };
    }

    tracing::info!("starting interactive conversation");

    tokio::select! {
        outcome = session::run_dialogue(&config) => {
            let outcome = outcome?;
            tracing::info!(turns = outcome.turns, reason = ?outcome.reason, "conversation over");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
        }
    }

    Ok(())
}

/// Run the one-shot recognition demo
#[allow(clippy::future_not_send)]
async fn demo(config: &Config) -> anyhow::Result<()> {
    let mut input = session::build_input(config)?;
    let mut output = session::build_output(config)?;

    match session::run_recognition_demo(&mut input, &mut output, config.session.persist).await? {
        Some(utterance) => println!("Recognized speech: {}", utterance.text()),
        None => println!("No speech recognized. Please try again."),
    }

    Ok(())
}

/// Test microphone input
///
/// The first second calibrates the speech threshold the same way a capture
/// does; each later second is metered against it.
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    let mut capture = AudioCapture::new()?;
    capture.start()?;

    println!("Stay quiet for a second while the room is measured...");
    tokio::time::sleep(Duration::from_secs(1)).await;
    let threshold = calibrated_threshold(&capture.take_buffer());
    println!("Speech threshold: {threshold:.4} RMS at {SAMPLE_RATE} Hz");
    println!("Now speak for {duration} seconds\n");

    for second in 1..=duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let energy = calculate_rms(&capture.take_buffer());
        let verdict = if energy > threshold { "speech" } else { "quiet" };
        println!("[{second:2}s] {energy:.4} [{}] {verdict}", level_meter(energy));
    }

    drop(capture);

    println!("\nA meter that never reaches \"speech\" means phrases will not be");
    println!("detected with this input device.");

    Ok(())
}

/// Fixed-width bar for an RMS level
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn level_meter(energy: f32) -> String {
    const WIDTH: usize = 40;
    let filled = ((energy * 100.0).clamp(0.0, WIDTH as f32)) as usize;
    format!("{:<width$}", "#".repeat(filled), width = WIDTH)
}

/// Test speaker output
///
/// Plays a one-second tone at full volume, then at the farewell volume, so
/// the gain applied to directives can be heard.
fn test_speaker() -> anyhow::Result<()> {
    let playback = AudioPlayback::new()?;

    for volume in [1.0, 0.9] {
        println!("Playing 440Hz at volume {volume:.1}");
        playback.play(apply_volume(tone(440.0, Duration::from_secs(1)), volume))?;
    }

    println!("\nNo tone means spoken responses will be silent; try --persist to");
    println!("play them through the default media player instead.");

    Ok(())
}

/// Sine tone at 30% amplitude, sampled for playback
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn tone(frequency: f32, length: Duration) -> Vec<f32> {
    let rate = PLAYBACK_SAMPLE_RATE as f32;
    let count = (rate * length.as_secs_f32()) as usize;
    (0..count)
        .map(|i| (std::f32::consts::TAU * frequency * i as f32 / rate).sin() * 0.3)
        .collect()
}
