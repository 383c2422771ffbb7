use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use lingo_coach::api::{ApiServer, ApiState};
use lingo_coach::llm::ChatClient;
use lingo_coach::voice::{AudioPlayback, Microphone, SpeechToText, TextToSpeech, rms};
use lingo_coach::{Coach, Config, TranscriptLog, VoiceSession};

/// Lingo - voice English coach for children
#[derive(Parser)]
#[command(name = "lingo", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Talk to a running coach server from the microphone
    Talk {
        /// Server URL
        #[arg(long, env = "LINGO_SERVER_URL", default_value = "http://127.0.0.1:5000")]
        server: String,
    },
    /// Send one typed sentence through the coach and play the reply
    Say {
        /// Sentence to send
        text: String,

        /// Server URL
        #[arg(long, env = "LINGO_SERVER_URL", default_value = "http://127.0.0.1:5000")]
        server: String,
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

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,lingo_coach=info",
        1 => "info,lingo_coach=debug",
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
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Talk { server } => talk(&server).await,
            Command::Say { text, server } => say(&server, &text).await,
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
        };
    }

    serve(cli.port).await
}

/// Run the coaching server
async fn serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let port = port_override.unwrap_or(config.server.port);

    let coach = match config.api_keys.llm_key() {
        Some(key) => {
            let chat = ChatClient::new(
                config.llm.base_url.clone(),
                key.to_string(),
                config.llm.model.clone(),
            )?;
            tracing::info!(model = %config.llm.model, "coach ready");
            Some(Arc::new(Mutex::new(Coach::new(chat, config.coach.context_bytes))))
        }
        None => {
            tracing::warn!("no GROQ_API_KEY or OPENAI_API_KEY - coaching disabled");
            None
        }
    };

    let tts = match &config.api_keys.openai {
        Some(key) => Some(Arc::new(build_tts(&config, key)?)),
        None => {
            tracing::warn!("no OPENAI_API_KEY - speech synthesis disabled");
            None
        }
    };

    let state = ApiState {
        coach,
        tts,
        audio_dir: config.server.audio_dir.clone(),
    };

    tracing::info!(port, "lingo coach ready");
    ApiServer::new(state, port, config.server.static_dir).run().await?;

    Ok(())
}

/// Talk to the server from the microphone until Ctrl-C
#[allow(clippy::future_not_send)]
async fn talk(server: &str) -> anyhow::Result<()> {
    let config = Config::load()?;

    let recognizer = build_recognizer(&config)?;
    let playback = AudioPlayback::new()?;

    let mut session = VoiceSession::new(
        server.to_string(),
        Box::new(recognizer),
        Box::new(playback),
        TranscriptLog::with_stdout_renderer(),
    );

    session.run().await?;
    Ok(())
}

/// Send one typed sentence through the coach
async fn say(server: &str, text: &str) -> anyhow::Result<()> {
    let playback = AudioPlayback::new()?;

    let mut session = VoiceSession::new(
        server.to_string(),
        Box::new(NoRecognizer),
        Box::new(playback),
        TranscriptLog::with_stdout_renderer(),
    );

    session.exchange(text).await?;
    Ok(())
}

/// Placeholder recognizer for text-only sessions
struct NoRecognizer;

#[async_trait::async_trait]
impl lingo_coach::SpeechRecognizer for NoRecognizer {
    async fn recognize(&self, _audio: &[u8]) -> lingo_coach::Result<String> {
        Err(lingo_coach::Error::Stt(
            "no recognizer in text mode".to_string(),
        ))
    }
}

/// Build the configured STT backend
fn build_recognizer(config: &Config) -> anyhow::Result<SpeechToText> {
    let stt = match config.voice.stt_provider.as_str() {
        "deepgram" => SpeechToText::new_deepgram(
            config.api_keys.deepgram.clone().unwrap_or_default(),
            config.voice.stt_model.clone(),
            config.voice.language.clone(),
        )?,
        _ => SpeechToText::new_whisper(
            config.api_keys.openai.clone().unwrap_or_default(),
            config.voice.stt_model.clone(),
            config.voice.language.clone(),
        )?,
    };
    Ok(stt)
}

/// Build the TTS backend
fn build_tts(config: &Config, api_key: &str) -> anyhow::Result<TextToSpeech> {
    #[allow(clippy::cast_possible_truncation)]
    let speed = config.voice.tts_speed as f32;

    Ok(TextToSpeech::new(
        api_key.to_string(),
        config.voice.tts_model.clone(),
        config.voice.tts_voice.clone(),
        speed,
    )?)
}

/// Meter microphone input for a few seconds
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    let mut mic = Microphone::open()?;
    mic.start()?;

    println!(
        "Metering the default input at {} Hz for {duration}s, speak now.",
        mic.sample_rate()
    );

    for second in 1..=duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = mic.drain();
        let level = rms(&samples);
        let peak = samples.iter().fold(0.0f32, |max, s| max.max(s.abs()));

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let filled = (level * 100.0).min(40.0) as usize;
        println!("{second:>2}s  rms {level:.4}  peak {peak:.4}  {}", "=".repeat(filled));
    }

    mic.stop();
    println!("An rms stuck at zero means no signal reached the default input device.");

    Ok(())
}

/// Play a short tone through the default output
async fn test_speaker() -> anyhow::Result<()> {
    const TONE_HZ: f32 = 440.0;
    const TONE_SECS: usize = 2;
    const PLAYBACK_HZ: usize = 24000;

    println!("Playing a {TONE_SECS}s {TONE_HZ} Hz tone.");

    #[allow(clippy::cast_precision_loss)]
    let tone: Vec<f32> = (0..PLAYBACK_HZ * TONE_SECS)
        .map(|i| (std::f32::consts::TAU * TONE_HZ * i as f32 / PLAYBACK_HZ as f32).sin() * 0.25)
        .collect();

    let mut playback = AudioPlayback::new()?;
    playback.play(tone).await?;

    println!("Silence means the default output device is wrong or muted.");

    Ok(())
}
