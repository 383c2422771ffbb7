//! Configuration management for the Lingo gateway

pub mod file;

use std::path::PathBuf;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Voice configuration (STT/TTS)
    pub voice: VoiceConfig,

    /// LLM configuration
    pub llm: LlmConfig,

    /// Coaching configuration
    pub coach: CoachConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Directory for generated MP3 replies, served under `/audio`
    pub audio_dir: PathBuf,

    /// Path to static files directory (web UI), served as fallback
    pub static_dir: Option<PathBuf>,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: String,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,

    /// Recognition/synthesis language, single fixed locale
    pub language: String,
}

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL
    pub base_url: String,

    /// Chat model identifier
    pub model: String,
}

/// Coaching configuration
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Rolling conversation context budget in bytes
    pub context_bytes: usize,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper STT and TTS)
    pub openai: Option<String>,

    /// Groq API key (chat completions; `OpenAI`-compatible)
    pub groq: Option<String>,

    /// Deepgram API key (optional STT)
    pub deepgram: Option<String>,
}

impl ApiKeys {
    /// Key used for chat completions: Groq if present, otherwise `OpenAI`
    #[must_use]
    pub fn llm_key(&self) -> Option<&str> {
        self.groq.as_deref().or(self.openai.as_deref())
    }
}

/// Default rolling context budget, matching the original coach
const DEFAULT_CONTEXT_BYTES: usize = 1000;

impl Config {
    /// Load configuration with env > TOML file > default precedence
    ///
    /// # Errors
    ///
    /// Returns error if the audio directory cannot be created
    pub fn load() -> crate::Result<Self> {
        let fc = file::load_config_file();

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
            groq: std::env::var("GROQ_API_KEY").ok().or(fc.api_keys.groq),
            deepgram: std::env::var("DEEPGRAM_API_KEY")
                .ok()
                .or(fc.api_keys.deepgram),
        };

        let server = ServerConfig {
            port: std::env::var("LINGO_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(5000),
            audio_dir: std::env::var("LINGO_AUDIO_DIR")
                .ok()
                .or(fc.server.audio_dir)
                .map_or_else(default_audio_dir, PathBuf::from),
            static_dir: std::env::var("LINGO_STATIC_DIR")
                .ok()
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        std::fs::create_dir_all(&server.audio_dir)?;

        let voice = VoiceConfig {
            stt_provider: std::env::var("LINGO_STT_PROVIDER")
                .ok()
                .or(fc.voice.stt_provider)
                .unwrap_or_else(|| "whisper".to_string()),
            stt_model: std::env::var("LINGO_STT_MODEL")
                .ok()
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            tts_model: std::env::var("LINGO_TTS_MODEL")
                .ok()
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: std::env::var("LINGO_TTS_VOICE")
                .ok()
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "alloy".to_string()),
            tts_speed: std::env::var("LINGO_TTS_SPEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.voice.tts_speed)
                .unwrap_or(1.0),
            language: std::env::var("LINGO_LANGUAGE")
                .ok()
                .or(fc.voice.language)
                .unwrap_or_else(|| "en".to_string()),
        };

        let llm = LlmConfig {
            base_url: std::env::var("LINGO_LLM_BASE_URL")
                .ok()
                .or(fc.llm.base_url)
                .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
            model: std::env::var("LINGO_LLM_MODEL")
                .ok()
                .or(fc.llm.model)
                .unwrap_or_else(|| "llama-3.1-8b-instant".to_string()),
        };

        let coach = CoachConfig {
            context_bytes: std::env::var("LINGO_CONTEXT_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.coach.context_bytes)
                .unwrap_or(DEFAULT_CONTEXT_BYTES),
        };

        Ok(Self {
            server,
            voice,
            llm,
            coach,
            api_keys,
        })
    }
}

/// Default audio cache directory: `~/.cache/lingo/audio` (cwd-relative fallback)
fn default_audio_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".cache/lingo/audio"),
        |d| d.cache_dir().join("lingo").join("audio"),
    )
}
