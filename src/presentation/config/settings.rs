use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database_url: Option<String>,
    pub llm: LlmSettings,
    pub queue: QueueSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub max_chunk_chars: usize,
    pub max_concurrent_jobs: usize,
    pub poll_interval_secs: u64,
    pub default_max_attempts: i32,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub capacity: u32,
    pub refill_per_interval: u32,
    pub interval_ms: u64,
}

impl Settings {
    /// Reads the whole configuration surface from the environment, falling
    /// back to workable defaults for everything except the API credential.
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0".to_string()),
                port: env_or("SERVER_PORT", 3000),
            },
            database_url: std::env::var("DATABASE_URL").ok(),
            llm: LlmSettings {
                api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
                base_url: env_or("LLM_BASE_URL", "https://api.openai.com/v1".to_string()),
                model: env_or("LLM_MODEL", "gpt-4o-mini".to_string()),
                max_tokens: env_or("LLM_MAX_TOKENS", 4096),
                temperature: env_or("LLM_TEMPERATURE", 0.2),
                timeout_secs: env_or("LLM_TIMEOUT_SECS", 90),
            },
            queue: QueueSettings {
                max_chunk_chars: env_or("MAX_CHUNK_CHARS", 100_000),
                max_concurrent_jobs: env_or("MAX_CONCURRENT_JOBS", 2),
                poll_interval_secs: env_or("POLL_INTERVAL_SECS", 10),
                default_max_attempts: env_or("DEFAULT_MAX_ATTEMPTS", 3),
            },
            rate_limit: RateLimitSettings {
                capacity: env_or("RATE_LIMIT_CAPACITY", 10),
                refill_per_interval: env_or("RATE_LIMIT_REFILL", 10),
                interval_ms: env_or("RATE_LIMIT_INTERVAL_MS", 60_000),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
