mod settings;

pub use settings::{
    LlmSettings, QueueSettings, RateLimitSettings, ServerSettings, Settings,
};
