pub mod llm;
pub mod notifications;
pub mod observability;
pub mod persistence;
pub mod rate_limit;
