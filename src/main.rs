use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use credana::application::ports::{
    DocumentStore, JobStore, ModelGateway, Notifier, RateLimiter, ResultStore, TelemetrySink,
};
use credana::application::services::{
    AnalysisPipeline, PipelineConfig, Scheduler, SchedulerConfig, prompts::PromptSettings,
};
use credana::infrastructure::llm::OpenAiGateway;
use credana::infrastructure::notifications::LogNotifier;
use credana::infrastructure::observability::{LogTelemetry, TracingConfig, init_tracing};
use credana::infrastructure::persistence::{
    MemoryDocumentStore, MemoryJobStore, MemoryResultStore, PgDocumentStore, PgJobStore,
    PgResultStore, create_pool,
};
use credana::infrastructure::rate_limit::{TokenBucket, TokenBucketConfig};
use credana::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    init_tracing(TracingConfig::default(), settings.server.port);

    let (job_store, document_store, result_store): (
        Arc<dyn JobStore>,
        Arc<dyn DocumentStore>,
        Arc<dyn ResultStore>,
    ) = match &settings.database_url {
        Some(url) => {
            let pool = create_pool(url, 5).await?;
            (
                Arc::new(PgJobStore::new(pool.clone())),
                Arc::new(PgDocumentStore::new(pool.clone())),
                Arc::new(PgResultStore::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            (
                Arc::new(MemoryJobStore::new()),
                Arc::new(MemoryDocumentStore::new()),
                Arc::new(MemoryResultStore::new()),
            )
        }
    };

    let telemetry: Arc<dyn TelemetrySink> = Arc::new(LogTelemetry);
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    let rate_limiter: Arc<dyn RateLimiter> = Arc::new(TokenBucket::new(TokenBucketConfig {
        capacity: settings.rate_limit.capacity,
        refill_per_interval: settings.rate_limit.refill_per_interval,
        interval_ms: settings.rate_limit.interval_ms,
    }));

    let gateway: Arc<dyn ModelGateway> = Arc::new(OpenAiGateway::new(
        settings.llm.base_url.clone(),
        settings.llm.api_key.clone(),
        Duration::from_secs(settings.llm.timeout_secs),
        telemetry,
    ));

    let pipeline = Arc::new(AnalysisPipeline::new(
        Arc::clone(&job_store),
        document_store,
        result_store,
        gateway,
        rate_limiter,
        PipelineConfig {
            max_chunk_chars: settings.queue.max_chunk_chars,
            prompts: PromptSettings {
                model: settings.llm.model.clone(),
                temperature: settings.llm.temperature,
                max_tokens: settings.llm.max_tokens,
            },
        },
    ));

    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&job_store),
        notifier,
        pipeline,
        SchedulerConfig {
            max_concurrent_jobs: settings.queue.max_concurrent_jobs,
            poll_interval: Duration::from_secs(settings.queue.poll_interval_secs),
        },
    ));

    let shutdown = CancellationToken::new();
    let scheduler_handle = tokio::spawn(Arc::clone(&scheduler).run(shutdown.clone()));

    let state = AppState {
        job_store,
        default_max_attempts: settings.queue.default_max_attempts,
    };
    let router = create_router(state);

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    let _ = scheduler_handle.await;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
