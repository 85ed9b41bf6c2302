//! Campus Intake server.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use campus_intake::adapters::ai::{
    AnthropicConfig, AnthropicProvider, FailoverAIProvider, OpenAIConfig, OpenAIProvider,
};
use campus_intake::adapters::catalog::{CampusSeed, InMemoryCampusDirectory};
use campus_intake::adapters::http::{build_router, IntakeAppState};
use campus_intake::adapters::postgres::PostgresSubmissionStore;
use campus_intake::adapters::storage::{
    FileSettingsOverlay, InMemorySubmissionStore, LocalMediaStore,
};
use campus_intake::application::{ConversationRegistry, IntakeController, SettingsProvider};
use campus_intake::config::{AiConfig, AiProvider, AppConfig, ServerConfig, StorageConfig};
use campus_intake::ports::{AIError, AIProvider as ModelProvider, SubmissionStore};
use secrecy::ExposeSecret;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let seed = CampusSeed::load(&config.storage.seed_path).await?;
    let directory = Arc::new(InMemoryCampusDirectory::new(seed));
    let media = Arc::new(LocalMediaStore::new(&config.storage.media_dir));
    let submissions = submission_store(&config.storage).await?;
    let settings = SettingsProvider::with_overlay(
        config.intake.to_settings(),
        Arc::new(FileSettingsOverlay::new(&config.storage.overrides_path)),
    );

    let mut controller = IntakeController::new(
        directory.clone(),
        directory.clone(),
        directory,
        media,
        submissions,
        settings,
    );
    match model_provider(&config.ai)? {
        Some(provider) => controller = controller.with_ai(provider),
        None => tracing::info!("language model disabled, running in manual mode"),
    }

    let registry = Arc::new(
        ConversationRegistry::new(Arc::new(controller))
            .with_idle_ttl(config.intake.conversation_idle_ttl())
            .with_capacity(config.intake.max_conversations),
    );
    spawn_idle_sweeper(registry.clone());
    let app = build_router(IntakeAppState::new(registry), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "campus intake listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Sweeps idle conversations every TTL so quiet ones do not wait for the next open.
fn spawn_idle_sweeper(registry: Arc<ConversationRegistry>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(registry.idle_ttl());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            registry.evict_idle().await;
        }
    });
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn submission_store(
    storage: &StorageConfig,
) -> Result<Arc<dyn SubmissionStore>, Box<dyn Error>> {
    let Some(url) = storage.database_url() else {
        tracing::warn!("no database configured, submissions are kept in memory");
        return Ok(Arc::new(InMemorySubmissionStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(storage.max_connections)
        .acquire_timeout(storage.acquire_timeout())
        .connect(url)
        .await?;
    if storage.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }
    Ok(Arc::new(PostgresSubmissionStore::new(pool)))
}

/// The configured provider, wrapped for failover when a fallback is keyed.
fn model_provider(ai: &AiConfig) -> Result<Option<Arc<dyn ModelProvider>>, AIError> {
    if !ai.is_active() {
        return Ok(None);
    }

    let primary = single_provider(ai, ai.primary_provider)?;
    let provider: Arc<dyn ModelProvider> = match ai.active_fallback() {
        Some(fallback) => Arc::new(
            FailoverAIProvider::new(primary).with_fallback(single_provider(ai, fallback)?),
        ),
        None => primary,
    };

    let info = provider.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "language model enabled");
    Ok(Some(provider))
}

fn single_provider(ai: &AiConfig, kind: AiProvider) -> Result<Arc<dyn ModelProvider>, AIError> {
    match kind {
        AiProvider::Anthropic => {
            let key = ai
                .anthropic_api_key
                .as_ref()
                .ok_or(AIError::AuthenticationFailed)?;
            let mut config = AnthropicConfig::new(key.expose_secret().as_str())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(model) = &ai.anthropic_model {
                config = config.with_model(model);
            }
            Ok(Arc::new(AnthropicProvider::new(config)?))
        }
        AiProvider::OpenAI => {
            let key = ai
                .openai_api_key
                .as_ref()
                .ok_or(AIError::AuthenticationFailed)?;
            let mut config = OpenAIConfig::new(key.expose_secret().as_str())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(model) = &ai.openai_model {
                config = config.with_model(model);
            }
            Ok(Arc::new(OpenAIProvider::new(config)?))
        }
    }
}
