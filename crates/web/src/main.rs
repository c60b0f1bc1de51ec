use anyhow::Context;
use clarifier::{OllamaRuleClarifier, OllamaSettings, PromptTemplate};
use engine::{
    Database, Engine, EngineConfig, SystemClock,
    repository::{MatchStore, MemoryStore, ScheduleStore},
    services::RetryPolicy,
};
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::health,
        features::matches::handlers::list_matches,
        features::matches::handlers::get_match,
        features::matches::handlers::create_match,
        features::matches::handlers::start_match,
        features::matches::handlers::pause_match,
        features::matches::handlers::resume_match,
        features::matches::handlers::finish_match,
        features::matches::handlers::advance_round,
        features::matches::handlers::record_score,
        features::matches::handlers::record_foul,
        features::matches::handlers::record_warning,
        features::matches::handlers::get_score,
        features::schedules::handlers::list_tanding,
        features::schedules::handlers::create_tanding,
        features::schedules::handlers::list_tgr,
        features::schedules::handlers::create_tgr,
        features::schedules::handlers::distribute_tanding,
        features::schedules::handlers::distribute_tgr,
        features::clarify::handlers::clarify,
    ),
    components(
        schemas(
            engine::dto::matches::CreateMatchRequest,
            engine::dto::matches::RecordScoreRequest,
            engine::dto::matches::RecordFoulRequest,
            engine::dto::matches::RecordWarningRequest,
            engine::dto::matches::MatchResponse,
            engine::dto::matches::PesilatMatchResponse,
            engine::dto::matches::TimerResponse,
            engine::dto::matches::RecordOutcomeResponse,
            engine::dto::matches::ScoreResponse,
            engine::dto::schedule::CornerRequest,
            engine::dto::schedule::CreateTandingRequest,
            engine::dto::schedule::CreateTgrRequest,
            engine::dto::schedule::DistributeRequest,
            engine::dto::schedule::TandingBucket,
            engine::dto::schedule::TgrBucket,
            engine::dto::schedule::TandingDistributionResponse,
            engine::dto::schedule::TgrDistributionResponse,
            engine::models::CornerColor,
            engine::models::Pesilat,
            engine::models::MatchStatus,
            engine::models::StatusTransition,
            engine::models::TimerState,
            engine::models::ScheduleCorner,
            engine::models::ScheduleTanding,
            engine::models::ScheduleTgr,
            engine::models::TgrCategory,
            engine::models::Technique,
            engine::models::ScoreDetail,
            engine::models::FoulType,
            engine::models::Foul,
            engine::models::WarningType,
            engine::models::Warning,
            clarifier::ClarifyRequest,
            clarifier::Clarification,
        )
    ),
    tags(
        (name = "matches", description = "Match lifecycle and timer"),
        (name = "scoring", description = "Scores, fouls and warnings per corner"),
        (name = "schedules", description = "Tanding and TGR schedules and gelanggang distribution"),
        (name = "clarifier", description = "Rule lookup for a described pelanggaran"),
        (name = "health", description = "Liveness"),
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

async fn open_stores(
    config: &Config,
) -> anyhow::Result<(Arc<dyn MatchStore>, Arc<dyn ScheduleStore>)> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, matches and schedules are kept in memory only");
        let store = Arc::new(MemoryStore::new());
        let matches: Arc<dyn MatchStore> = store.clone();
        let schedules: Arc<dyn ScheduleStore> = store;
        return Ok((matches, schedules));
    };

    tracing::info!(
        "Connecting to database at: {}",
        database_url.split('@').next_back().unwrap_or("unknown")
    );
    let db = Database::new(database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let db = Arc::new(db);
    let matches: Arc<dyn MatchStore> = db.clone();
    let schedules: Arc<dyn ScheduleStore> = db;
    Ok((matches, schedules))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Pencak Silat scoring API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let (matches, schedules) = open_stores(&config).await?;

    let engine = Engine::new(
        matches,
        schedules,
        Arc::new(SystemClock),
        EngineConfig {
            total_rounds: config.total_rounds,
            retry: RetryPolicy {
                attempts: config.store_retry_attempts,
                ..RetryPolicy::default()
            },
        },
    );

    let template = match &config.clarifier_prompt_path {
        Some(path) => PromptTemplate::from_file(path).context("Failed to load prompt template")?,
        None => PromptTemplate::default(),
    };
    let clarifier = OllamaRuleClarifier::new(
        OllamaSettings {
            base_url: config.ollama_url.clone(),
            model: config.ollama_model.clone(),
            timeout: Duration::from_secs(config.ollama_timeout_secs),
        },
        template,
    )
    .context("Failed to build rule clarifier")?;
    tracing::info!(
        "Rule clarifier uses model '{}' at {}",
        config.ollama_model,
        config.ollama_url
    );

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, every mutating endpoint will answer 401");
    }

    let app = features::app(AppState::new(engine, Arc::new(clarifier)), api_keys);

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
