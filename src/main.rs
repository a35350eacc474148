use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use countup::event::EventBus;
use countup::game::{self, CountingEngine, CountingService, GameStateStore, JsonFileGameStateStore};
use countup::ledger::{InMemoryLedgerRepository, LedgerRepository, PostgresLedgerRepository};
use countup::notify::{Notifier, TracingNotifier};
use countup::settings::{self, JsonFileSettingsStore, SettingsStore};
use countup::shared::AppState;
use countup::stats::{self, StatsService};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "countup=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting counting game server");

    let settings_path =
        std::env::var("COUNTUP_SETTINGS_PATH").unwrap_or_else(|_| "settings.json".to_string());
    let state_path =
        std::env::var("COUNTUP_STATE_PATH").unwrap_or_else(|_| "game_state.json".to_string());

    let settings_store: Arc<dyn SettingsStore> = Arc::new(
        JsonFileSettingsStore::load(settings_path)
            .await
            .expect("Failed to load settings"),
    );

    // Postgres when DATABASE_URL is set, in-memory otherwise
    let ledger: Arc<dyn LedgerRepository> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            let repository = PostgresLedgerRepository::new(pool);
            repository
                .ensure_schema()
                .await
                .expect("Failed to prepare participants table");
            info!("Participant ledger backed by PostgreSQL");
            Arc::new(repository)
        }
        Err(_) => {
            info!("DATABASE_URL not set, participant ledger kept in memory");
            Arc::new(InMemoryLedgerRepository::new())
        }
    };

    let state_store: Arc<dyn GameStateStore> = Arc::new(JsonFileGameStateStore::new(state_path));
    let engine = Arc::new(
        CountingEngine::restore(state_store, Arc::clone(&ledger))
            .await
            .expect("Failed to restore game state"),
    );

    let event_bus = EventBus::new(100);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let counting_service = Arc::new(CountingService::new(
        Arc::clone(&engine),
        Arc::clone(&settings_store),
        notifier,
        event_bus.clone(),
    ));
    let stats_service = Arc::new(StatsService::new(Arc::clone(&engine), Arc::clone(&ledger)));

    counting_service.announce_online().await;

    let app_state = AppState::new(
        engine,
        counting_service,
        stats_service,
        settings_store,
        ledger,
        event_bus,
    );

    let app = Router::new()
        .route("/events/message", post(game::handlers::receive_message))
        .route(
            "/events/message-deleted",
            post(game::handlers::receive_message_deleted),
        )
        .route(
            "/events/message-edited",
            post(game::handlers::receive_message_edited),
        )
        .route(
            "/stats/participants/:participant_id",
            get(stats::handlers::participant_stats),
        )
        .route("/stats/server", get(stats::handlers::server_stats))
        .route("/leaderboard", get(stats::handlers::leaderboard))
        .route("/settings", get(settings::handlers::get_settings))
        .route("/settings/channel", put(settings::handlers::set_channel))
        .route(
            "/settings/roles/failed",
            put(settings::handlers::set_failed_role)
                .delete(settings::handlers::remove_failed_role),
        )
        .route(
            "/settings/roles/reliable",
            put(settings::handlers::set_reliable_role)
                .delete(settings::handlers::remove_reliable_role),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
