use std::sync::Arc;

use auth::SecretHasher;
use auth::TokenIssuer;
use notes_service::config::Config;
use notes_service::domain::auth::service::AuthService;
use notes_service::domain::note::service::NoteService;
use notes_service::inbound::http::router::create_router;
use notes_service::outbound::email::MailgunEmailClient;
use notes_service::outbound::repositories::PostgresCredentialRepository;
use notes_service::outbound::repositories::PostgresNoteRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notes_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "notes-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        email_domain = %config.email.domain,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    // Both constructors refuse an empty key: missing secrets abort startup
    let secret_hasher = SecretHasher::new(&config.auth.password_key)?;
    let token_issuer = Arc::new(TokenIssuer::new(&config.auth.token_key)?);

    let credential_repository = Arc::new(PostgresCredentialRepository::new(pg_pool.clone()));
    let note_repository = Arc::new(PostgresNoteRepository::new(pg_pool));
    let email_client = Arc::new(MailgunEmailClient::new(&config.email));

    let auth_service = Arc::new(AuthService::new(
        credential_repository,
        email_client,
        secret_hasher,
        Arc::clone(&token_issuer),
    ));
    let note_service = Arc::new(NoteService::new(note_repository));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, note_service, token_issuer);

    axum::serve(http_listener, http_application).await?;

    Ok(())
}
