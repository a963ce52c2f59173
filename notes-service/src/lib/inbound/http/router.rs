use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::auth::change_password::change_password;
use super::handlers::auth::login::login;
use super::handlers::auth::login_with_otp::login_with_otp;
use super::handlers::auth::refresh::refresh;
use super::handlers::auth::register::register;
use super::handlers::auth::send_otp::send_otp;
use super::handlers::auth::set_password::set_password;
use super::handlers::notes::create_note::create_note;
use super::handlers::notes::delete_note::delete_note;
use super::handlers::notes::get_note::get_note;
use super::handlers::notes::list_notes::list_notes;
use super::handlers::notes::update_note::update_note;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::service::AuthService;
use crate::domain::note::service::NoteService;
use crate::outbound::email::MailgunEmailClient;
use crate::outbound::repositories::credentials::PostgresCredentialRepository;
use crate::outbound::repositories::note::PostgresNoteRepository;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService<PostgresCredentialRepository, MailgunEmailClient>>,
    pub note_service: Arc<NoteService<PostgresNoteRepository>>,
    pub token_issuer: Arc<TokenIssuer>,
}

pub fn create_router(
    auth_service: Arc<AuthService<PostgresCredentialRepository, MailgunEmailClient>>,
    note_service: Arc<NoteService<PostgresNoteRepository>>,
    token_issuer: Arc<TokenIssuer>,
) -> Router {
    let state = AppState {
        auth_service,
        note_service,
        token_issuer,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/otp/send", post(send_otp))
        .route("/api/auth/otp/login", post(login_with_otp));

    let protected_routes = Router::new()
        .route("/api/auth/password/change", post(change_password))
        .route("/api/auth/password/set", post(set_password))
        .route("/api/notes", post(create_note))
        .route("/api/notes", get(list_notes))
        .route("/api/notes/:note_id", get(get_note))
        .route("/api/notes/:note_id", patch(update_note))
        .route("/api/notes/:note_id", delete(delete_note))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
