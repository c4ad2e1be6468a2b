use super::{AppState, handlers};
use crate::uploads::PUBLIC_PREFIX;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

pub fn create_app(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            header::AUTHORIZATION,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true);

    let api = Router::new()
        .route(
            "/images",
            get(handlers::list_images).post(handlers::upload_image),
        )
        .route(
            "/images/{id}",
            get(handlers::get_image)
                .put(handlers::update_image)
                .delete(handlers::delete_image),
        );

    Router::new()
        .nest("/api", api)
        // Uploaded files, read-only
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.uploads.root()))
        // Uploads are not size limited
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        // Add tracing for HTTP requests and responses
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)))
        .with_state(state)
}
