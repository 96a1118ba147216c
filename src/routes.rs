use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use crate::docs::ApiDoc;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use crate::state::AppState;

use tower_http::cors::{Any, CorsLayer};

// Push envelopes carry a small JSON object, never the video itself.
const MAX_NOTIFICATION_BYTES: usize = 1024 * 1024;

pub fn configure_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route(
            "/process-video",
            post(crate::modules::video::handler::process_video)
                .layer(DefaultBodyLimit::max(MAX_NOTIFICATION_BYTES)),
        )
        .nest("/api/v1", api_routes())
        .nest("/api/v1/videos", crate::modules::video::router())
        .layer(cors)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", axum::routing::get(|| async { "ok" }))
}
