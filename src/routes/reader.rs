//! Reader UI assets
//!
//! Serves the single-page reader shell. The assets are compiled into the
//! binary so the server ships as one file.

use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/reader.js", get(reader_js))
        .route("/reader.css", get(reader_css))
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/reader.html"))
}

async fn reader_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        include_str!("../../static/reader.js"),
    )
}

async fn reader_css() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        include_str!("../../static/reader.css"),
    )
}
