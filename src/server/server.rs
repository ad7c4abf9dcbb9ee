use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

use super::http_layers::{access_control, log_requests};
use super::question_routes::{
    create_question, delete_question, get_categories, get_category_questions, get_questions,
    search_questions,
};
use super::quiz_routes::play_quiz;
use super::state::*;
use super::{RequestsLoggingLevel, ServerConfig};
use crate::trivia_store::TriviaStore;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
    };
    Json(stats)
}

impl ServerState {
    fn new(config: ServerConfig, store: Arc<dyn TriviaStore>) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            store,
        }
    }
}

pub fn make_app(config: ServerConfig, store: Arc<dyn TriviaStore>) -> Router {
    let state = ServerState::new(config, store);

    let mut app: Router = Router::new()
        .route("/", get(home))
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
        .route("/questions", get(get_questions))
        .route("/questions", post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/search", post(search_questions))
        .route("/quizzes", post(play_quiz))
        .with_state(state.clone());

    app = app.layer(middleware::from_fn(access_control));
    app = app.layer(middleware::from_fn_with_state(state, log_requests));
    app
}

pub async fn run_server(
    store: Arc<dyn TriviaStore>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };
    let app = make_app(config, store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
