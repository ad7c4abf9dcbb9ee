use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use super::api_error::ApiError;
use super::question_routes::coerce_id;
use super::state::GuardedTriviaStore;
use crate::trivia_store::Question;

/// Category id meaning "draw from all categories".
const ALL_CATEGORIES_ID: i64 = 0;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct QuizBody {
    pub previous_questions: Vec<i64>,
    pub quiz_category: Value,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    /// None is the exhausted state: every candidate was already asked.
    question: Option<Question>,
}

/// Draws one question uniformly at random among the candidates whose id is
/// not in `previous`. Returns None when no such candidate exists, so the
/// draw always terminates.
pub fn pick_quiz_question<R: Rng>(
    rng: &mut R,
    candidates: Vec<Question>,
    previous: &[i64],
) -> Option<Question> {
    let mut remaining: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .collect();
    if remaining.is_empty() {
        return None;
    }
    let index = rng.random_range(0..remaining.len());
    Some(remaining.swap_remove(index))
}

pub async fn play_quiz(
    State(store): State<GuardedTriviaStore>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return ApiError::NotFound.into_response();
    };
    let Some(category_id) = coerce_id(&body.quiz_category["id"]) else {
        return ApiError::NotFound.into_response();
    };

    let candidates = if category_id != ALL_CATEGORIES_ID {
        store.questions_by_category(category_id)
    } else {
        store.all_questions()
    };
    let candidates = match candidates {
        Ok(candidates) => candidates,
        Err(err) => {
            error!("Failed to fetch quiz candidates: {}", err);
            return ApiError::NotFound.into_response();
        }
    };

    let question = pick_quiz_question(&mut rand::rng(), candidates, &body.previous_questions);
    Json(QuizResponse {
        success: true,
        question,
    })
    .into_response()
}
