use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error};

use super::api_error::ApiError;
use super::paging::{page_from_query, paginate};
use super::state::GuardedTriviaStore;
use crate::trivia_store::{Category, NewQuestion, Question};

/// The upstream API never resolved what `current_category` means on the
/// listing and search endpoints, it always sends this literal.
pub const NO_CURRENT_CATEGORY: &str = "null";

fn category_map(categories: Vec<Category>) -> HashMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

/// Accepts an id as either a JSON number or a numeric string, the way
/// clients of the original API sent them.
pub(crate) fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: HashMap<i64, String>,
}

pub async fn get_categories(State(store): State<GuardedTriviaStore>) -> Response {
    match store.all_categories() {
        Ok(categories) => Json(CategoriesResponse {
            success: true,
            categories: category_map(categories),
        })
        .into_response(),
        Err(err) => {
            error!("Failed to fetch categories: {}", err);
            ApiError::Internal.into_response()
        }
    }
}

#[derive(Serialize)]
struct QuestionListResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: HashMap<i64, String>,
    current_category: &'static str,
}

pub async fn get_questions(
    State(store): State<GuardedTriviaStore>,
    RawQuery(query): RawQuery,
) -> Response {
    let questions = match store.all_questions() {
        Ok(questions) => questions,
        Err(err) => {
            error!("Failed to fetch questions: {}", err);
            return ApiError::Internal.into_response();
        }
    };
    let categories = match store.all_categories() {
        Ok(categories) => categories,
        Err(err) => {
            error!("Failed to fetch categories: {}", err);
            return ApiError::Internal.into_response();
        }
    };

    let total_questions = questions.len();
    let page = page_from_query(query.as_deref());
    let paginated = paginate(&questions, page);

    // An empty page is reported as a server failure, that is what the
    // frontend of the original deployment was built against.
    if paginated.is_empty() {
        return ApiError::Internal.into_response();
    }

    Json(QuestionListResponse {
        success: true,
        questions: paginated,
        total_questions,
        categories: category_map(categories),
        current_category: NO_CURRENT_CATEGORY,
    })
    .into_response()
}

#[derive(Serialize)]
struct DeleteQuestionResponse {
    success: bool,
    deleted_question: i64,
    message: &'static str,
}

pub async fn delete_question(
    State(store): State<GuardedTriviaStore>,
    Path(id): Path<i64>,
) -> Response {
    // A missing question and a store failure are indistinguishable to the
    // caller, both are unprocessable.
    match store.question_by_id(id) {
        Ok(Some(_)) => {}
        Ok(None) => return ApiError::Unprocessable.into_response(),
        Err(err) => {
            debug!("Failed to fetch question {}: {}", id, err);
            return ApiError::Unprocessable.into_response();
        }
    }

    match store.delete_question(id) {
        Ok(_) => Json(DeleteQuestionResponse {
            success: true,
            deleted_question: id,
            message: "deleted successfully",
        })
        .into_response(),
        Err(err) => {
            debug!("Failed to delete question {}: {}", id, err);
            ApiError::Unprocessable.into_response()
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateQuestionBody {
    pub question: String,
    pub answer: String,
    pub difficulty: Value,
    pub category: Value,
}

#[derive(Serialize)]
struct CreatedResponse {
    success: bool,
}

pub async fn create_question(
    State(store): State<GuardedTriviaStore>,
    body: Result<Json<CreateQuestionBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return ApiError::Unprocessable.into_response();
    };
    let (Some(difficulty), Some(category)) =
        (coerce_id(&body.difficulty), coerce_id(&body.category))
    else {
        return ApiError::Unprocessable.into_response();
    };

    let new_question = NewQuestion {
        question: body.question,
        answer: body.answer,
        category,
        difficulty,
    };
    match store.insert_question(new_question) {
        Ok(id) => {
            debug!("Created question {}", id);
            (StatusCode::CREATED, Json(CreatedResponse { success: true })).into_response()
        }
        Err(err) => {
            debug!("Failed to create question: {}", err);
            ApiError::Unprocessable.into_response()
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SearchBody {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    questions: Vec<Question>,
    #[serde(rename = "totalQuestions")]
    total_questions: usize,
    current_category: &'static str,
}

pub async fn search_questions(
    State(store): State<GuardedTriviaStore>,
    RawQuery(query): RawQuery,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return ApiError::NotFound.into_response();
    };

    let matches = match store.search_questions(&body.search_term) {
        Ok(matches) => matches,
        Err(err) => {
            error!("Failed to search questions: {}", err);
            return ApiError::NotFound.into_response();
        }
    };
    if matches.is_empty() {
        return ApiError::NotFound.into_response();
    }

    // The original API reports the global question count here, not the
    // number of matches.
    let total_questions = match store.questions_count() {
        Ok(count) => count,
        Err(err) => {
            error!("Failed to count questions: {}", err);
            return ApiError::NotFound.into_response();
        }
    };

    let page = page_from_query(query.as_deref());
    Json(SearchResponse {
        success: true,
        questions: paginate(&matches, page),
        total_questions,
        current_category: NO_CURRENT_CATEGORY,
    })
    .into_response()
}

#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    #[serde(rename = "totalQuestions")]
    total_questions: usize,
    #[serde(rename = "currentCategory")]
    current_category: String,
}

pub async fn get_category_questions(
    State(store): State<GuardedTriviaStore>,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Response {
    let category = match store.category_by_id(id) {
        Ok(Some(category)) => category,
        Ok(None) => return ApiError::NotFound.into_response(),
        Err(err) => {
            error!("Failed to fetch category {}: {}", id, err);
            return ApiError::NotFound.into_response();
        }
    };

    let questions = match store.questions_by_category(category.id) {
        Ok(questions) => questions,
        Err(err) => {
            error!("Failed to fetch questions of category {}: {}", id, err);
            return ApiError::NotFound.into_response();
        }
    };

    let total_questions = questions.len();
    let page = page_from_query(query.as_deref());
    Json(CategoryQuestionsResponse {
        success: true,
        questions: paginate(&questions, page),
        total_questions,
        current_category: category.kind,
    })
    .into_response()
}
