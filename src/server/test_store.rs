//! In-memory [TriviaStore] and request helpers shared by handler tests.

use crate::trivia_store::{Category, NewQuestion, Question, TriviaStore};
use anyhow::{bail, Result};
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryTriviaStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    questions: Vec<Question>,
    categories: Vec<Category>,
    fail: bool,
}

impl InMemoryTriviaStore {
    pub fn with_categories(kinds: &[&str]) -> Self {
        let categories = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| Category {
                id: i as i64 + 1,
                kind: (*kind).to_owned(),
            })
            .collect();
        InMemoryTriviaStore {
            inner: Mutex::new(Inner {
                questions: Vec::new(),
                categories,
                fail: false,
            }),
        }
    }

    pub fn add_question(&self, question: &str, answer: &str, category: i64, difficulty: i64) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.questions.iter().map(|q| q.id).max().unwrap_or(0) + 1;
        inner.questions.push(Question {
            id,
            question: question.to_owned(),
            answer: answer.to_owned(),
            category,
            difficulty,
        });
        id
    }

    /// Makes every store call fail from now on.
    pub fn fail_all(&self) {
        self.inner.lock().unwrap().fail = true;
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> Result<T> {
        let inner = self.inner.lock().unwrap();
        if inner.fail {
            bail!("store failure");
        }
        Ok(f(&inner))
    }
}

impl TriviaStore for InMemoryTriviaStore {
    fn all_questions(&self) -> Result<Vec<Question>> {
        self.read(|inner| inner.questions.clone())
    }

    fn question_by_id(&self, id: i64) -> Result<Option<Question>> {
        self.read(|inner| inner.questions.iter().find(|q| q.id == id).cloned())
    }

    fn questions_by_category(&self, category_id: i64) -> Result<Vec<Question>> {
        self.read(|inner| {
            inner
                .questions
                .iter()
                .filter(|q| q.category == category_id)
                .cloned()
                .collect()
        })
    }

    fn search_questions(&self, term: &str) -> Result<Vec<Question>> {
        let needle = term.to_lowercase();
        self.read(|inner| {
            inner
                .questions
                .iter()
                .filter(|q| q.question.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        })
    }

    fn insert_question(&self, question: NewQuestion) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail {
            bail!("store failure");
        }
        // The SQLite store enforces this as a foreign key.
        if !inner.categories.iter().any(|c| c.id == question.category) {
            bail!("unknown category {}", question.category);
        }
        let id = inner.questions.iter().map(|q| q.id).max().unwrap_or(0) + 1;
        inner.questions.push(Question {
            id,
            question: question.question,
            answer: question.answer,
            category: question.category,
            difficulty: question.difficulty,
        });
        Ok(id)
    }

    fn delete_question(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail {
            bail!("store failure");
        }
        let before = inner.questions.len();
        inner.questions.retain(|q| q.id != id);
        Ok(inner.questions.len() < before)
    }

    fn all_categories(&self) -> Result<Vec<Category>> {
        self.read(|inner| inner.categories.clone())
    }

    fn category_by_id(&self, id: i64) -> Result<Option<Category>> {
        self.read(|inner| inner.categories.iter().find(|c| c.id == id).cloned())
    }

    fn questions_count(&self) -> Result<usize> {
        self.read(|inner| inner.questions.len())
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn response_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
