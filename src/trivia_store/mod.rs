mod models;
mod schema;
mod sqlite_store;

pub use models::{Category, NewQuestion, Question};
pub use sqlite_store::SqliteTriviaStore;

use anyhow::Result;

/// Data access for trivia questions and categories.
///
/// Handlers only ever see this trait, so they can be exercised against an
/// in-memory implementation without a database file.
pub trait TriviaStore: Send + Sync {
    fn all_questions(&self) -> Result<Vec<Question>>;

    fn question_by_id(&self, id: i64) -> Result<Option<Question>>;

    fn questions_by_category(&self, category_id: i64) -> Result<Vec<Question>>;

    /// Case-insensitive substring match on the question text.
    fn search_questions(&self, term: &str) -> Result<Vec<Question>>;

    /// Returns the id assigned to the new question.
    fn insert_question(&self, question: NewQuestion) -> Result<i64>;

    /// Returns false when no row with that id existed.
    fn delete_question(&self, id: i64) -> Result<bool>;

    fn all_categories(&self) -> Result<Vec<Category>>;

    fn category_by_id(&self, id: i64) -> Result<Option<Category>>;

    fn questions_count(&self) -> Result<usize>;
}
