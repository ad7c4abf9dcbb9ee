use super::models::{Category, NewQuestion, Question};
use super::schema::VERSIONED_SCHEMAS;
use super::TriviaStore;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// SQLite-backed store for trivia questions and categories.
pub struct SqliteTriviaStore {
    conn: Mutex<Connection>,
}

// Offset so that a plain sqlite file with user_version 0 is not mistaken
// for one of ours.
const BASE_DB_VERSION: i64 = 310;

const TABLE_CATEGORY: &str = "category";
const TABLE_QUESTION: &str = "question";

/// Categories of the original deployment, inserted by `--seed-categories`.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

impl SqliteTriviaStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(db_path)?;
            Self::create_schema(&conn)?;
            conn
        };

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version: i64 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .context("Failed to read database version")?;

        match version - BASE_DB_VERSION {
            0 => Self::validate_schema_0(&conn)?,
            _ => bail!("Unknown database version {}", version),
        }

        let category_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))?;
        let question_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM question", [], |row| row.get(0))?;
        info!(
            "Opened trivia database: {} categories, {} questions",
            category_count, question_count
        );

        Ok(SqliteTriviaStore {
            conn: Mutex::new(conn),
        })
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        let latest = VERSIONED_SCHEMAS
            .last()
            .context("No schema versions defined")?;
        for table in latest.tables {
            conn.execute(table.schema, [])?;
            for index in table.indices {
                conn.execute(index, [])?;
            }
        }
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + latest.version as i64)?;

        Ok(())
    }

    fn validate_schema_0(conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", TABLE_CATEGORY))?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))?
            .collect::<Result<_, _>>()?;

        if columns != ["id", "kind", "created"] {
            bail!(
                "Schema validation failed for category table, found {:?}",
                columns
            );
        }

        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", TABLE_QUESTION))?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))?
            .collect::<Result<_, _>>()?;

        if columns != ["id", "question", "answer", "category", "difficulty", "created"] {
            bail!(
                "Schema validation failed for question table, found {:?}",
                columns
            );
        }

        Ok(())
    }

    /// Inserts [DEFAULT_CATEGORIES] into an empty category table.
    /// Returns the number of rows inserted, 0 when categories already exist.
    pub fn seed_default_categories(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let existing: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", TABLE_CATEGORY),
            [],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(0);
        }
        for kind in DEFAULT_CATEGORIES {
            conn.execute(
                &format!("INSERT INTO {} (kind) VALUES (?1)", TABLE_CATEGORY),
                params![kind],
            )?;
        }
        Ok(DEFAULT_CATEGORIES.len())
    }

    fn map_question(row: &rusqlite::Row) -> rusqlite::Result<Question> {
        Ok(Question {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: row.get(2)?,
            category: row.get(3)?,
            difficulty: row.get(4)?,
        })
    }
}

const QUESTION_COLUMNS: &str = "id, question, answer, category, difficulty";

impl TriviaStore for SqliteTriviaStore {
    fn all_questions(&self) -> Result<Vec<Question>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            QUESTION_COLUMNS, TABLE_QUESTION
        ))?;
        let questions = stmt
            .query_map([], Self::map_question)?
            .collect::<Result<_, _>>()
            .context("Failed to fetch questions")?;
        Ok(questions)
    }

    fn question_by_id(&self, id: i64) -> Result<Option<Question>> {
        let conn = self.conn.lock().unwrap();
        let question = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    QUESTION_COLUMNS, TABLE_QUESTION
                ),
                params![id],
                Self::map_question,
            )
            .optional()
            .with_context(|| format!("Failed to fetch question {}", id))?;
        Ok(question)
    }

    fn questions_by_category(&self, category_id: i64) -> Result<Vec<Question>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE category = ?1 ORDER BY id",
            QUESTION_COLUMNS, TABLE_QUESTION
        ))?;
        let questions = stmt
            .query_map(params![category_id], Self::map_question)?
            .collect::<Result<_, _>>()
            .with_context(|| format!("Failed to fetch questions of category {}", category_id))?;
        Ok(questions)
    }

    fn search_questions(&self, term: &str) -> Result<Vec<Question>> {
        let conn = self.conn.lock().unwrap();
        // LIKE is case-insensitive for ASCII, matching the substring search
        // contract of the API.
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE question LIKE '%' || ?1 || '%' ORDER BY id",
            QUESTION_COLUMNS, TABLE_QUESTION
        ))?;
        let questions = stmt
            .query_map(params![term], Self::map_question)?
            .collect::<Result<_, _>>()
            .with_context(|| format!("Failed to search questions for {:?}", term))?;
        Ok(questions)
    }

    fn insert_question(&self, question: NewQuestion) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)",
                TABLE_QUESTION
            ),
            params![
                question.question,
                question.answer,
                question.category,
                question.difficulty
            ],
        )
        .context("Failed to insert question")?;
        Ok(conn.last_insert_rowid())
    }

    fn delete_question(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", TABLE_QUESTION),
                params![id],
            )
            .with_context(|| format!("Failed to delete question {}", id))?;
        Ok(deleted > 0)
    }

    fn all_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, kind FROM {} ORDER BY id",
            TABLE_CATEGORY
        ))?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    kind: row.get(1)?,
                })
            })?
            .collect::<Result<_, _>>()
            .context("Failed to fetch categories")?;
        Ok(categories)
    }

    fn category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn.lock().unwrap();
        let category = conn
            .query_row(
                &format!("SELECT id, kind FROM {} WHERE id = ?1", TABLE_CATEGORY),
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        kind: row.get(1)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("Failed to fetch category {}", id))?;
        Ok(category)
    }

    fn questions_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", TABLE_QUESTION),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use tempfile::TempDir;

    fn create_tmp_store() -> (SqliteTriviaStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let temp_file_path = temp_dir.path().join("test.db");
        let store = SqliteTriviaStore::new(&temp_file_path).unwrap();
        (store, temp_dir)
    }

    fn seeded_question(store: &SqliteTriviaStore, text: &str, category: i64) -> i64 {
        store
            .insert_question(NewQuestion {
                question: text.to_owned(),
                answer: "42".to_owned(),
                category,
                difficulty: 2,
            })
            .unwrap()
    }

    #[test]
    fn seeds_default_categories_once() {
        let (store, _temp_dir) = create_tmp_store();

        assert_eq!(store.seed_default_categories().unwrap(), 6);
        assert_eq!(store.seed_default_categories().unwrap(), 0);

        let categories = store.all_categories().unwrap();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0].kind, "Science");
    }

    #[test]
    fn inserts_and_fetches_questions() {
        let (store, _temp_dir) = create_tmp_store();
        store.seed_default_categories().unwrap();

        let id = seeded_question(&store, "What boils at 100C?", 1);

        let fetched = store.question_by_id(id).unwrap().unwrap();
        assert_eq!(fetched.question, "What boils at 100C?");
        assert_eq!(fetched.category, 1);

        assert_eq!(store.all_questions().unwrap().len(), 1);
        assert_eq!(store.questions_count().unwrap(), 1);
        assert!(store.question_by_id(id + 1).unwrap().is_none());
    }

    #[test]
    fn filters_questions_by_category() {
        let (store, _temp_dir) = create_tmp_store();
        store.seed_default_categories().unwrap();

        seeded_question(&store, "science one", 1);
        seeded_question(&store, "science two", 1);
        seeded_question(&store, "art one", 2);

        let science = store.questions_by_category(1).unwrap();
        assert_eq!(science.len(), 2);
        assert!(science.iter().all(|q| q.category == 1));

        assert!(store.questions_by_category(3).unwrap().is_empty());
    }

    #[test]
    fn cannot_insert_question_without_category() {
        let (store, _temp_dir) = create_tmp_store();

        let result = store.insert_question(NewQuestion {
            question: "orphan".to_owned(),
            answer: "none".to_owned(),
            category: 1,
            difficulty: 1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn delete_reports_missing_rows() {
        let (store, _temp_dir) = create_tmp_store();
        store.seed_default_categories().unwrap();

        let id = seeded_question(&store, "to delete", 1);

        assert!(store.delete_question(id).unwrap());
        assert!(!store.delete_question(id).unwrap());
        assert!(store.question_by_id(id).unwrap().is_none());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let (store, _temp_dir) = create_tmp_store();
        store.seed_default_categories().unwrap();

        seeded_question(&store, "What is the Title of the book?", 1);
        seeded_question(&store, "Unrelated", 2);

        let matches = store.search_questions("title").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].question, "What is the Title of the book?");

        assert!(store.search_questions("nothing here").unwrap().is_empty());
        assert_eq!(store.search_questions("").unwrap().len(), 2);
    }

    #[test]
    fn reopens_existing_database() {
        let temp_dir = TempDir::new().unwrap();
        let temp_file_path = temp_dir.path().join("test.db");

        let store = SqliteTriviaStore::new(&temp_file_path).unwrap();
        store.seed_default_categories().unwrap();
        let id = seeded_question(&store, "persisted", 1);
        drop(store);

        let reopened = SqliteTriviaStore::new(&temp_file_path).unwrap();
        assert_eq!(reopened.all_categories().unwrap().len(), 6);
        assert_eq!(
            reopened.question_by_id(id).unwrap().unwrap().question,
            "persisted"
        );
    }
}
