//! Quiz persistence: quizzes, their questions and submitted results.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

use super::connection::QuizStore;
use crate::Error;
use crate::quiz::{QuizData, QuizQuestion, QuizQuestionOption, Score, UserAnswers};

/// Row id of a stored quiz.
pub type QuizId = i64;

/// Descriptive fields supplied when a quiz is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizMeta {
    pub title: String,
    pub description: Option<String>,
    pub source_url: Option<String>,
    /// Fingerprint of the article text, see [`super::content_hash`].
    pub content_hash: Option<String>,
    pub user_id: Option<String>,
    pub topic: String,
    pub difficulty: String,
    pub is_public: bool,
}

impl QuizMeta {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            source_url: None,
            content_hash: None,
            user_id: None,
            topic: "general".into(),
            difficulty: "medium".into(),
            is_public: false,
        }
    }
}

/// A stored quiz row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizRecord {
    pub id: QuizId,
    #[serde(flatten)]
    pub meta: QuizMeta,
    pub created_at: String,
}

/// A stored quiz together with its ordered questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizDetails {
    pub quiz: QuizRecord,
    pub questions: Vec<QuizQuestion>,
}

impl QuizDetails {
    /// Rebuild the playable quiz.
    pub fn quiz_data(&self) -> QuizData {
        QuizData { title: self.quiz.meta.title.clone(), questions: self.questions.clone() }
    }
}

/// Persistence contract used by the server and CLI.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Insert a quiz and return its id.
    async fn create_quiz(&self, meta: &QuizMeta) -> Result<QuizId, Error>;

    /// Store the questions of `quiz_id` in order, replacing any previous set.
    async fn save_quiz_questions(&self, quiz_id: QuizId, questions: &[QuizQuestion]) -> Result<(), Error>;

    /// Record a submitted attempt.
    async fn save_quiz_result(&self, quiz_id: QuizId, score: &Score, answers: &UserAnswers) -> Result<(), Error>;

    /// Load a quiz and its questions.
    ///
    /// # Errors
    ///
    /// Returns `Error::QuizNotFound` when no quiz has this id.
    async fn get_quiz_details(&self, quiz_id: QuizId) -> Result<QuizDetails, Error>;
}

fn quiz_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuizRecord> {
    Ok(QuizRecord {
        id: row.get(0)?,
        meta: QuizMeta {
            title: row.get(1)?,
            description: row.get(2)?,
            source_url: row.get(3)?,
            content_hash: row.get(4)?,
            user_id: row.get(5)?,
            topic: row.get(6)?,
            difficulty: row.get(7)?,
            is_public: row.get::<_, i64>(8)? != 0,
        },
        created_at: row.get(9)?,
    })
}

const QUIZ_COLUMNS: &str =
    "id, title, description, source_url, content_hash, user_id, topic, difficulty, is_public, created_at";

#[async_trait]
impl QuizRepository for QuizStore {
    async fn create_quiz(&self, meta: &QuizMeta) -> Result<QuizId, Error> {
        let meta = meta.clone();
        self.conn
            .call(move |conn| -> Result<QuizId, Error> {
                conn.execute(
                    "INSERT INTO quizzes (
                        title, description, source_url, content_hash, user_id,
                        topic, difficulty, is_public, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        &meta.title,
                        &meta.description,
                        &meta.source_url,
                        &meta.content_hash,
                        &meta.user_id,
                        &meta.topic,
                        &meta.difficulty,
                        meta.is_public as i32,
                        chrono::Utc::now().to_rfc3339(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::from)
    }

    async fn save_quiz_questions(&self, quiz_id: QuizId, questions: &[QuizQuestion]) -> Result<(), Error> {
        let questions = questions.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM quiz_questions WHERE quiz_id = ?1", params![quiz_id])?;
                for (position, question) in questions.iter().enumerate() {
                    let options_json = serde_json::to_string(&question.options)
                        .map_err(|e| Error::CorruptRecord(format!("options of `{}`: {e}", question.id)))?;
                    tx.execute(
                        "INSERT INTO quiz_questions (
                            quiz_id, question_id, position, question_text,
                            options_json, correct_option_id, explanation
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            quiz_id,
                            &question.id,
                            position as i64,
                            &question.question_text,
                            options_json,
                            &question.correct_option_id,
                            &question.explanation,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn save_quiz_result(&self, quiz_id: QuizId, score: &Score, answers: &UserAnswers) -> Result<(), Error> {
        let score = *score;
        let answers_json =
            serde_json::to_string(answers).map_err(|e| Error::InvalidInput(format!("answers: {e}")))?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO quiz_results (quiz_id, correct_count, total, percentage, answers_json, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        quiz_id,
                        score.correct_count as i64,
                        score.total as i64,
                        score.percentage,
                        answers_json,
                        chrono::Utc::now().to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn get_quiz_details(&self, quiz_id: QuizId) -> Result<QuizDetails, Error> {
        self.conn
            .call(move |conn| -> Result<QuizDetails, Error> {
                let quiz = conn
                    .query_row(
                        &format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1"),
                        params![quiz_id],
                        quiz_record,
                    )
                    .optional()?
                    .ok_or_else(|| Error::QuizNotFound(quiz_id.to_string()))?;

                let mut stmt = conn.prepare(
                    "SELECT question_id, question_text, options_json, correct_option_id, explanation
                     FROM quiz_questions WHERE quiz_id = ?1 ORDER BY position",
                )?;
                let rows = stmt
                    .query_map(params![quiz_id], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, Option<String>>(4)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let questions = rows
                    .into_iter()
                    .map(|(id, question_text, options_json, correct_option_id, explanation)| {
                        let options: Vec<QuizQuestionOption> = serde_json::from_str(&options_json)
                            .map_err(|e| Error::CorruptRecord(format!("options of `{id}`: {e}")))?;
                        Ok(QuizQuestion { id, question_text, options, correct_option_id, explanation })
                    })
                    .collect::<Result<Vec<_>, Error>>()?;

                Ok(QuizDetails { quiz, questions })
            })
            .await
            .map_err(Error::from)
    }
}

impl QuizStore {
    /// Quizzes generated from `source_url`, newest first.
    pub async fn list_quizzes_for_source(&self, source_url: &str) -> Result<Vec<QuizRecord>, Error> {
        let source_url = source_url.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<QuizRecord>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE source_url = ?1 ORDER BY id DESC"
                ))?;
                let records = stmt
                    .query_map(params![source_url], quiz_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of results recorded for `quiz_id`.
    pub async fn count_results(&self, quiz_id: QuizId) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM quiz_results WHERE quiz_id = ?1",
                    params![quiz_id],
                    |row| row.get(0),
                )?;
                Ok(u64::try_from(count).unwrap_or_default())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::fixtures::sample_quiz;
    use crate::quiz::score;
    use crate::store::content_hash;

    async fn stored_sample(store: &QuizStore) -> QuizId {
        let mut meta = QuizMeta::new("Sample");
        meta.source_url = Some("https://example.com/article".into());
        meta.content_hash = Some(content_hash("Body text"));
        let id = store.create_quiz(&meta).await.unwrap();
        store.save_quiz_questions(id, &sample_quiz().questions).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_create_and_get_details() {
        let store = QuizStore::open_in_memory().await.unwrap();
        let id = stored_sample(&store).await;

        let details = store.get_quiz_details(id).await.unwrap();
        assert_eq!(details.quiz.id, id);
        assert_eq!(details.quiz.meta.topic, "general");
        assert_eq!(details.quiz_data(), sample_quiz());
    }

    #[tokio::test]
    async fn test_get_missing_quiz() {
        let store = QuizStore::open_in_memory().await.unwrap();
        let result = store.get_quiz_details(404).await;
        assert!(matches!(result, Err(Error::QuizNotFound(id)) if id == "404"));
    }

    #[tokio::test]
    async fn test_save_questions_replaces_previous_set() {
        let store = QuizStore::open_in_memory().await.unwrap();
        let id = stored_sample(&store).await;

        let first_only = &sample_quiz().questions[..1];
        store.save_quiz_questions(id, first_only).await.unwrap();

        let details = store.get_quiz_details(id).await.unwrap();
        assert_eq!(details.questions.len(), 1);
        assert_eq!(details.questions[0].id, "q1");
    }

    #[tokio::test]
    async fn test_questions_require_existing_quiz() {
        let store = QuizStore::open_in_memory().await.unwrap();
        let result = store.save_quiz_questions(999, &sample_quiz().questions).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_save_result() {
        let store = QuizStore::open_in_memory().await.unwrap();
        let id = stored_sample(&store).await;

        let answers: UserAnswers = [("q1", "q1-b"), ("q2", "q2-c")].into_iter().collect();
        let result = score(&sample_quiz(), &answers);
        store.save_quiz_result(id, &result, &answers).await.unwrap();
        store.save_quiz_result(id, &result, &answers).await.unwrap();

        assert_eq!(store.count_results(id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_quizzes_for_source() {
        let store = QuizStore::open_in_memory().await.unwrap();
        let first = stored_sample(&store).await;
        let second = stored_sample(&store).await;
        store.create_quiz(&QuizMeta::new("Unrelated")).await.unwrap();

        let records = store.list_quizzes_for_source("https://example.com/article").await.unwrap();
        let ids: Vec<QuizId> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(records[0].meta.content_hash.as_deref(), Some(content_hash("Body text").as_str()));
    }
}
