//! Daily quiz-creation quotas.
//!
//! Counters are keyed by subject and UTC calendar day, so the allowance
//! resets at midnight UTC without any cleanup job.

use std::fmt;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

use super::connection::QuizStore;
use crate::{AppConfig, Error};

/// Who a quiz is being created for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UsageSubject {
    /// A signed-in user id.
    User(String),
    /// A client fingerprint for callers without an account.
    Anonymous(String),
}

impl UsageSubject {
    /// Resolve the subject from optional ids; the user id wins when present.
    pub fn from_ids(user_id: Option<&str>, client_id: Option<&str>) -> Self {
        let non_blank = |id: Option<&str>| id.map(str::trim).filter(|id| !id.is_empty()).map(str::to_string);
        match (non_blank(user_id), non_blank(client_id)) {
            (Some(user), _) => UsageSubject::User(user),
            (None, Some(client)) => UsageSubject::Anonymous(client),
            (None, None) => UsageSubject::Anonymous("anonymous".into()),
        }
    }

    fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UsageSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageSubject::User(id) => write!(f, "user:{id}"),
            UsageSubject::Anonymous(id) => write!(f, "anon:{id}"),
        }
    }
}

/// Quota contract consulted before a quiz is generated.
#[async_trait]
pub trait UsageQuota: Send + Sync {
    /// Whether `subject` may create another quiz today.
    async fn can_create_quiz(&self, subject: &UsageSubject) -> Result<bool, Error>;

    /// Count one created quiz against today's allowance.
    async fn increment_quiz_count(&self, subject: &UsageSubject) -> Result<(), Error>;

    /// Check and count in one step. `None` when the allowance is used up.
    async fn try_reserve(&self, subject: &UsageSubject) -> Result<Option<QuotaReservation>, Error>;

    /// Give back a reserved slot whose quiz was never created.
    async fn release(&self, reservation: QuotaReservation) -> Result<(), Error>;
}

/// A slot taken from one day's allowance by [`UsageQuota::try_reserve`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct QuotaReservation {
    subject: UsageSubject,
    day: NaiveDate,
}

impl QuotaReservation {
    pub fn subject(&self) -> &UsageSubject {
        &self.subject
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }
}

/// Per-day limits for each kind of subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    pub daily: u32,
    pub anonymous: u32,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self { daily: 3, anonymous: 1 }
    }
}

impl From<&AppConfig> for QuotaLimits {
    fn from(config: &AppConfig) -> Self {
        Self { daily: config.daily_quiz_limit, anonymous: config.anonymous_quiz_limit }
    }
}

impl QuotaLimits {
    pub fn for_subject(&self, subject: &UsageSubject) -> u32 {
        match subject {
            UsageSubject::User(_) => self.daily,
            UsageSubject::Anonymous(_) => self.anonymous,
        }
    }
}

/// SQLite-backed `UsageQuota`.
#[derive(Clone, Debug)]
pub struct UsageLedger {
    store: QuizStore,
    limits: QuotaLimits,
}

impl UsageLedger {
    pub fn new(store: QuizStore, limits: QuotaLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> QuotaLimits {
        self.limits
    }

    /// Quizzes left for `subject` today.
    pub async fn remaining(&self, subject: &UsageSubject) -> Result<u32, Error> {
        let used = self.created_on(subject, today()).await?;
        Ok(self.limits.for_subject(subject).saturating_sub(used))
    }

    pub(crate) async fn created_on(&self, subject: &UsageSubject, day: NaiveDate) -> Result<u32, Error> {
        let key = subject.key();
        let day = day.to_string();
        self.store
            .conn
            .call(move |conn| -> Result<u32, Error> {
                let count: Option<u32> = conn
                    .query_row(
                        "SELECT quizzes_created FROM quiz_usage WHERE subject = ?1 AND day = ?2",
                        params![key, day],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(count.unwrap_or(0))
            })
            .await
            .map_err(Error::from)
    }

    pub(crate) async fn increment_on(&self, subject: &UsageSubject, day: NaiveDate) -> Result<(), Error> {
        let key = subject.key();
        let day = day.to_string();
        self.store
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO quiz_usage (subject, day, quizzes_created, last_created_at)
                     VALUES (?1, ?2, 1, ?3)
                     ON CONFLICT(subject, day) DO UPDATE SET
                        quizzes_created = quizzes_created + 1,
                        last_created_at = excluded.last_created_at",
                    params![key, day, Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    pub(crate) async fn reserve_on(&self, subject: &UsageSubject, day: NaiveDate) -> Result<bool, Error> {
        let key = subject.key();
        let day = day.to_string();
        let limit = self.limits.for_subject(subject);
        let changed = self
            .store
            .conn
            .call(move |conn| -> Result<usize, Error> {
                // The insert arm is skipped for a zero limit; the update arm
                // only fires while the stored count is below the limit.
                let changed = conn.execute(
                    "INSERT INTO quiz_usage (subject, day, quizzes_created, last_created_at)
                     SELECT ?1, ?2, 1, ?3 WHERE ?4 > 0
                     ON CONFLICT(subject, day) DO UPDATE SET
                        quizzes_created = quizzes_created + 1,
                        last_created_at = excluded.last_created_at
                     WHERE quizzes_created < ?4",
                    params![key, day, Utc::now().to_rfc3339(), limit],
                )?;
                Ok(changed)
            })
            .await?;
        Ok(changed == 1)
    }

    pub(crate) async fn release_on(&self, subject: &UsageSubject, day: NaiveDate) -> Result<(), Error> {
        let key = subject.key();
        let day = day.to_string();
        self.store
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "UPDATE quiz_usage SET quizzes_created = MAX(quizzes_created - 1, 0)
                     WHERE subject = ?1 AND day = ?2",
                    params![key, day],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[async_trait]
impl UsageQuota for UsageLedger {
    async fn can_create_quiz(&self, subject: &UsageSubject) -> Result<bool, Error> {
        Ok(self.remaining(subject).await? > 0)
    }

    async fn increment_quiz_count(&self, subject: &UsageSubject) -> Result<(), Error> {
        self.increment_on(subject, today()).await?;
        tracing::debug!(subject = %subject, "quiz count incremented");
        Ok(())
    }

    async fn try_reserve(&self, subject: &UsageSubject) -> Result<Option<QuotaReservation>, Error> {
        let day = today();
        if !self.reserve_on(subject, day).await? {
            tracing::debug!(subject = %subject, "daily quota exhausted");
            return Ok(None);
        }
        Ok(Some(QuotaReservation { subject: subject.clone(), day }))
    }

    async fn release(&self, reservation: QuotaReservation) -> Result<(), Error> {
        self.release_on(&reservation.subject, reservation.day).await?;
        tracing::debug!(subject = %reservation.subject, "quota reservation released");
        Ok(())
    }
}
