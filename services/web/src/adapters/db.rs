//! services/web/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use summarizer_core::domain::{
    AuthSession, NewSummary, Summary, SummaryPage, User, UserCredentials,
};
use summarizer_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    const DEFAULT_POOL_SIZE: u32 = 5;

    /// Opens (and creates, if missing) the SQLite database at `url`.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Opens the database with a custom pool size. In-memory databases need a size of 1.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Connected to database");
        Ok(Self { pool })
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    username: String,
    email: String,
    confirmed: bool,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            confirmed: self.confirmed,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    username: String,
    password_hash: String,
    confirmed: bool,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            username: self.username,
            hashed_password: self.password_hash,
            confirmed: self.confirmed,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            user_id: self.user_id,
            expires_at: self.expires_at,
        }
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    user_id: Uuid,
    original_text: String,
    summary_text: String,
    language: String,
    length_choice: String,
    created_at: DateTime<Utc>,
}
impl SummaryRecord {
    fn to_domain(self) -> PortResult<Summary> {
        let language = self
            .language
            .parse()
            .map_err(|e| PortError::Unexpected(format!("Summary {}: {}", self.id, e)))?;
        let length = self
            .length_choice
            .parse()
            .map_err(|e| PortError::Unexpected(format!("Summary {}: {}", self.id, e)))?;
        Ok(Summary {
            id: self.id,
            user_id: self.user_id,
            original_text: self.original_text,
            summary_text: self.summary_text,
            language,
            length,
            created_at: self.created_at,
        })
    }
}

const SUMMARY_COLUMNS: &str =
    "id, user_id, original_text, summary_text, language, length_choice, created_at";

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let user_id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, email, password_hash, confirmed, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return PortError::Conflict(format!("User {} / {}", username, email));
                }
            }
            unexpected(e)
        })?;

        Ok(User {
            user_id,
            username: username.to_string(),
            email: email.to_string(),
            confirmed: false,
            created_at,
        })
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, username, email, confirmed, created_at FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, username, email, confirmed, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User with email {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, username, password_hash, confirmed FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", username)))?;
        Ok(record.to_domain())
    }

    async fn username_exists(&self, username: &str) -> PortResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> PortResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count > 0)
    }

    async fn confirm_user(&self, user_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET confirmed = 1 WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let session = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, expires_at FROM auth_sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .map(AuthSessionRecord::to_domain)
        .ok_or(PortError::Unauthorized)?;

        if session.expires_at <= Utc::now() {
            self.delete_auth_session(&session.id).await?;
            return Err(PortError::Unauthorized);
        }
        Ok(session.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn save_summary(&self, summary: NewSummary) -> PortResult<Summary> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO summaries
                (id, user_id, original_text, summary_text, language, length_choice, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(summary.user_id)
        .bind(&summary.original_text)
        .bind(&summary.summary_text)
        .bind(summary.language.code())
        .bind(summary.length.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(Summary {
            id,
            user_id: summary.user_id,
            original_text: summary.original_text,
            summary_text: summary.summary_text,
            language: summary.language,
            length: summary.length,
            created_at,
        })
    }

    async fn get_summary_by_id(&self, summary_id: Uuid) -> PortResult<Summary> {
        let record = sqlx::query_as::<_, SummaryRecord>(&format!(
            "SELECT {} FROM summaries WHERE id = ?",
            SUMMARY_COLUMNS
        ))
        .bind(summary_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Summary {} not found", summary_id)))?;
        record.to_domain()
    }

    async fn list_summaries_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        per_page: u32,
    ) -> PortResult<SummaryPage> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let offset = (page as i64 - 1) * per_page as i64;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM summaries WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        let records = sqlx::query_as::<_, SummaryRecord>(&format!(
            "SELECT {} FROM summaries WHERE user_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let items = records
            .into_iter()
            .map(SummaryRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;

        Ok(SummaryPage {
            items,
            page,
            per_page,
            total: total as u64,
        })
    }

    async fn update_summary_text(&self, summary_id: Uuid, summary_text: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE summaries SET summary_text = ? WHERE id = ?")
            .bind(summary_text)
            .bind(summary_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Summary {} not found", summary_id)));
        }
        Ok(())
    }

    async fn delete_summary(&self, summary_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM summaries WHERE id = ?")
            .bind(summary_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Summary {} not found", summary_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use summarizer_core::domain::{Language, LengthChoice};

    async fn test_db() -> DbAdapter {
        let db = DbAdapter::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    fn new_summary(user_id: Uuid, text: &str) -> NewSummary {
        NewSummary {
            user_id,
            original_text: format!("original {text}"),
            summary_text: text.to_string(),
            language: Language::English,
            length: LengthChoice::Short,
        }
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let db = test_db().await;

        let user = db.create_user("alice", "alice@example.com", "hash").await.unwrap();
        assert!(!user.confirmed);
        assert!(db.username_exists("alice").await.unwrap());
        assert!(db.email_exists("alice@example.com").await.unwrap());
        assert!(!db.username_exists("bob").await.unwrap());

        db.confirm_user(user.user_id).await.unwrap();
        let fetched = db.get_user_by_email("alice@example.com").await.unwrap();
        assert!(fetched.confirmed);
        assert_eq!(fetched.username, "alice");

        let creds = db.get_credentials_by_username("alice").await.unwrap();
        assert_eq!(creds.hashed_password, "hash");
        assert!(creds.confirmed);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let db = test_db().await;
        db.create_user("alice", "a@example.com", "hash").await.unwrap();
        let err = db
            .create_user("alice", "other@example.com", "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let db = test_db().await;
        let err = db.get_user_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
        let err = db.get_credentials_by_username("ghost").await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_auth_session_expiry() {
        let db = test_db().await;
        let user = db.create_user("alice", "a@example.com", "hash").await.unwrap();

        db.create_auth_session("live", user.user_id, Utc::now() + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(db.validate_auth_session("live").await.unwrap(), user.user_id);

        db.create_auth_session("stale", user.user_id, Utc::now() - Duration::seconds(1))
            .await
            .unwrap();
        assert!(matches!(
            db.validate_auth_session("stale").await,
            Err(PortError::Unauthorized)
        ));

        db.delete_auth_session("live").await.unwrap();
        assert!(matches!(
            db.validate_auth_session("live").await,
            Err(PortError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_pagination_is_scoped_to_owner() {
        let db = test_db().await;
        let alice = db.create_user("alice", "a@example.com", "hash").await.unwrap();
        let bob = db.create_user("bob", "b@example.com", "hash").await.unwrap();

        for i in 0..7 {
            db.save_summary(new_summary(alice.user_id, &format!("alice-{i}")))
                .await
                .unwrap();
        }
        db.save_summary(new_summary(bob.user_id, "bob-0")).await.unwrap();

        let first = db.list_summaries_for_user(alice.user_id, 1, 5).await.unwrap();
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.total, 7);
        assert!(first.items.iter().all(|s| s.user_id == alice.user_id));
        assert_eq!(first.items[0].summary_text, "alice-6");

        let second = db.list_summaries_for_user(alice.user_id, 2, 5).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert!(!second.has_next());

        let beyond = db.list_summaries_for_user(alice.user_id, 9, 5).await.unwrap();
        assert!(beyond.items.is_empty());

        let bobs = db.list_summaries_for_user(bob.user_id, 1, 5).await.unwrap();
        assert_eq!(bobs.total, 1);
    }

    #[tokio::test]
    async fn test_summary_update_and_delete() {
        let db = test_db().await;
        let user = db.create_user("alice", "a@example.com", "hash").await.unwrap();
        let saved = db.save_summary(new_summary(user.user_id, "first")).await.unwrap();

        db.update_summary_text(saved.id, "edited").await.unwrap();
        let fetched = db.get_summary_by_id(saved.id).await.unwrap();
        assert_eq!(fetched.summary_text, "edited");
        assert_eq!(fetched.length, LengthChoice::Short);

        db.delete_summary(saved.id).await.unwrap();
        assert!(matches!(
            db.get_summary_by_id(saved.id).await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            db.delete_summary(saved.id).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_summary_requires_existing_user() {
        let db = test_db().await;
        let err = db
            .save_summary(new_summary(Uuid::new_v4(), "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }
}
