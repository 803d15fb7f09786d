//! SQLite persistence for users and their login history.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error_handling::RecorderError;

use super::models::{LoginHistoryEntry, Role, User};

const USER_COLUMNS: &str = "id, name, email, role, created_at, last_login_ip, \
     last_login_timestamp, last_login_city, last_login_country, last_login_isp";

/// Handle on the `users` and `login_history` tables.
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: Arc<SqlitePool>,
}

impl UserStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        UserStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Registers a user. Fails with a database constraint error if the email
    /// is already taken.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (name, email, role, created_at) VALUES (?, ?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name.trim())
        .bind(email.trim())
        .bind(role.to_string())
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        let user = user_from_row(&row)?;
        log::info!("Created {} user {} ({})", user.role, user.id, user.email);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email.trim())
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// Returns up to `limit` of the user's most recent logins, oldest first.
    pub async fn login_history(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<LoginHistoryEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT timestamp, ip_address, city, country, isp FROM (
                SELECT id, timestamp, ip_address, city, country, isp
                FROM login_history
                WHERE user_id = ?
                ORDER BY id DESC
                LIMIT ?
            ) ORDER BY id ASC",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    pub async fn login_count(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM login_history WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool.as_ref())
            .await
    }

    /// Appends `entry` to the user's history and copies it into the user's
    /// last-login columns, atomically.
    ///
    /// The projection update runs first so the transaction takes SQLite's
    /// write lock on its first statement; concurrent appends then queue on
    /// the busy timeout instead of failing on a lock upgrade.
    pub async fn append_login(
        &self,
        user_id: i64,
        entry: &LoginHistoryEntry,
    ) -> Result<(), RecorderError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE users SET
                last_login_ip = ?,
                last_login_timestamp = ?,
                last_login_city = ?,
                last_login_country = ?,
                last_login_isp = ?
            WHERE id = ?",
        )
        .bind(&entry.ip_address)
        .bind(entry.timestamp)
        .bind(&entry.city)
        .bind(&entry.country)
        .bind(&entry.isp)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(RecorderError::UserNotFound(user_id));
        }

        sqlx::query(
            "INSERT INTO login_history (user_id, timestamp, ip_address, city, country, isp)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(entry.timestamp)
        .bind(&entry.ip_address)
        .bind(&entry.city)
        .bind(&entry.country)
        .bind(&entry.isp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = Role::from_str(&role).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    let last_login_ip: Option<String> = row.try_get("last_login_ip")?;
    let last_login_timestamp: Option<DateTime<Utc>> = row.try_get("last_login_timestamp")?;

    let last_login = match last_login_timestamp {
        Some(timestamp) => Some(LoginHistoryEntry {
            timestamp,
            ip_address: last_login_ip.clone().unwrap_or_default(),
            city: row
                .try_get::<Option<String>, _>("last_login_city")?
                .unwrap_or_default(),
            country: row
                .try_get::<Option<String>, _>("last_login_country")?
                .unwrap_or_default(),
            isp: row
                .try_get::<Option<String>, _>("last_login_isp")?
                .unwrap_or_default(),
        }),
        None => None,
    };

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role,
        created_at: row.try_get("created_at")?,
        last_login,
        last_login_ip,
        last_login_timestamp,
    })
}

fn entry_from_row(row: &SqliteRow) -> Result<LoginHistoryEntry, sqlx::Error> {
    Ok(LoginHistoryEntry {
        timestamp: row.try_get("timestamp")?,
        ip_address: row.try_get("ip_address")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        isp: row.try_get("isp")?,
    })
}
