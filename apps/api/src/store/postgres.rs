use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::notification::{Notification, NotificationRow};
use crate::models::request::{RequestFilter, ResumeRequest, ResumeRequestRow, ResumeStatus};
use crate::models::user::{PasswordReset, ProfileChanges, Session, UserRecord, UserRole, UserRow};
use crate::models::wallet::{Transaction, TransactionRow, TransactionStatus};
use crate::wallet::ledger;

/// PostgreSQL adapter. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn email_conflict(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("An account with email {email} already exists"))
        }
        _ => StoreError::Database(err),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn decode<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = String>,
{
    rows.into_iter()
        .map(|r| T::try_from(r).map_err(StoreError::Corrupt))
        .collect()
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &UserRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, name, role, phone, specialization, experience,
                 password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(&user.phone)
        .bind(&user.specialization)
        .bind(&user.experience)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &user.email))?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| UserRecord::try_from(r).map_err(StoreError::Corrupt))
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| UserRecord::try_from(r).map_err(StoreError::Corrupt))
            .transpose()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<UserRecord>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            UPDATE users
            SET email = $2, name = $3, phone = $4, specialization = $5,
                experience = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.specialization)
        .bind(&changes.experience)
        .bind(changes.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &changes.email))?;
        row.map(|r| UserRecord::try_from(r).map_err(StoreError::Corrupt))
            .transpose()
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .bind(updated_at)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<UserRecord>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT * FROM users WHERE role = $1 ORDER BY created_at ASC")
                .bind(role.as_str())
                .fetch_all(&self.pool)
                .await?;
        decode(rows)
    }

    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> StoreResult<Option<Session>> {
        Ok(sqlx::query_as("SELECT * FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_session(&self, token: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_password_reset(&self, reset: &PasswordReset) -> StoreResult<()> {
        sqlx::query("DELETE FROM password_resets WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        sqlx::query("INSERT INTO password_resets (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&reset.token)
            .bind(reset.user_id)
            .bind(reset.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn take_password_reset(&self, token: &str) -> StoreResult<Option<PasswordReset>> {
        Ok(
            sqlx::query_as("DELETE FROM password_resets WHERE token = $1 RETURNING *")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_request(&self, request: &ResumeRequest) -> StoreResult<()> {
        let form_data = to_json(&request.form_data)?;
        let feedback = request.feedback.as_ref().map(to_json).transpose()?;
        sqlx::query(
            r#"
            INSERT INTO resume_requests
                (id, client_id, writer_id, supervisor_id, category, subcategory, status,
                 form_data, original_resume_url, completed_resume_url, certificates_urls,
                 price, payment_id, payment_status, feedback, created_at, updated_at,
                 assigned_at, completed_at, delivered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20)
            "#,
        )
        .bind(request.id)
        .bind(request.client_id)
        .bind(request.writer_id)
        .bind(request.supervisor_id)
        .bind(request.category.as_str())
        .bind(&request.subcategory)
        .bind(request.status.as_str())
        .bind(&form_data)
        .bind(&request.original_resume_url)
        .bind(&request.completed_resume_url)
        .bind(&request.certificates_urls)
        .bind(request.price)
        .bind(&request.payment_id)
        .bind(request.payment_status.map(|s| s.as_str()))
        .bind(&feedback)
        .bind(request.created_at)
        .bind(request.updated_at)
        .bind(request.assigned_at)
        .bind(request.completed_at)
        .bind(request.delivered_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<ResumeRequest>> {
        let row: Option<ResumeRequestRow> =
            sqlx::query_as("SELECT * FROM resume_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| ResumeRequest::try_from(r).map_err(StoreError::Corrupt))
            .transpose()
    }

    async fn update_request(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
    ) -> StoreResult<bool> {
        update_request_with(&self.pool, request, expected).await
    }

    async fn complete_with_credit(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
        credit: &Transaction,
    ) -> StoreResult<bool> {
        let mut db_tx = self.pool.begin().await?;
        if !update_request_with(&mut *db_tx, request, expected).await? {
            db_tx.rollback().await?;
            return Ok(false);
        }
        insert_transaction_with(&mut *db_tx, credit).await?;
        db_tx.commit().await?;
        Ok(true)
    }

    async fn deliver_and_settle(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
        settled_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut db_tx = self.pool.begin().await?;
        if !update_request_with(&mut *db_tx, request, expected).await? {
            db_tx.rollback().await?;
            return Ok(false);
        }
        settle_credits_with(&mut *db_tx, request.id, TransactionStatus::Completed, settled_at)
            .await?;
        db_tx.commit().await?;
        Ok(true)
    }

    async fn list_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<ResumeRequest>> {
        let rows: Vec<ResumeRequestRow> = sqlx::query_as(
            r#"
            SELECT * FROM resume_requests
            WHERE ($1::uuid IS NULL OR client_id = $1)
              AND ($2::uuid IS NULL OR writer_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.client_id)
        .bind(filter.writer_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        decode(rows)
    }

    async fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        insert_transaction_with(&self.pool, tx).await
    }

    async fn settle_credits(
        &self,
        request_id: Uuid,
        status: TransactionStatus,
        processed_at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        settle_credits_with(&self.pool, request_id, status, processed_at).await
    }

    async fn list_transactions(&self, writer_id: Option<Uuid>) -> StoreResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT * FROM transactions
            WHERE ($1::uuid IS NULL OR writer_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(writer_id)
        .fetch_all(&self.pool)
        .await?;
        decode(rows)
    }

    async fn insert_withdrawal(&self, tx: &Transaction) -> StoreResult<bool> {
        let mut db_tx = self.pool.begin().await?;

        // Serialize withdrawals per writer on the user row.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(tx.writer_id)
            .execute(&mut *db_tx)
            .await?;

        let rows: Vec<TransactionRow> =
            sqlx::query_as("SELECT * FROM transactions WHERE writer_id = $1")
                .bind(tx.writer_id)
                .fetch_all(&mut *db_tx)
                .await?;
        let existing: Vec<Transaction> = decode(rows)?;
        let wallet = ledger::summarize(tx.writer_id, &existing);
        if ledger::check_withdrawal(tx.amount, wallet.balance).is_err() {
            db_tx.rollback().await?;
            return Ok(false);
        }

        insert_transaction_with(&mut *db_tx, tx).await?;
        db_tx.commit().await?;
        Ok(true)
    }

    async fn insert_notification(&self, n: &Notification) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, message, read, created_at, data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(n.id)
        .bind(n.user_id)
        .bind(n.kind.as_str())
        .bind(&n.message)
        .bind(n.read)
        .bind(n.created_at)
        .bind(&n.data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        decode(rows)
    }

    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }
}

async fn insert_transaction_with<'e, E>(executor: E, tx: &Transaction) -> StoreResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO transactions
            (id, writer_id, resume_request_id, kind, amount, status, description,
             created_at, processed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(tx.id)
    .bind(tx.writer_id)
    .bind(tx.resume_request_id)
    .bind(tx.kind.as_str())
    .bind(tx.amount)
    .bind(tx.status.as_str())
    .bind(&tx.description)
    .bind(tx.created_at)
    .bind(tx.processed_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Compare-and-set on status; zero rows means a concurrent update won.
async fn update_request_with<'e, E>(
    executor: E,
    request: &ResumeRequest,
    expected: ResumeStatus,
) -> StoreResult<bool>
where
    E: sqlx::PgExecutor<'e>,
{
    let feedback = request.feedback.as_ref().map(to_json).transpose()?;
    let result = sqlx::query(
        r#"
        UPDATE resume_requests
        SET writer_id = $3, supervisor_id = $4, status = $5,
            completed_resume_url = $6, payment_id = $7, payment_status = $8,
            feedback = $9, updated_at = $10, assigned_at = $11,
            completed_at = $12, delivered_at = $13
        WHERE id = $1 AND status = $2
        "#,
    )
    .bind(request.id)
    .bind(expected.as_str())
    .bind(request.writer_id)
    .bind(request.supervisor_id)
    .bind(request.status.as_str())
    .bind(&request.completed_resume_url)
    .bind(&request.payment_id)
    .bind(request.payment_status.map(|s| s.as_str()))
    .bind(&feedback)
    .bind(request.updated_at)
    .bind(request.assigned_at)
    .bind(request.completed_at)
    .bind(request.delivered_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

async fn settle_credits_with<'e, E>(
    executor: E,
    request_id: Uuid,
    status: TransactionStatus,
    processed_at: DateTime<Utc>,
) -> StoreResult<u64>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE transactions SET status = $2, processed_at = $3
        WHERE resume_request_id = $1 AND kind = 'CREDIT' AND status = 'PENDING'
        "#,
    )
    .bind(request_id)
    .bind(status.as_str())
    .bind(processed_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
