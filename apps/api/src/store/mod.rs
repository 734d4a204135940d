pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::notification::Notification;
use crate::models::request::{RequestFilter, ResumeRequest, ResumeStatus};
use crate::models::user::{PasswordReset, ProfileChanges, Session, UserRecord, UserRole};
use crate::models::wallet::{Transaction, TransactionStatus};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row no longer maps onto the domain types.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence port for the marketplace. Handlers only ever talk to this
/// trait; `MemoryStore` and `PgStore` are the two adapters.
#[async_trait]
pub trait Store: Send + Sync {
    // Accounts
    /// Fails with `Conflict` when the email (case-insensitive) is taken.
    async fn insert_user(&self, user: &UserRecord) -> StoreResult<()>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRecord>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
    /// Writes only the profile columns and returns the fresh record, or
    /// `None` for an unknown id. Fails with `Conflict` when the new email
    /// belongs to another account.
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<UserRecord>>;
    /// Writes only the password hash. Returns false for an unknown id.
    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<bool>;
    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<UserRecord>>;

    // Sessions
    /// Expired sessions are pruned on insert.
    async fn insert_session(&self, session: &Session) -> StoreResult<()>;
    async fn find_session(&self, token: &str) -> StoreResult<Option<Session>>;
    async fn delete_session(&self, token: &str) -> StoreResult<()>;
    async fn delete_user_sessions(&self, user_id: Uuid) -> StoreResult<()>;

    // Password resets
    /// Expired resets are pruned on insert.
    async fn insert_password_reset(&self, reset: &PasswordReset) -> StoreResult<()>;
    /// Removes and returns the reset so it can only be redeemed once.
    async fn take_password_reset(&self, token: &str) -> StoreResult<Option<PasswordReset>>;

    // Resume requests
    async fn insert_request(&self, request: &ResumeRequest) -> StoreResult<()>;
    async fn find_request(&self, id: Uuid) -> StoreResult<Option<ResumeRequest>>;
    /// Overwrites the stored request only while its status is still
    /// `expected`. Returns false when another update got there first.
    async fn update_request(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
    ) -> StoreResult<bool>;
    /// Moves the request to COMPLETED and books the writer's credit in one
    /// atomic step. Neither is written when the status moved on from
    /// `expected`; returns false in that case.
    async fn complete_with_credit(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
        credit: &Transaction,
    ) -> StoreResult<bool>;
    /// Moves the request to DELIVERED and completes its pending credits in one
    /// atomic step. Returns false, writing nothing, when the status moved on
    /// from `expected`.
    async fn deliver_and_settle(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
        settled_at: chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<bool>;
    /// Newest first.
    async fn list_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<ResumeRequest>>;

    // Ledger
    async fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()>;
    /// Settles every pending credit booked against a request.
    async fn settle_credits(
        &self,
        request_id: Uuid,
        status: TransactionStatus,
        processed_at: chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<u64>;
    async fn list_transactions(&self, writer_id: Option<Uuid>) -> StoreResult<Vec<Transaction>>;
    /// Inserts a withdrawal only if the writer's balance covers it, checking
    /// and writing atomically. Returns false when the balance is short.
    async fn insert_withdrawal(&self, tx: &Transaction) -> StoreResult<bool>;

    // Notifications
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()>;
    /// Newest first.
    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>>;
    /// Returns false when no such notification belongs to the user.
    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}
