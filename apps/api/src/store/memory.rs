use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::notification::Notification;
use crate::models::request::{RequestFilter, ResumeRequest, ResumeStatus};
use crate::models::user::{PasswordReset, ProfileChanges, Session, UserRecord, UserRole};
use crate::models::wallet::{Transaction, TransactionStatus, TransactionType};
use crate::wallet::ledger;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    sessions: HashMap<String, Session>,
    resets: HashMap<String, PasswordReset>,
    requests: HashMap<Uuid, ResumeRequest>,
    transactions: Vec<Transaction>,
    notifications: Vec<Notification>,
}

/// Process-local store. Everything lives behind one lock, so multi-step
/// operations (compare-and-set, balance check + insert) are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
    }

    /// Compare-and-set on the request status.
    fn replace_request(&mut self, request: &ResumeRequest, expected: ResumeStatus) -> bool {
        match self.requests.get_mut(&request.id) {
            Some(stored) if stored.status == expected => {
                *stored = request.clone();
                true
            }
            _ => false,
        }
    }

    fn settle_credits(
        &mut self,
        request_id: Uuid,
        status: TransactionStatus,
        processed_at: DateTime<Utc>,
    ) -> u64 {
        let mut settled = 0;
        for tx in self.transactions.iter_mut().filter(|tx| {
            tx.resume_request_id == Some(request_id)
                && tx.kind == TransactionType::Credit
                && tx.status == TransactionStatus::Pending
        }) {
            tx.status = status;
            tx.processed_at = Some(processed_at);
            settled += 1;
        }
        settled
    }
}

fn email_conflict(email: &str) -> StoreError {
    StoreError::Conflict(format!("An account with email {email} already exists"))
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &UserRecord) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.email_taken(&user.email, None) {
            return Err(email_conflict(&user.email));
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<UserRecord>> {
        let mut t = self.tables.write().await;
        if t.email_taken(&changes.email, Some(id)) {
            return Err(email_conflict(&changes.email));
        }
        Ok(t.users.get_mut(&id).map(|user| {
            user.name = changes.name.clone();
            user.email = changes.email.clone();
            user.phone = changes.phone.clone();
            user.specialization = changes.specialization.clone();
            user.experience = changes.experience.clone();
            user.updated_at = changes.updated_at;
            user.clone()
        }))
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        match t.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<UserRecord>> {
        let t = self.tables.read().await;
        let mut users: Vec<_> = t.users.values().filter(|u| u.role == role).cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        let now = Utc::now();
        let mut t = self.tables.write().await;
        t.sessions.retain(|_, s| !s.is_expired(now));
        t.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> StoreResult<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> StoreResult<()> {
        self.tables.write().await.sessions.remove(token);
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .sessions
            .retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn insert_password_reset(&self, reset: &PasswordReset) -> StoreResult<()> {
        let now = Utc::now();
        let mut t = self.tables.write().await;
        t.resets.retain(|_, r| !r.is_expired(now));
        t.resets.insert(reset.token.clone(), reset.clone());
        Ok(())
    }

    async fn take_password_reset(&self, token: &str) -> StoreResult<Option<PasswordReset>> {
        Ok(self.tables.write().await.resets.remove(token))
    }

    async fn insert_request(&self, request: &ResumeRequest) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .requests
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<ResumeRequest>> {
        Ok(self.tables.read().await.requests.get(&id).cloned())
    }

    async fn update_request(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
    ) -> StoreResult<bool> {
        Ok(self.tables.write().await.replace_request(request, expected))
    }

    async fn complete_with_credit(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
        credit: &Transaction,
    ) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.replace_request(request, expected) {
            return Ok(false);
        }
        t.transactions.push(credit.clone());
        Ok(true)
    }

    async fn deliver_and_settle(
        &self,
        request: &ResumeRequest,
        expected: ResumeStatus,
        settled_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !t.replace_request(request, expected) {
            return Ok(false);
        }
        t.settle_credits(request.id, TransactionStatus::Completed, settled_at);
        Ok(true)
    }

    async fn list_requests(&self, filter: &RequestFilter) -> StoreResult<Vec<ResumeRequest>> {
        let t = self.tables.read().await;
        let mut out: Vec<_> = t
            .requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        self.tables.write().await.transactions.push(tx.clone());
        Ok(())
    }

    async fn settle_credits(
        &self,
        request_id: Uuid,
        status: TransactionStatus,
        processed_at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        Ok(self
            .tables
            .write()
            .await
            .settle_credits(request_id, status, processed_at))
    }

    async fn list_transactions(&self, writer_id: Option<Uuid>) -> StoreResult<Vec<Transaction>> {
        let t = self.tables.read().await;
        let mut out: Vec<_> = t
            .transactions
            .iter()
            .filter(|tx| writer_id.map_or(true, |id| tx.writer_id == id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn insert_withdrawal(&self, tx: &Transaction) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let own: Vec<Transaction> = t
            .transactions
            .iter()
            .filter(|x| x.writer_id == tx.writer_id)
            .cloned()
            .collect();
        let wallet = ledger::summarize(tx.writer_id, &own);
        if ledger::check_withdrawal(tx.amount, wallet.balance).is_err() {
            return Ok(false);
        }
        t.transactions.push(tx.clone());
        Ok(true)
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let t = self.tables.read().await;
        let mut out: Vec<_> = t
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        match t
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
