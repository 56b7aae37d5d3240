//! In-memory [`Store`](crate::domain::ports::Store) adapter.
//!
//! Used when no database URL is configured and by the test suites. All three
//! repositories share one `tokio::sync::Mutex`, so every read-modify-write
//! (including the mutator call) happens under a single lock and updates are
//! trivially atomic.
//!
//! Referential rules mirror the PostgreSQL schema: a condominium cannot be
//! removed while referenced, and removing an account removes its visits.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex;

use crate::domain::ports::{
    CondominiumRepository, Mutator, StoreError, UserRepository, VisitRepository,
};
use crate::domain::{
    Account, AccountFilter, Condominium, CondominiumId, NewAccount, NewCondominium, NewVisit,
    Role, UserId, Visit, VisitCode, normalize_email,
};

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, Account>,
    condominiums: BTreeMap<CondominiumId, Condominium>,
    visits: BTreeMap<VisitCode, Visit>,
    next_user_id: i64,
    next_condominium_id: i64,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    fn allocate_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        UserId::new(self.next_user_id)
    }

    fn allocate_condominium_id(&mut self) -> CondominiumId {
        self.next_condominium_id += 1;
        CondominiumId::new(self.next_condominium_id)
    }

    fn condominium_exists(&self, id: Option<CondominiumId>) -> bool {
        id.is_none_or(|id| self.condominiums.contains_key(&id))
    }
}

fn missing_condominium() -> StoreError {
    StoreError::conflict("referenced condominium does not exist")
}

/// Process-local store.
pub struct MemoryStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        super::storage_now(self.clock.as_ref())
    }

    /// Empty store stamping timestamps with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Account, StoreError> {
        let state = self.state.lock().await;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id.to_string()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let email = normalize_email(email);
        let state = self.state.lock().await;
        Ok(state.users.values().find(|user| user.email == email).cloned())
    }

    async fn list_users(&self, filter: &AccountFilter) -> Result<Vec<Account>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect())
    }

    async fn create_user(&self, account: NewAccount) -> Result<Account, StoreError> {
        account.validate()?;
        let mut state = self.state.lock().await;
        let email = normalize_email(&account.email);
        if state.email_taken(&email, None) {
            return Err(StoreError::conflict("email already in use"));
        }
        if !state.condominium_exists(account.condominium_id) {
            return Err(missing_condominium());
        }
        let id = state.allocate_user_id();
        let created = account.into_account(id, self.now());
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn update_user(
        &self,
        id: UserId,
        mutator: Mutator<Account>,
    ) -> Result<Account, StoreError> {
        let mut state = self.state.lock().await;
        let current = state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id.to_string()))?;
        let mut next = mutator(current.clone()).map_err(StoreError::rejected)?;
        next.id = current.id;
        next.created_at = current.created_at;
        next.created_by = current.created_by;
        next.email = normalize_email(&next.email);
        next.validate()?;
        if state.email_taken(&next.email, Some(id)) {
            return Err(StoreError::conflict("email already in use"));
        }
        if !state.condominium_exists(next.condominium_id) {
            return Err(missing_condominium());
        }
        next.updated_at = self.now();
        state.users.insert(id, next.clone());
        Ok(next)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&id) {
            return Err(StoreError::not_found("user", id.to_string()));
        }
        state.users.remove(&id);
        state.visits.retain(|_, visit| visit.created_by != id);
        Ok(())
    }

    async fn count_users_by_role(&self, role: Role) -> Result<u64, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.values().filter(|user| user.role == role).count() as u64)
    }

    async fn count_superadmins(&self) -> Result<u64, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|user| user.role == Role::Superadmin && user.enabled)
            .count() as u64)
    }
}

#[async_trait]
impl CondominiumRepository for MemoryStore {
    async fn get_condominium(&self, id: CondominiumId) -> Result<Condominium, StoreError> {
        let state = self.state.lock().await;
        state
            .condominiums
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("condominium", id.to_string()))
    }

    async fn list_condominiums(&self) -> Result<Vec<Condominium>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.condominiums.values().cloned().collect())
    }

    async fn create_condominium(
        &self,
        condominium: NewCondominium,
    ) -> Result<Condominium, StoreError> {
        condominium.validate()?;
        let mut state = self.state.lock().await;
        let id = state.allocate_condominium_id();
        let created = condominium.into_condominium(id, self.now());
        state.condominiums.insert(id, created.clone());
        Ok(created)
    }

    async fn update_condominium(
        &self,
        id: CondominiumId,
        mutator: Mutator<Condominium>,
    ) -> Result<Condominium, StoreError> {
        let mut state = self.state.lock().await;
        let current = state
            .condominiums
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("condominium", id.to_string()))?;
        let mut next = mutator(current.clone()).map_err(StoreError::rejected)?;
        next.id = current.id;
        next.created_at = current.created_at;
        next.created_by = current.created_by;
        next.validate()?;
        next.updated_at = self.now();
        state.condominiums.insert(id, next.clone());
        Ok(next)
    }

    async fn delete_condominium(&self, id: CondominiumId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.condominiums.contains_key(&id) {
            return Err(StoreError::not_found("condominium", id.to_string()));
        }
        let referenced = state
            .users
            .values()
            .any(|user| user.condominium_id == Some(id))
            || state.visits.values().any(|visit| visit.condominium_id == id);
        if referenced {
            return Err(StoreError::conflict(
                "condominium still has accounts or visits",
            ));
        }
        state.condominiums.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl VisitRepository for MemoryStore {
    async fn get_visit(&self, code: &VisitCode) -> Result<Visit, StoreError> {
        let state = self.state.lock().await;
        state
            .visits
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::not_found("visit", code.as_str()))
    }

    async fn list_visits_by_creator(&self, creator: UserId) -> Result<Vec<Visit>, StoreError> {
        let state = self.state.lock().await;
        let mut visits: Vec<_> = state
            .visits
            .values()
            .filter(|visit| visit.created_by == creator)
            .cloned()
            .collect();
        visits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.code.cmp(&b.code)));
        Ok(visits)
    }

    async fn list_visits_by_condominium(
        &self,
        condominium_id: CondominiumId,
    ) -> Result<Vec<Visit>, StoreError> {
        let state = self.state.lock().await;
        let mut visits: Vec<_> = state
            .visits
            .values()
            .filter(|visit| visit.condominium_id == condominium_id)
            .cloned()
            .collect();
        visits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.code.cmp(&b.code)));
        Ok(visits)
    }

    async fn create_visit(&self, visit: NewVisit) -> Result<Visit, StoreError> {
        visit.validate()?;
        let mut state = self.state.lock().await;
        if state.visits.contains_key(&visit.code) {
            return Err(StoreError::duplicate_visit_code());
        }
        if !state.condominiums.contains_key(&visit.condominium_id)
            || !state.users.contains_key(&visit.created_by)
        {
            return Err(StoreError::conflict(
                "visit references a missing condominium or user",
            ));
        }
        let created = visit.into_visit(self.now());
        state.visits.insert(created.code.clone(), created.clone());
        Ok(created)
    }

    async fn update_visit(
        &self,
        code: &VisitCode,
        mutator: Mutator<Visit>,
    ) -> Result<Visit, StoreError> {
        let mut state = self.state.lock().await;
        let current = state
            .visits
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::not_found("visit", code.as_str()))?;
        let mut next = mutator(current.clone()).map_err(StoreError::rejected)?;
        next.code = current.code.clone();
        next.condominium_id = current.condominium_id;
        next.created_by = current.created_by;
        next.created_at = current.created_at;
        next.validate_update(&current)?;
        next.updated_at = self.now();
        state.visits.insert(code.clone(), next.clone());
        Ok(next)
    }

    async fn delete_visit(&self, code: &VisitCode) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state
            .visits
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("visit", code.as_str()))
    }
}
