//! Builders and seeders for accounts, condominiums, and visits.

use std::sync::OnceLock;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::ports::Store;
use crate::domain::{
    Account, Condominium, CondominiumId, Identity, NewAccount, NewCondominium, NewVisit, Role,
    UserId, Visit, VisitCode, hash_password,
};

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "correct-horse";

/// Argon2 hash of [`SEED_PASSWORD`], computed once per process.
pub fn seed_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| match hash_password(SEED_PASSWORD) {
        Ok(hash) => hash,
        Err(err) => panic!("hash seed password: {err}"),
    })
    .clone()
}

/// An enabled identity.
#[must_use]
pub fn identity(role: Role, id: i64, condominium_id: Option<i64>) -> Identity {
    Identity {
        id: UserId::new(id),
        condominium_id: condominium_id.map(CondominiumId::new),
        role,
        enabled: true,
    }
}

/// An enabled superadmin identity.
#[must_use]
pub fn superadmin(id: i64) -> Identity {
    identity(Role::Superadmin, id, None)
}

#[must_use]
pub fn condominium_draft(name: &str) -> NewCondominium {
    NewCondominium {
        name: name.to_owned(),
        address: format!("{name} 100, Springfield"),
        created_by: None,
    }
}

#[must_use]
pub fn account_draft(role: Role, condominium_id: Option<CondominiumId>, email: &str) -> NewAccount {
    NewAccount {
        condominium_id,
        first_name: "Test".to_owned(),
        last_name: role.as_str().to_owned(),
        email: email.to_owned(),
        phone: None,
        password_hash: seed_password_hash(),
        role,
        enabled: true,
        hidden: false,
        created_by: None,
    }
}

/// A visit valid for one day from `from`.
#[must_use]
pub fn visit_draft(
    code: &str,
    condominium_id: CondominiumId,
    created_by: UserId,
    max_uses: i32,
    from: DateTime<Utc>,
) -> NewVisit {
    NewVisit {
        code: VisitCode::from_stored(code.to_owned()),
        condominium_id,
        created_by,
        visitor_name: "Carla Gómez".to_owned(),
        max_uses,
        valid_from: from,
        valid_to: from + TimeDelta::days(1),
    }
}

/// Insert a condominium, panicking on failure.
pub async fn seed_condominium<S: Store + ?Sized>(store: &S, name: &str) -> Condominium {
    match store.create_condominium(condominium_draft(name)).await {
        Ok(condo) => condo,
        Err(err) => panic!("seed condominium {name}: {err}"),
    }
}

/// Insert an account, panicking on failure.
pub async fn seed_account<S: Store + ?Sized>(
    store: &S,
    role: Role,
    condominium_id: Option<CondominiumId>,
    email: &str,
) -> Account {
    match store
        .create_user(account_draft(role, condominium_id, email))
        .await
    {
        Ok(account) => account,
        Err(err) => panic!("seed account {email}: {err}"),
    }
}

/// Insert a visit, panicking on failure.
pub async fn seed_visit<S: Store + ?Sized>(store: &S, draft: NewVisit) -> Visit {
    let code = draft.code.clone();
    match store.create_visit(draft).await {
        Ok(visit) => visit,
        Err(err) => panic!("seed visit {code}: {err}"),
    }
}
