//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Tenants. Cannot be deleted while accounts or visits reference them.
    condominiums (id) {
        id -> Int8,
        /// 1–200 characters.
        name -> Varchar,
        /// 1–500 characters.
        address -> Varchar,
        created_at -> Timestamptz,
        created_by -> Nullable<Int8>,
        updated_at -> Timestamptz,
        updated_by -> Nullable<Int8>,
    }
}

diesel::table! {
    /// Accounts of every role. `email` is unique and stored lower-cased.
    users (id) {
        id -> Int8,
        condominium_id -> Nullable<Int8>,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// One of `superadmin`, `admin`, `user`, `guard`.
        role -> Varchar,
        enabled -> Bool,
        hidden -> Bool,
        created_at -> Timestamptz,
        created_by -> Nullable<Int8>,
        updated_at -> Timestamptz,
        updated_by -> Nullable<Int8>,
    }
}

diesel::table! {
    /// Visitor passes keyed by their opaque code.
    visits (id) {
        id -> Varchar,
        condominium_id -> Int8,
        created_by -> Int8,
        visitor_name -> Varchar,
        /// `0` means unlimited.
        max_uses -> Int4,
        uses -> Int4,
        valid_from -> Timestamptz,
        valid_to -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(users -> condominiums (condominium_id));
diesel::joinable!(visits -> condominiums (condominium_id));
diesel::joinable!(visits -> users (created_by));

diesel::allow_tables_to_appear_in_same_query!(condominiums, users, visits);
