//! HTTP inbound adapter exposing the JSON API.

pub mod accounts;
pub mod auth;
pub mod condos;
pub mod error;
pub mod health;
pub mod identity;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod visits;

use actix_web::web;

pub use error::ApiResult;

/// Register every API route and the JSON body configuration.
///
/// Health probes are registered separately because they need no session.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use entry_watch::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(condos::list_condos)
        .service(condos::create_condo)
        .service(condos::get_condo)
        .service(condos::update_condo)
        .service(condos::delete_condo)
        .service(condos::own_condo)
        .service(accounts::list_admins)
        .service(accounts::create_admin)
        .service(accounts::get_admin)
        .service(accounts::update_admin)
        .service(accounts::delete_admin)
        .service(accounts::list_members)
        .service(accounts::create_member)
        .service(accounts::get_member)
        .service(accounts::update_member)
        .service(accounts::delete_member)
        .service(visits::list_my_visits)
        .service(visits::issue_visit)
        .service(visits::revoke_visit)
        .service(visits::inspect_visit)
        .service(visits::record_entry);
}
