mod dashboards;
mod edit_profile;
mod errors;
mod gate;
mod login;
mod manage_users;
mod passwords;
mod register;
pub mod users;

use serde::Serialize;

pub use dashboards::{admin_dashboard, client_dashboard};
pub use edit_profile::{edit_profile_endpoint, edit_profile_page};
pub use errors::AccountError;
pub use gate::{
    Area, Authenticated, CLIENT_DASHBOARD_PATH, ClientPage, CurrentUser, Gate, GateRejection,
    LOGIN_PATH, Role, STAFF_DASHBOARD_PATH, StaffOnly, StaffPage, gate,
};
pub use login::{login_endpoint, login_page, logout_endpoint};
pub use manage_users::users_list;
pub use register::{register_endpoint, register_page};

/// Describes a form the client should render for a GET on a form route.
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub form: &'static str,
    pub fields: &'static [&'static str],
}
