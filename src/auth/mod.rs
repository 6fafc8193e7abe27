//! Bearer-token authentication against configured API secrets.

mod api_secret;
mod context;

pub use api_secret::match_api_secret_id;
pub use context::Auth;
