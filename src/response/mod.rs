//! Response types returned to callers.

mod client_js_token;
mod login_session;
mod notifications;

pub use client_js_token::ClientJsToken;
pub use login_session::LoginSession;
pub use notifications::{NotificationType, Notifications};
