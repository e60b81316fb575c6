//! Logs in to and manages a session with the Steam Community website.
//!
//! The heart of the crate is [`SteamCommunity`]: it performs the RSA-encrypted login
//! handshake, keeps a cookie jar shared across the Steam domains, resolves the
//! logged-in user's profile URL and broadcasts session expiry so owners can
//! re-authenticate. Components built on top (market, groups, trading) issue their
//! requests through [`SteamCommunity::client`] and listen on
//! [`SteamCommunity::subscribe_session_expiry`].

mod community;
mod cookies;
mod encryption;
mod error;
mod notifier;
mod profile_url;
mod session;

pub mod helpers;
pub mod response;
pub mod serialize;

pub use community::{Credentials, SteamCommunity, SteamCommunityBuilder};
pub use cookies::CookieJar;
pub use encryption::{encrypt_password, fetch_rsa_key, RsaKey};
pub use error::{Error, LoginChallenge, LoginError, ParameterError, Result};
pub use notifier::SessionExpiryNotifier;
pub use profile_url::ProfileUrlResolver;
pub use session::{generate_sessionid, Session};
pub use steamid_ng::SteamID;
