//! Session data and session ID generation.

use steamid_ng::SteamID;

/// Data for a logged-in session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The SteamID of the logged-in user.
    pub steamid: SteamID,
    /// The session ID.
    pub sessionid: String,
    /// The OAuth access token. Only present after a mobile login.
    pub oauth_token: Option<String>,
}

/// Generates a random sessionid.
pub fn generate_sessionid() -> String {
    // Should look like "37bf523a24034ec06c60ec61"
    (0..12)
        .map(|_| {
            let b = rand::random::<u8>();

            format!("{b:02x}")
        })
        .collect()
}
