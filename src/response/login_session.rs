use steamid_ng::SteamID;

/// The state produced by a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// The SteamID of the logged-in account.
    pub steamid: SteamID,
    /// The session ID installed as the `sessionid` cookie.
    pub sessionid: String,
    /// The full set of `name=value` cookies for the community domain. Persist these to
    /// restore the session later without logging in again.
    pub cookies: Vec<String>,
    /// An opaque `"<steamid>||<token>"` machine auth token, when Steam issued one.
    /// Supplying it on a later login skips the email Steam Guard challenge on this
    /// machine.
    pub machine_auth_token: Option<String>,
    /// The OAuth access token. Only produced by mobile logins.
    pub oauth_token: Option<String>,
}
