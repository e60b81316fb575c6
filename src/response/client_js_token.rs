use steamid_ng::SteamID;

/// A client logon token from `/chat/clientjstoken`. Can be used to log on to the Steam
/// network as this user.
#[derive(Debug, Clone)]
pub struct ClientJsToken {
    /// The SteamID of the logged-in account.
    pub steamid: SteamID,
    /// The account name.
    pub account_name: String,
    /// The logon token.
    pub token: String,
}
