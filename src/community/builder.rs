use super::SteamCommunity;
use crate::cookies::CookieJar;
use crate::helpers::USER_AGENT_STRING;
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

/// Builder for constructing a [`SteamCommunity`].
#[derive(Debug, Clone)]
pub struct SteamCommunityBuilder {
    /// User agent for requests.
    pub(crate) user_agent: &'static str,
    /// Request cookies. Useful if instantiating multiple clients to share a session.
    pub(crate) cookies: Option<CookieJar>,
    /// Client to use for requests. Remember to also include the cookies connected to
    /// this client.
    pub(crate) client: Option<ClientWithMiddleware>,
    /// Base URL of the community site.
    pub(crate) community: Url,
    /// Base URL of the Steam Web API.
    pub(crate) api: Url,
}

impl Default for SteamCommunityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SteamCommunityBuilder {
    /// Creates a new [`SteamCommunityBuilder`].
    pub fn new() -> Self {
        Self {
            user_agent: USER_AGENT_STRING,
            cookies: None,
            client: None,
            // hardcoded URLs parse
            community: "https://steamcommunity.com".parse().unwrap(),
            api: "https://api.steampowered.com".parse().unwrap(),
        }
    }

    /// The user agent for requests.
    pub fn user_agent(mut self, user_agent: &'static str) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// The cookie jar to use for requests.
    pub fn cookies(mut self, cookies: CookieJar) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// The client to use for requests. Must share the cookie jar's store.
    pub fn client(mut self, client: ClientWithMiddleware) -> Self {
        self.client = Some(client);
        self
    }

    /// Points community requests at a different base URL.
    pub fn community(mut self, community: Url) -> Self {
        self.community = community;
        self
    }

    /// Points Web API requests at a different base URL.
    pub fn api(mut self, api: Url) -> Self {
        self.api = api;
        self
    }

    /// Builds the [`SteamCommunity`].
    pub fn build(self) -> SteamCommunity {
        self.into()
    }
}
