//! The client for the Steam Community website.

mod builder;
mod login;

pub use builder::SteamCommunityBuilder;
pub use login::Credentials;

use crate::cookies::CookieJar;
use crate::encryption;
use crate::error::{Error, LoginChallenge, LoginError, ParameterError, Result};
use crate::helpers::{
    apply_login_headers,
    get_default_client,
    get_no_redirect_client,
    parses_response,
    COMMUNITY_HOSTNAME,
    HELP_HOSTNAME,
    STORE_HOSTNAME,
};
use crate::notifier::SessionExpiryNotifier;
use crate::profile_url::ProfileUrlResolver;
use crate::response::{ClientJsToken, LoginSession, Notifications};
use crate::session::{generate_sessionid, Session};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use lazy_regex::regex_is_match;
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use steamid_ng::SteamID;
use tokio::sync::mpsc;
use url::Url;

/// A client for the Steam Community website. Owns the session, the cookie jar shared
/// across the Steam domains and the clients used for requests.
///
/// One instance manages one logical session. Login calls mutate shared state (the
/// cookie jar and the pending CAPTCHA gid), so run at most one login at a time per
/// instance; for multiple accounts use separate instances, each with its own
/// [`CookieJar`].
#[derive(Debug, Clone)]
pub struct SteamCommunity {
    /// The client for making requests.
    client: ClientWithMiddleware,
    /// Client with redirects disabled, for `/my` probes.
    no_redirect_client: reqwest::Client,
    /// The cookies to make requests with. Since the requests are made with the provided
    /// client, the cookies should be the same as what the client uses.
    cookies: CookieJar,
    /// The session. `None` until a login or cookie import.
    session: Arc<RwLock<Option<Session>>>,
    /// The gid of a CAPTCHA challenge from the last failed login, reused on the next
    /// attempt when the caller does not pass one explicitly.
    captcha_gid: Arc<Mutex<Option<String>>>,
    /// Resolver for the logged-in user's profile URL.
    profile_url: Arc<ProfileUrlResolver>,
    /// Broadcasts session expiry detections.
    notifier: SessionExpiryNotifier,
    /// Base URL of the community site.
    community: Url,
    /// Base URL of the Steam Web API.
    api: Url,
}

impl Default for SteamCommunity {
    fn default() -> Self {
        Self::new()
    }
}

impl SteamCommunity {
    /// Creates a client with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Builder for constructing a [`SteamCommunity`].
    pub fn builder() -> SteamCommunityBuilder {
        SteamCommunityBuilder::new()
    }

    /// The current session, if logged in.
    pub fn session(&self) -> Option<Session> {
        self.session.read().unwrap().clone()
    }

    /// The SteamID of the logged-in user, if logged in.
    pub fn steamid(&self) -> Option<SteamID> {
        self.session.read().unwrap().as_ref().map(|session| session.steamid)
    }

    /// The shared cookie jar.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// The client used for requests. Other components can issue authenticated requests
    /// through this; it attaches the session cookies automatically.
    pub fn client(&self) -> &ClientWithMiddleware {
        &self.client
    }

    /// Registers for session expiry events. An event is sent each time a call detects
    /// that the session has silently expired. Dropping the receiver unregisters it.
    pub fn subscribe_session_expiry(&self) -> mpsc::UnboundedReceiver<Arc<Error>> {
        self.notifier.subscribe()
    }

    /// Imports a previously persisted cookie set. If the cookies embed an identity, the
    /// session is adopted from them.
    pub fn set_cookies(&self, cookies: &[String]) {
        let steamid = self.cookies.import(cookies);
        let sessionid = cookies.iter().find_map(|cookie| {
            cookie.strip_prefix("sessionid=").map(|value| value.to_string())
        });

        if let Some(steamid) = steamid {
            let sessionid = sessionid.unwrap_or_else(|| self.get_session_id(None));
            let oauth_token = self.session.read().unwrap()
                .as_ref()
                .and_then(|session| session.oauth_token.clone());

            *self.session.write().unwrap() = Some(Session {
                steamid,
                sessionid,
                oauth_token,
            });
        }
    }

    /// The session ID for the given host (the community site when `None`). Generates
    /// and installs one when no `sessionid` cookie exists yet.
    pub fn get_session_id(&self, host: Option<&Url>) -> String {
        let url = host.unwrap_or(&self.community);

        if let Some(cookie_string) = self.cookies.cookie_string(url) {
            for cookie in cookie_string.split("; ") {
                if let Some(value) = cookie.strip_prefix("sessionid=") {
                    return value.to_string();
                }
            }
        }

        let sessionid = generate_sessionid();

        self.cookies.set_cookie(&format!("sessionid={sessionid}"), false);
        sessionid
    }

    /// Logs in to the Steam Community website.
    ///
    /// Steam Guard and CAPTCHA challenges come back as
    /// [`LoginError::Challenge`] — fill in the requested field and call again.
    pub async fn login(&self, credentials: &Credentials) -> std::result::Result<LoginSession, LoginError> {
        if credentials.account_name.is_empty() || credentials.password.is_empty() {
            return Err(ParameterError::MissingCredentials.into());
        }

        if let Some(token) = &credentials.machine_auth_token {
            let (steamid, value) = parse_machine_auth_token(token)?;

            self.cookies.set_cookie(&format!("steamMachineAuth{steamid}={value}"), true);
        }

        if credentials.mobile {
            // these tell the server to respond with the mobile (OAuth) response shape
            self.cookies.set_cookie("mobileClientVersion=0 (2.1.3)", false);
            self.cookies.set_cookie("mobileClient=android", false);
        }

        match self.try_login(credentials).await {
            Err(error @ LoginError::Error(_)) if credentials.mobile => {
                // don't pollute a following non-mobile attempt
                self.remove_mobile_cookies();
                Err(error)
            },
            result => result,
        }
    }

    async fn try_login(&self, credentials: &Credentials) -> std::result::Result<LoginSession, LoginError> {
        let mobile = credentials.mobile;
        let rsa_key = encryption::fetch_rsa_key(
            &self.client,
            &self.community,
            &credentials.account_name,
            mobile,
        ).await?;
        let password = encryption::encrypt_password(
            &credentials.password,
            &rsa_key.modulus,
            &rsa_key.exponent,
        )?;
        let remembered_gid = self.captcha_gid.lock().unwrap().clone();
        let captcha_gid = credentials.captcha_gid.clone()
            .or(remembered_gid)
            .unwrap_or_else(|| String::from(login::NO_CAPTCHA_GID));
        let donotcache = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis() as u64)
            .unwrap_or_default();
        let form = login::LoginRequest {
            captcha_gid: &captcha_gid,
            captcha_text: credentials.captcha_text.as_deref().unwrap_or_default(),
            emailauth: credentials.email_auth_code.as_deref().unwrap_or_default(),
            emailsteamid: "",
            password: &password,
            remember_login: "true",
            rsatimestamp: &rsa_key.timestamp,
            twofactorcode: credentials.two_factor_code.as_deref().unwrap_or_default(),
            username: &credentials.account_name,
            donotcache,
            oauth_client_id: mobile.then_some(login::MOBILE_OAUTH_CLIENT_ID),
            oauth_scope: mobile.then_some(login::MOBILE_OAUTH_SCOPE),
        };
        let uri = format!("{}login/dologin/", self.community);
        let request = apply_login_headers(
            self.client.post(&uri).form(&form),
            &self.community,
            mobile,
        );
        let response = request.send().await?;
        let set_cookies = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .collect::<Vec<_>>();
        let body: login::LoginResponse = parses_response(response).await?;

        if let Err(error) = login::classify(&body, mobile, &self.community) {
            // remember the gid so the next attempt answers this challenge
            if let LoginError::Challenge(LoginChallenge::Captcha { gid, .. }) = &error {
                *self.captcha_gid.lock().unwrap() = Some(gid.clone());
            }

            return Err(error);
        }

        // replicate the returned cookies across all Steam domains
        for set_cookie in &set_cookies {
            self.cookies.set_cookie(
                login::cookie_pair(set_cookie),
                login::is_secure_cookie(set_cookie),
            );
        }

        let sessionid = generate_sessionid();

        self.cookies.set_cookie(&format!("sessionid={sessionid}"), false);

        let (steamid, oauth_token) = if mobile {
            // classify checked the payload is present
            let oauth_json = body.oauth.as_deref().unwrap_or_default();
            let oauth: login::OAuthData = serde_json::from_str(oauth_json)?;

            (oauth.steamid, Some(oauth.oauth_token))
        } else {
            let steamid = login::steamid_from_set_cookies(&set_cookies)
                .ok_or(Error::MalformedResponse(login::MALFORMED_RESPONSE))?;

            (steamid, None)
        };
        let machine_auth_token = login::machine_auth_from_set_cookies(&set_cookies, steamid);

        *self.captcha_gid.lock().unwrap() = None;
        *self.session.write().unwrap() = Some(Session {
            steamid: SteamID::from(steamid),
            sessionid: sessionid.clone(),
            oauth_token: oauth_token.clone(),
        });
        self.profile_url.invalidate();

        Ok(LoginSession {
            steamid: SteamID::from(steamid),
            sessionid,
            cookies: self.cookies.cookies(&self.community),
            machine_auth_token,
            oauth_token,
        })
    }

    /// Logs in using a stored machine auth token and OAuth access token from a previous
    /// mobile login, without going through the credential flow again.
    pub async fn oauth_login(
        &self,
        machine_auth_token: &str,
        oauth_token: &str,
    ) -> std::result::Result<LoginSession, LoginError> {
        #[derive(Serialize)]
        struct GetWGTokenRequest<'a> {
            access_token: &'a str,
        }

        #[derive(Deserialize)]
        struct Tokens {
            #[serde(default)]
            token: Option<String>,
            #[serde(default)]
            token_secure: Option<String>,
        }

        #[derive(Deserialize)]
        struct GetWGTokenResponse {
            #[serde(default)]
            response: Option<Tokens>,
        }

        let (steamid, machine_value) = parse_machine_auth_token(machine_auth_token)?;
        let uri = format!("{}IMobileAuthService/GetWGToken/v1/", self.api);
        let response = self.client.post(&uri)
            .form(&GetWGTokenRequest { access_token: oauth_token })
            .send()
            .await?;
        let body: GetWGTokenResponse = parses_response(response).await?;
        let tokens = body.response
            .ok_or(Error::MalformedResponse(login::MALFORMED_RESPONSE))?;
        let (token, token_secure) = match (tokens.token, tokens.token_secure) {
            (Some(token), Some(token_secure)) => (token, token_secure),
            _ => return Err(Error::MalformedResponse(login::MALFORMED_RESPONSE).into()),
        };
        let sessionid = generate_sessionid();

        self.cookies.set_cookie(&format!("steamMachineAuth{steamid}={machine_value}"), true);
        self.cookies.set_cookie(&format!("steamLogin={steamid}||{token}"), false);
        self.cookies.set_cookie(&format!("steamLoginSecure={steamid}||{token_secure}"), true);
        self.cookies.set_cookie(&format!("sessionid={sessionid}"), false);

        *self.session.write().unwrap() = Some(Session {
            steamid: SteamID::from(steamid),
            sessionid: sessionid.clone(),
            oauth_token: Some(oauth_token.to_string()),
        });
        self.profile_url.invalidate();

        Ok(LoginSession {
            steamid: SteamID::from(steamid),
            sessionid,
            cookies: self.cookies.cookies(&self.community),
            machine_auth_token: Some(machine_auth_token.to_string()),
            oauth_token: Some(oauth_token.to_string()),
        })
    }

    /// Whether the session cookies are still good, checked with one request. The `/my`
    /// endpoint redirects to the login page for dead sessions.
    pub async fn logged_in(&self) -> Result<bool> {
        let uri = format!("{}my", self.community);
        let response = self.no_redirect_client.get(&uri)
            .send()
            .await?;
        let status = response.status();

        if !status.is_redirection() {
            return Err(Error::Http(status));
        }

        let location = response.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        Ok(!regex_is_match!("/login", location))
    }

    /// The logged-in user's own profile path, e.g. `/id/myvanityurl`. Cached for a
    /// minute.
    pub async fn get_profile_url(&self) -> Result<String> {
        self.profile_url.resolve().await
    }

    /// Drops the cached profile URL.
    pub fn invalidate_profile_url(&self) {
        self.profile_url.invalidate();
    }

    /// Gets a client logon token. Detects session expiry.
    pub async fn get_client_js_token(&self) -> Result<ClientJsToken> {
        #[derive(Deserialize)]
        struct ClientJsTokenResponse {
            #[serde(default)]
            logged_in: bool,
            #[serde(default)]
            steamid: Option<String>,
            #[serde(default)]
            account_name: Option<String>,
            #[serde(default)]
            token: Option<String>,
        }

        let uri = format!("{}chat/clientjstoken", self.community);
        let response = self.client.get(&uri)
            .send()
            .await?;
        let body: ClientJsTokenResponse = parses_response(response).await
            .map_err(|error| self.check_expired(error))?;

        if !body.logged_in {
            return Err(self.session_expired());
        }

        match (body.steamid, body.account_name, body.token) {
            (Some(steamid), Some(account_name), Some(token)) => {
                let steamid = steamid.parse::<u64>()
                    .map_err(|_error| Error::MalformedResponse(login::MALFORMED_RESPONSE))?;

                Ok(ClientJsToken {
                    steamid: SteamID::from(steamid),
                    account_name,
                    token,
                })
            },
            _ => Err(Error::MalformedResponse(login::MALFORMED_RESPONSE)),
        }
    }

    /// Gets the unread notification counts. Detects session expiry.
    pub async fn get_notification_counts(&self) -> Result<Notifications> {
        #[derive(Deserialize)]
        struct GetNotificationCountsResponse {
            #[serde(default)]
            notifications: Option<HashMap<String, u32>>,
        }

        let uri = format!("{}actions/GetNotificationCounts", self.community);
        let response = self.client.get(&uri)
            .send()
            .await?;
        let body: GetNotificationCountsResponse = parses_response(response).await
            .map_err(|error| self.check_expired(error))?;

        match body.notifications {
            Some(counts) => Ok(Notifications::from_counts(counts)),
            // logged-out responses have no notifications object
            None => Err(self.session_expired()),
        }
    }

    /// Emits one expiry event and produces the error for the failed call.
    fn session_expired(&self) -> Error {
        self.notifier.notify(Error::NotLoggedIn);
        Error::NotLoggedIn
    }

    /// Routes a not-logged-in detection through the notifier.
    fn check_expired(&self, error: Error) -> Error {
        match error {
            Error::NotLoggedIn => self.session_expired(),
            other => other,
        }
    }

    fn remove_mobile_cookies(&self) {
        self.cookies.remove_cookie("mobileClientVersion");
        self.cookies.remove_cookie("mobileClient");
    }
}

fn parse_machine_auth_token(token: &str) -> std::result::Result<(u64, &str), ParameterError> {
    let (steamid, value) = token.split_once("||")
        .ok_or(ParameterError::InvalidMachineAuthToken)?;
    let steamid = steamid.parse::<u64>()
        .map_err(|_error| ParameterError::InvalidMachineAuthToken)?;

    Ok((steamid, value))
}

impl From<SteamCommunityBuilder> for SteamCommunity {
    fn from(builder: SteamCommunityBuilder) -> Self {
        let community = builder.community;
        let api = builder.api;
        let cookies = builder.cookies.unwrap_or_else(|| {
            let authority = authority(&community);

            CookieJar::with_hosts(&[authority.as_str(), STORE_HOSTNAME, HELP_HOSTNAME])
        });
        let client = builder.client.unwrap_or_else(|| get_default_client(
            cookies.inner(),
            builder.user_agent,
        ));
        let no_redirect_client = get_no_redirect_client(cookies.inner(), builder.user_agent);

        cookies.set_cookie("Steam_Language=english", false);
        cookies.set_cookie("timezoneOffset=0,0", false);

        let profile_url = Arc::new(ProfileUrlResolver::new(
            no_redirect_client.clone(),
            community.clone(),
        ));

        Self {
            client,
            no_redirect_client,
            cookies,
            session: Arc::new(RwLock::new(None)),
            captcha_gid: Arc::new(Mutex::new(None)),
            profile_url,
            notifier: SessionExpiryNotifier::new(),
            community,
            api,
        }
    }
}

fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or(COMMUNITY_HOSTNAME);

    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::RsaPrivateKey;
    use rsa::traits::PublicKeyParts;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header as has_header, headers as has_headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn community_for(server: &MockServer) -> SteamCommunity {
        SteamCommunity::builder()
            .community(server.uri().parse().unwrap())
            .api(server.uri().parse().unwrap())
            .build()
    }

    fn credentials(mobile: bool) -> Credentials {
        let mut credentials = Credentials::new(
            String::from("accountname"),
            String::from("hunter2"),
        );

        credentials.mobile = mobile;
        credentials
    }

    async fn mount_rsa_key(server: &MockServer) {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 512).unwrap();

        Mock::given(method("POST"))
            .and(path("/login/getrsakey/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "publickey_mod": key.n().to_str_radix(16),
                "publickey_exp": key.e().to_str_radix(16),
                "timestamp": "190577250000",
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn empty_credentials_fail_fast() {
        let community = SteamCommunity::new();
        let error = community.login(&Credentials::new(String::new(), String::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            LoginError::Error(Error::Parameter(ParameterError::MissingCredentials))
        ));
    }

    #[tokio::test]
    async fn web_login_derives_identity_from_steam_login_cookie() {
        let server = MockServer::start().await;

        mount_rsa_key(&server).await;
        Mock::given(method("POST"))
            .and(path("/login/dologin/"))
            .respond_with(ResponseTemplate::new(200)
                .append_header("Set-Cookie", "steamLogin=76561198000000000%7C%7Ctoken; path=/")
                .append_header("Set-Cookie", "steamMachineAuth76561198000000000=deadbeef; path=/; secure")
                .set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let community = community_for(&server);
        let session = community.login(&credentials(false)).await.unwrap();

        assert_eq!(u64::from(session.steamid), 76561198000000000);
        assert_eq!(session.oauth_token, None);
        assert_eq!(
            session.machine_auth_token.as_deref(),
            Some("76561198000000000||deadbeef")
        );
        assert_eq!(session.sessionid.len(), 24);
        assert!(session.cookies.iter().any(|cookie| cookie.starts_with("sessionid=")));
        assert_eq!(community.steamid(), Some(SteamID::from(76561198000000000_u64)));
    }

    #[tokio::test]
    async fn mobile_login_takes_identity_and_token_from_oauth_payload() {
        let server = MockServer::start().await;

        mount_rsa_key(&server).await;

        let oauth = json!({
            "steamid": "76561198000000000",
            "oauth_token": "oauthtok",
        }).to_string();

        Mock::given(method("POST"))
            .and(path("/login/dologin/"))
            .and(body_string_contains("oauth_client_id=DE45CD61"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "oauth": oauth })))
            .mount(&server)
            .await;

        let community = community_for(&server);
        let session = community.login(&credentials(true)).await.unwrap();

        assert_eq!(u64::from(session.steamid), 76561198000000000);
        assert_eq!(session.oauth_token.as_deref(), Some("oauthtok"));
        assert_eq!(
            community.session().unwrap().oauth_token.as_deref(),
            Some("oauthtok")
        );
    }

    #[tokio::test]
    async fn rsa_key_fetch_carries_the_mobile_headers() {
        let server = MockServer::start().await;
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 512).unwrap();

        Mock::given(method("POST"))
            .and(path("/login/getrsakey/"))
            .and(has_header(
                "X-Requested-With",
                "com.valvesoftware.android.steam.community",
            ))
            // wiremock splits received header values on commas, so the UA string
            // (which contains "KHTML, like Gecko") must be matched as that list
            .and(has_headers(
                "User-Agent",
                crate::helpers::MOBILE_USER_AGENT_STRING
                    .split(',')
                    .map(str::trim)
                    .collect::<Vec<_>>(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "publickey_mod": key.n().to_str_radix(16),
                "publickey_exp": key.e().to_str_radix(16),
                "timestamp": "190577250000",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let oauth = json!({
            "steamid": "76561198000000000",
            "oauth_token": "oauthtok",
        }).to_string();

        Mock::given(method("POST"))
            .and(path("/login/dologin/"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "oauth": oauth })))
            .mount(&server)
            .await;

        let community = community_for(&server);

        community.login(&credentials(true)).await.unwrap();
    }

    #[tokio::test]
    async fn mobile_success_without_oauth_is_malformed_and_cleans_up() {
        let server = MockServer::start().await;

        mount_rsa_key(&server).await;
        Mock::given(method("POST"))
            .and(path("/login/dologin/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let community = community_for(&server);
        let error = community.login(&credentials(true)).await.unwrap_err();

        assert!(matches!(
            error,
            LoginError::Error(Error::MalformedResponse(message)) if message == "Malformed response"
        ));

        let cookie_string = community.cookies()
            .cookie_string(&server.uri().parse().unwrap())
            .unwrap_or_default();

        assert!(!cookie_string.contains("mobileClient"));
    }

    #[tokio::test]
    async fn email_guard_challenge_carries_the_domain() {
        let server = MockServer::start().await;

        mount_rsa_key(&server).await;
        Mock::given(method("POST"))
            .and(path("/login/dologin/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "emailauth_needed": true,
                "emaildomain": "gmail.com",
            })))
            .mount(&server)
            .await;

        let community = community_for(&server);
        let error = community.login(&credentials(true)).await.unwrap_err();

        assert!(matches!(
            error,
            LoginError::Challenge(LoginChallenge::EmailGuard(domain)) if domain == "gmail.com"
        ));
    }

    #[tokio::test]
    async fn captcha_gid_is_remembered_for_the_next_attempt() {
        let server = MockServer::start().await;

        mount_rsa_key(&server).await;
        Mock::given(method("POST"))
            .and(path("/login/dologin/"))
            .and(body_string_contains("captcha_gid=-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "captcha_needed": true,
                "captcha_gid": "3122988244471440000",
                "message": "Please verify your humanity",
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login/dologin/"))
            .and(body_string_contains("captcha_gid=3122988244471440000"))
            .respond_with(ResponseTemplate::new(200)
                .append_header("Set-Cookie", "steamLogin=76561198000000000%7C%7Ctoken; path=/")
                .set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let community = community_for(&server);
        let error = community.login(&credentials(false)).await.unwrap_err();

        assert!(matches!(
            error,
            LoginError::Challenge(LoginChallenge::Captcha { ref gid, ref url })
                if gid == "3122988244471440000" && url.contains("gid=3122988244471440000")
        ));

        let mut second = credentials(false);

        second.captcha_text = Some(String::from("ABC123"));
        community.login(&second).await.unwrap();
    }

    #[tokio::test]
    async fn oauth_login_installs_web_session_cookies() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/IMobileAuthService/GetWGToken/v1/"))
            .and(body_string_contains("access_token=oauthtok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": { "token": "webtok", "token_secure": "webtoksecure" },
            })))
            .mount(&server)
            .await;

        let community = community_for(&server);
        let session = community.oauth_login("76561198000000000||machine", "oauthtok")
            .await
            .unwrap();

        assert_eq!(u64::from(session.steamid), 76561198000000000);
        assert!(session.cookies.iter().any(|cookie| {
            cookie == "steamLogin=76561198000000000||webtok"
        }));
        assert_eq!(session.oauth_token.as_deref(), Some("oauthtok"));
    }

    #[tokio::test]
    async fn missing_notifications_object_emits_session_expired() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/actions/GetNotificationCounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let community = community_for(&server);
        let mut rx = community.subscribe_session_expiry();
        let error = community.get_notification_counts().await.unwrap_err();

        assert!(matches!(error, Error::NotLoggedIn));
        assert!(matches!(*rx.try_recv().unwrap(), Error::NotLoggedIn));
        // exactly one event per detection
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn notification_counts_are_mapped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/actions/GetNotificationCounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "notifications": { "1": 2, "4": 7 },
            })))
            .mount(&server)
            .await;

        let community = community_for(&server);
        let notifications = community.get_notification_counts().await.unwrap();

        assert_eq!(notifications.trade_offers, 2);
        assert_eq!(notifications.comments, 7);
    }

    #[tokio::test]
    async fn logged_out_client_js_token_emits_session_expired() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chat/clientjstoken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "logged_in": false })))
            .mount(&server)
            .await;

        let community = community_for(&server);
        let mut rx = community.subscribe_session_expiry();
        let error = community.get_client_js_token().await.unwrap_err();

        assert!(matches!(error, Error::NotLoggedIn));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn logged_in_probe_reads_the_redirect() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/my"))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "Location",
                "https://steamcommunity.com/login/home/?goto=%2Fmy",
            ))
            .mount(&server)
            .await;

        let community = community_for(&server);

        assert!(!community.logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn get_session_id_generates_and_persists() {
        let community = SteamCommunity::new();
        let sessionid = community.get_session_id(None);

        assert_eq!(sessionid.len(), 24);
        assert_eq!(community.get_session_id(None), sessionid);
    }

    #[tokio::test]
    async fn set_cookies_adopts_identity() {
        let community = SteamCommunity::new();

        community.set_cookies(&[
            String::from("sessionid=08861c2af91df60fe44a9dcf"),
            String::from("steamLoginSecure=76561198000000000%7C%7Ctok"),
        ]);

        let session = community.session().unwrap();

        assert_eq!(u64::from(session.steamid), 76561198000000000);
        assert_eq!(session.sessionid, "08861c2af91df60fe44a9dcf");
    }
}
