//! Shared helpers for building clients and checking responses.

use crate::error::Error;
use std::sync::Arc;
use reqwest::cookie::CookieStore;
use reqwest::header;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use serde::de::DeserializeOwned;
use lazy_regex::{regex_captures, regex_is_match};

/// Hostname of the Steam Community website.
pub const COMMUNITY_HOSTNAME: &str = "steamcommunity.com";
/// Hostname of the Steam store. Cookies are shared with the community site.
pub const STORE_HOSTNAME: &str = "store.steampowered.com";
/// Hostname of the Steam help site. Cookies are shared with the community site.
pub const HELP_HOSTNAME: &str = "help.steampowered.com";
/// Hostname of the Steam Web API.
pub const API_HOSTNAME: &str = "api.steampowered.com";

/// Default user agent for requests.
pub const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36";
/// User agent sent when mimicking the mobile app during login.
pub const MOBILE_USER_AGENT_STRING: &str = "Mozilla/5.0 (Linux; U; Android 4.1.1; en-us; Google Nexus 4 - 4.1.1 - API 16 - 768x1280 Build/JRO03S) AppleWebKit/534.30 (KHTML, like Gecko) Version/4.0 Mobile Safari/534.30";

/// Builds the default client with retry middleware. Cookies are taken from the given
/// store so that all clients built over the same store share a session.
pub fn get_default_client<T>(
    cookie_store: Arc<T>,
    user_agent_string: &'static str,
) -> ClientWithMiddleware
where
    T: CookieStore + 'static,
{
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
    let mut headers = header::HeaderMap::new();

    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(user_agent_string));

    let client = reqwest::ClientBuilder::new()
        .cookie_provider(cookie_store)
        .default_headers(headers)
        .build()
        .unwrap();

    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Applies the headers for the login handshake requests. Both the RSA key fetch and
/// the credential submission carry the same set. Mobile logins identify as the Steam
/// Android app; web logins carry a plain Referer.
pub fn apply_login_headers(
    request: reqwest_middleware::RequestBuilder,
    community: &url::Url,
    mobile: bool,
) -> reqwest_middleware::RequestBuilder {
    if mobile {
        request
            .header("X-Requested-With", "com.valvesoftware.android.steam.community")
            .header(header::REFERER, format!("{community}mobilelogin"))
            .header(header::USER_AGENT, MOBILE_USER_AGENT_STRING)
            .header(header::ACCEPT, "text/javascript, text/html, application/xml, text/xml, */*")
    } else {
        request.header(header::REFERER, community.as_str())
    }
}

/// Builds a client which does not follow redirects. Used for probes where the
/// `Location` header is the interesting part of the response.
pub fn get_no_redirect_client<T>(
    cookie_store: Arc<T>,
    user_agent_string: &'static str,
) -> reqwest::Client
where
    T: CookieStore + 'static,
{
    let mut headers = header::HeaderMap::new();

    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(user_agent_string));

    reqwest::ClientBuilder::new()
        .cookie_provider(cookie_store)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn is_login(location_option: Option<&header::HeaderValue>) -> bool {
    match location_option {
        Some(location) => {
            if let Ok(location_str) = location.to_str() {
                regex_is_match!("/login", location_str)
            } else {
                false
            }
        },
        None => false,
    }
}

/// Checks the status of a response, returning its body bytes when it is usable.
pub async fn check_response(response: reqwest::Response) -> Result<bytes::Bytes, Error> {
    let status = response.status();

    match status.as_u16() {
        300..=399 if is_login(response.headers().get("location")) => {
            Err(Error::NotLoggedIn)
        },
        400..=599 => {
            Err(Error::Http(status))
        },
        _ => {
            Ok(response.bytes().await?)
        }
    }
}

/// Parses a JSON response body into `D`.
pub async fn parses_response<D>(response: reqwest::Response) -> Result<D, Error>
where
    D: DeserializeOwned,
{
    let body = check_response(response).await?;

    match serde_json::from_slice::<D>(&body) {
        Ok(body) => Ok(body),
        Err(parse_error) => {
            // unexpected response
            let html = String::from_utf8_lossy(&body);

            if regex_is_match!(r#"<h1>Sorry!</h1>"#, &html) {
                // Steam's HTML error page carries the message in an h3
                if let Some((_, message)) = regex_captures!("<h3>(.+)</h3>", &html) {
                    Err(Error::Response(message.into()))
                } else {
                    Err(Error::Response("Unexpected error".into()))
                }
            } else if regex_is_match!(r#"<h1>Sign In</h1>"#, &html) && regex_is_match!(r#"g_steamID = false;"#, &html) {
                Err(Error::NotLoggedIn)
            } else {
                log::debug!("Unexpected response body: {html}");
                Err(Error::Parse(parse_error))
            }
        },
    }
}
