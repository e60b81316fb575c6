//! Wire shapes and outcome classification for the login handshake.

use crate::error::{Error, LoginChallenge, LoginError};
use crate::serialize;
use serde::{Deserialize, Serialize};
use url::Url;

/// OAuth client ID registered to the Steam mobile app.
pub(crate) const MOBILE_OAUTH_CLIENT_ID: &str = "DE45CD61";
/// OAuth scope requested during mobile login.
pub(crate) const MOBILE_OAUTH_SCOPE: &str = "read_profile write_profile read_client write_client";
/// Sentinel gid sent when no CAPTCHA challenge is pending.
pub(crate) const NO_CAPTCHA_GID: &str = "-1";

pub(crate) const MALFORMED_RESPONSE: &str = "Malformed response";

/// Credentials for a login attempt.
///
/// On a Steam Guard or CAPTCHA challenge, fill in the additional field and call login
/// again with the same instance state.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// The account name.
    pub account_name: String,
    /// The account password.
    pub password: String,
    /// The solved CAPTCHA text, if the previous attempt returned a CAPTCHA challenge.
    pub captcha_text: Option<String>,
    /// The gid of the CAPTCHA being answered. When not set, the gid remembered from
    /// the previous challenge is used.
    pub captcha_gid: Option<String>,
    /// The Steam Guard code sent to the account's email address.
    pub email_auth_code: Option<String>,
    /// The Steam Guard code from the mobile authenticator.
    pub two_factor_code: Option<String>,
    /// A `"<steamid>||<token>"` machine auth token from a previous login. Pre-empts
    /// the email Steam Guard challenge on trusted machines.
    pub machine_auth_token: Option<String>,
    /// Whether to mimic the mobile app during login. Required to receive an OAuth
    /// token. Defaults to `true`.
    pub mobile: bool,
}

impl Credentials {
    pub fn new(account_name: String, password: String) -> Self {
        Self {
            account_name,
            password,
            captcha_text: None,
            captcha_gid: None,
            email_auth_code: None,
            two_factor_code: None,
            machine_auth_token: None,
            mobile: true,
        }
    }
}

/// Form body for `dologin`. Field names are part of the wire format.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub captcha_gid: &'a str,
    pub captcha_text: &'a str,
    pub emailauth: &'a str,
    pub emailsteamid: &'a str,
    pub password: &'a str,
    pub remember_login: &'a str,
    pub rsatimestamp: &'a str,
    pub twofactorcode: &'a str,
    pub username: &'a str,
    pub donotcache: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_scope: Option<&'a str>,
}

/// Response body of `dologin`. All fields are optional on the wire; absent flags read
/// as `false`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub emailauth_needed: bool,
    #[serde(default)]
    pub emaildomain: Option<String>,
    #[serde(default)]
    pub requires_twofactor: bool,
    #[serde(default)]
    pub captcha_needed: bool,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::option_string_or_number")]
    pub captcha_gid: Option<String>,
    /// The OAuth payload as a JSON string. Only present for mobile logins.
    #[serde(default)]
    pub oauth: Option<String>,
}

/// The decoded OAuth payload of a mobile login.
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthData {
    #[serde(with = "serialize::string")]
    pub steamid: u64,
    pub oauth_token: String,
}

/// Classifies a `dologin` response. The order of the checks is the order Steam's own
/// clients use and tests pin it; the flags are not assumed to be mutually exclusive.
pub(crate) fn classify(
    response: &LoginResponse,
    mobile: bool,
    community: &Url,
) -> Result<(), LoginError> {
    if !response.success && response.emailauth_needed {
        let domain = response.emaildomain.clone().unwrap_or_default();

        return Err(LoginChallenge::EmailGuard(domain).into());
    }

    if !response.success && response.requires_twofactor {
        return Err(LoginChallenge::MobileGuard.into());
    }

    if !response.success
        && response.captcha_needed
        && response.message.as_deref().is_some_and(|m| m.contains("Please verify your humanity"))
    {
        let gid = response.captcha_gid.clone()
            .unwrap_or_else(|| String::from(NO_CAPTCHA_GID));
        let url = format!("{community}login/rendercaptcha/?gid={gid}");

        return Err(LoginChallenge::Captcha { gid, url }.into());
    }

    if !response.success {
        let message = response.message.clone()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| String::from("Unknown error"));

        return Err(LoginChallenge::RejectedCredentials(message).into());
    }

    if mobile && response.oauth.is_none() {
        return Err(Error::MalformedResponse(MALFORMED_RESPONSE).into());
    }

    Ok(())
}

/// The `name=value` part of a `Set-Cookie` header value.
pub(crate) fn cookie_pair(set_cookie: &str) -> &str {
    set_cookie.split(';').next().unwrap_or(set_cookie).trim()
}

/// Whether a `Set-Cookie` header describes a secure cookie, by attribute or by name
/// convention.
pub(crate) fn is_secure_cookie(set_cookie: &str) -> bool {
    let name = cookie_pair(set_cookie).split('=').next().unwrap_or_default();

    name.ends_with("Secure")
        || name.starts_with("steamMachineAuth")
        || set_cookie
            .split(';')
            .skip(1)
            .any(|attribute| attribute.trim().eq_ignore_ascii_case("secure"))
}

/// Extracts the SteamID embedded in a `steamLogin` cookie from the returned cookies.
pub(crate) fn steamid_from_set_cookies(set_cookies: &[String]) -> Option<u64> {
    set_cookies.iter().find_map(|set_cookie| {
        let value = cookie_pair(set_cookie).strip_prefix("steamLogin=")?;
        let digits = value
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>();

        digits.parse().ok()
    })
}

/// Extracts a machine auth cookie for the given SteamID from the returned cookies as
/// an opaque reusable `"<steamid>||<token>"` token.
pub(crate) fn machine_auth_from_set_cookies(
    set_cookies: &[String],
    steamid: u64,
) -> Option<String> {
    let prefix = format!("steamMachineAuth{steamid}=");

    set_cookies.iter().find_map(|set_cookie| {
        let value = cookie_pair(set_cookie).strip_prefix(prefix.as_str())?;

        Some(format!("{steamid}||{value}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn community() -> Url {
        "https://steamcommunity.com".parse().unwrap()
    }

    fn failed_response() -> LoginResponse {
        LoginResponse {
            success: false,
            message: None,
            emailauth_needed: false,
            emaildomain: None,
            requires_twofactor: false,
            captcha_needed: false,
            captcha_gid: None,
            oauth: None,
        }
    }

    #[test]
    fn email_guard_takes_priority_over_two_factor() {
        let response = LoginResponse {
            emailauth_needed: true,
            emaildomain: Some(String::from("gmail.com")),
            requires_twofactor: true,
            captcha_needed: true,
            message: Some(String::from("Please verify your humanity")),
            ..failed_response()
        };
        let error = classify(&response, true, &community()).unwrap_err();

        assert!(matches!(
            error,
            LoginError::Challenge(LoginChallenge::EmailGuard(domain)) if domain == "gmail.com"
        ));
    }

    #[test]
    fn two_factor_takes_priority_over_captcha() {
        let response = LoginResponse {
            requires_twofactor: true,
            captcha_needed: true,
            message: Some(String::from("Please verify your humanity")),
            ..failed_response()
        };
        let error = classify(&response, true, &community()).unwrap_err();

        assert!(matches!(error, LoginError::Challenge(LoginChallenge::MobileGuard)));
    }

    #[test]
    fn captcha_includes_gid_in_render_url() {
        let response = LoginResponse {
            captcha_needed: true,
            captcha_gid: Some(String::from("3122988244471440000")),
            message: Some(String::from("There have been too many login failures from your network in a short time period. Please verify your humanity.")),
            ..failed_response()
        };
        let error = classify(&response, true, &community()).unwrap_err();

        match error {
            LoginError::Challenge(LoginChallenge::Captcha { gid, url }) => {
                assert_eq!(gid, "3122988244471440000");
                assert!(url.contains("gid=3122988244471440000"));
            },
            other => panic!("Unexpected outcome: {other}"),
        }
    }

    #[test]
    fn captcha_flag_without_humanity_message_is_rejected_credentials() {
        let response = LoginResponse {
            captcha_needed: true,
            message: Some(String::from("Incorrect login.")),
            ..failed_response()
        };
        let error = classify(&response, true, &community()).unwrap_err();

        assert!(matches!(
            error,
            LoginError::Challenge(LoginChallenge::RejectedCredentials(message)) if message == "Incorrect login."
        ));
    }

    #[test]
    fn failure_without_message_is_unknown_error() {
        let error = classify(&failed_response(), true, &community()).unwrap_err();

        assert!(matches!(
            error,
            LoginError::Challenge(LoginChallenge::RejectedCredentials(message)) if message == "Unknown error"
        ));
    }

    #[test]
    fn mobile_success_without_oauth_is_malformed() {
        let response = LoginResponse {
            success: true,
            ..failed_response()
        };
        let error = classify(&response, true, &community()).unwrap_err();

        assert!(matches!(
            error,
            LoginError::Error(Error::MalformedResponse(message)) if message == MALFORMED_RESPONSE
        ));
    }

    #[test]
    fn web_success_without_oauth_is_fine() {
        let response = LoginResponse {
            success: true,
            ..failed_response()
        };

        assert!(classify(&response, false, &community()).is_ok());
    }

    #[test]
    fn scans_set_cookies_for_identity_and_machine_auth() {
        let set_cookies = vec![
            String::from("steamLogin=76561198000000000%7C%7Ctoken; path=/; HttpOnly"),
            String::from("steamMachineAuth76561198000000000=deadbeef; path=/; secure"),
        ];

        assert_eq!(steamid_from_set_cookies(&set_cookies), Some(76561198000000000));
        assert_eq!(
            machine_auth_from_set_cookies(&set_cookies, 76561198000000000).as_deref(),
            Some("76561198000000000||deadbeef")
        );
        assert!(!is_secure_cookie(&set_cookies[0]));
        assert!(is_secure_cookie(&set_cookies[1]));
    }
}
