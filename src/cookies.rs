//! Cookie storage shared across the Steam domains.

use crate::helpers::{COMMUNITY_HOSTNAME, STORE_HOSTNAME, HELP_HOSTNAME};
use std::sync::Arc;
use reqwest::cookie::{CookieStore, Jar};
use steamid_ng::SteamID;
use url::Url;

/// A cookie jar which replicates every cookie across the Steam Community, store and help
/// hostnames. Steam expects the same session cookies on all three.
///
/// The underlying [`Jar`] can be shared with any reqwest client through
/// [`CookieJar::inner`] so requests pick the cookies up automatically.
#[derive(Debug, Clone)]
pub struct CookieJar {
    jar: Arc<Jar>,
    hosts: Vec<String>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Creates a jar covering the three standard Steam hostnames.
    pub fn new() -> Self {
        Self::with_hosts(&[COMMUNITY_HOSTNAME, STORE_HOSTNAME, HELP_HOSTNAME])
    }

    /// Creates a jar covering the given hostnames. Useful when requests are pointed at
    /// a non-standard host.
    pub fn with_hosts(hosts: &[&str]) -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            hosts: hosts.iter().map(|host| host.to_string()).collect(),
        }
    }

    /// The underlying store, for connecting clients.
    pub fn inner(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Sets a cookie under every host. `secure` marks the cookie with the `Secure`
    /// attribute so it is only attached to `https` requests.
    pub fn set_cookie(&self, cookie_str: &str, secure: bool) {
        // the jar only honors the attribute when it is in the cookie string itself;
        // the scheme of the URL it is added under does not mark it
        let scheme = if secure { "https" } else { "http" };
        let cookie = if secure {
            format!("{cookie_str}; Secure")
        } else {
            cookie_str.to_string()
        };

        for host in &self.hosts {
            let url = format!("{scheme}://{host}").parse::<Url>()
                .unwrap_or_else(|error| panic!("URL could not be parsed from {host}: {error}"));

            self.jar.add_cookie_str(&cookie, &url);
        }
    }

    /// Removes a cookie by name under every host and both schemes.
    pub fn remove_cookie(&self, name: &str) {
        let removal = format!("{name}=; Max-Age=0");

        self.set_cookie(&removal, false);
        self.set_cookie(&removal, true);
    }

    /// The semicolon-joined `name=value` pairs visible to the given URL.
    pub fn cookie_string(&self, url: &Url) -> Option<String> {
        let header = self.jar.cookies(url)?;

        header.to_str().ok().map(|s| s.to_string())
    }

    /// The `name=value` pairs visible to the given URL.
    pub fn cookies(&self, url: &Url) -> Vec<String> {
        self.cookie_string(url)
            .map(|cookie_string| {
                cookie_string
                    .split("; ")
                    .map(|cookie| cookie.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Imports a previously persisted cookie set. Cookies named `steamLoginSecure`,
    /// ending in `Secure` or matching the machine auth pattern are written as secure,
    /// everything else as non-secure. If a `steamLogin` or `steamLoginSecure` cookie is
    /// present, the SteamID embedded in its value is returned.
    ///
    /// # Panics
    ///
    /// Panics if a cookie string contains no `=`. That is a bug in the caller, not a
    /// runtime condition.
    pub fn import(&self, cookies: &[String]) -> Option<SteamID> {
        let mut steamid: Option<SteamID> = None;

        for cookie_str in cookies {
            let (name, value) = cookie_str.split_once('=')
                .unwrap_or_else(|| panic!("Malformed cookie string: {cookie_str}"));
            let name = name.trim();
            let secure = name == "steamLoginSecure"
                || name.ends_with("Secure")
                || name.starts_with("steamMachineAuth");

            if name == "steamLogin" || name == "steamLoginSecure" {
                // the value is "<steamid>||<token>", possibly URL-encoded
                let digits = value
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>();

                if let Ok(id) = digits.parse::<u64>() {
                    steamid = Some(SteamID::from(id));
                }
            }

            self.set_cookie(cookie_str, secure);
        }

        steamid
    }
}
