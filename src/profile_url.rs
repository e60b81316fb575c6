//! Resolves and caches the logged-in user's profile URL.

use crate::error::Error;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use lazy_regex::regex_captures;
use reqwest::header::LOCATION;
use url::Url;

/// How long a resolved profile URL stays valid.
const CACHE_LIFETIME: Duration = Duration::from_secs(60);

const CANT_GET_PROFILE_URL: &str = "Can't get profile URL";

/// Resolves the logged-in user's own profile path (`/id/<vanity>` or
/// `/profiles/<steamid>`) by probing the `/my` redirect, caching the result for a
/// minute. Several profile-scoped operations need this as their base path.
#[derive(Debug)]
pub struct ProfileUrlResolver {
    /// Client with redirects disabled. Must share the session's cookie store.
    client: reqwest::Client,
    community: Url,
    cache_lifetime: Duration,
    cached: Mutex<Option<(String, Instant)>>,
}

impl ProfileUrlResolver {
    pub fn new(client: reqwest::Client, community: Url) -> Self {
        Self::with_cache_lifetime(client, community, CACHE_LIFETIME)
    }

    /// As [`ProfileUrlResolver::new`] but with a custom cache lifetime.
    pub fn with_cache_lifetime(
        client: reqwest::Client,
        community: Url,
        cache_lifetime: Duration,
    ) -> Self {
        Self {
            client,
            community,
            cache_lifetime,
            cached: Mutex::new(None),
        }
    }

    /// The profile path for the logged-in user. Served from cache when a resolution
    /// happened less than a minute ago, otherwise costs one request.
    pub async fn resolve(&self) -> Result<String, Error> {
        if let Some((path, resolved_at)) = self.cached.lock().unwrap().as_ref() {
            if resolved_at.elapsed() < self.cache_lifetime {
                log::debug!("Using cached profile URL {path}");
                return Ok(path.clone());
            }
        }

        let uri = format!("{}my", self.community);
        let response = self.client.get(&uri)
            .send()
            .await?;
        let status = response.status();

        if !status.is_redirection() {
            return Err(Error::Http(status));
        }

        let location = response.headers().get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::MalformedResponse(CANT_GET_PROFILE_URL))?;
        let (_, path) = regex_captures!(r#"(/(?:id|profiles)/[^/?#]+)"#, location)
            .ok_or(Error::MalformedResponse(CANT_GET_PROFILE_URL))?;
        let path = path.to_string();

        *self.cached.lock().unwrap() = Some((path.clone(), Instant::now()));

        Ok(path)
    }

    /// Drops the cached value. Called after a fresh login.
    pub fn invalidate(&self) {
        *self.cached.lock().unwrap() = None;
    }
}
