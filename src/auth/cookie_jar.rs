use cookie_store::RawCookie;
use publicsuffix::{List, Psl};
use reqwest::header::HeaderValue;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use url::Url;

/// Cookie capability the session layer depends on.
///
/// Implemented by [`CookieJar`], which is also handed to reqwest as its cookie
/// provider so both sides observe the same cookies.
pub trait CookieStore: Send + Sync {
    /// Value of the named cookie visible to `url`, if present and unexpired
    fn get(&self, url: &Url, name: &str) -> Option<String>;

    /// Store a cookie from a raw `Set-Cookie` header value received from `url`
    fn set(&self, url: &Url, set_cookie: &str);

    /// Remove every cookie
    fn clear(&self);

    /// Names of all cookies visible to `url`
    fn names(&self, url: &Url) -> Vec<String>;
}

/// RFC 6265 cookie jar shared between the session store and reqwest.
///
/// Storage and matching are delegated to [`cookie_store`]. A `Domain`
/// attribute naming a public suffix is refused unless it is the request host
/// itself; without a loaded suffix list every top-level label counts as one.
#[derive(Debug)]
pub struct CookieJar {
    store: RwLock<cookie_store::CookieStore>,
    suffixes: List,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    pub fn new() -> Self {
        Self::with_suffix_list(List::new())
    }

    /// Jar that also rejects the domains of a full public suffix list
    pub fn with_suffix_list(suffixes: List) -> Self {
        Self {
            store: RwLock::new(cookie_store::CookieStore::new_with_public_suffix(Some(
                suffixes.clone(),
            ))),
            suffixes,
        }
    }

    /// Number of unexpired cookies in the jar
    pub fn len(&self) -> usize {
        self.read().iter_unexpired().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, cookie_store::CookieStore> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, cookie_store::CookieStore> {
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }

    /// True when `domain` has no registrable part, i.e. it is itself a suffix
    fn is_public_suffix(&self, domain: &str) -> bool {
        self.suffixes.domain(domain.as_bytes()).is_none()
    }

    /// Cookies matching `url`, most specific path first
    fn matching(&self, url: &Url) -> Vec<(String, String)> {
        let store = self.read();
        let mut matched = store.matches(url);
        matched.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        matched
            .into_iter()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect()
    }
}

impl CookieStore for CookieJar {
    fn get(&self, url: &Url, name: &str) -> Option<String> {
        self.matching(url)
            .into_iter()
            .find(|(cookie_name, _)| cookie_name == name)
            .map(|(_, value)| value)
    }

    fn set(&self, url: &Url, set_cookie: &str) {
        let parsed = match RawCookie::parse(set_cookie) {
            Ok(cookie) => cookie,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed Set-Cookie header");
                return;
            }
        };

        if let Some(domain) = parsed.domain() {
            let domain = domain.trim_start_matches('.').to_ascii_lowercase();
            let is_host = url.host_str().is_some_and(|h| h.eq_ignore_ascii_case(&domain));
            if !is_host && self.is_public_suffix(&domain) {
                debug!(cookie = parsed.name(), domain = %domain, "Rejecting cookie for public suffix");
                return;
            }
        }

        match self.write().insert_raw(&parsed, url) {
            Ok(action) => debug!(cookie = parsed.name(), ?action, "Stored cookie"),
            Err(e) => debug!(cookie = parsed.name(), error = %e, "Cookie not stored"),
        }
    }

    fn clear(&self) {
        self.write().clear();
    }

    fn names(&self, url: &Url) -> Vec<String> {
        self.matching(url).into_iter().map(|(name, _)| name).collect()
    }
}

impl reqwest::cookie::CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            if let Ok(raw) = header.to_str() {
                CookieStore::set(self, url, raw);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .matching(url)
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            return None;
        }
        HeaderValue::from_str(&header).ok()
    }
}
