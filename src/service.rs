//! The cookie service.
//!
//! The service is the single entry point for both surfaces of the store:
//!
//! * the header surface, which takes a request URI and `Set-Cookie` text, resolves the storage
//!   host from the URI and any `domain` attribute, and serializes matching cookies back into a
//!   `Cookie` header value;
//! * the management surface, which takes explicit hosts and bypasses `domain` resolution.
//!
//! Every operation takes the lock around the jar for its whole duration, so each one is atomic
//! with respect to the others.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cookie::{default_path, Cookie, SetCookie, SetCookieIter};
use error::*;
use host::{canonicalize, resolve_storage_host, CanonicalHost};
use jar::{Clock, ClockFn, Jar};
use uri::{CookieUri, FILE_SCHEME};

/// A cookie store shared between the header and management surfaces.
#[derive(Debug)]
pub struct CookieService<T: Clock = ClockFn> {
    jar: Mutex<Jar<T>>,
}

impl Default for CookieService<ClockFn> {
    fn default() -> CookieService<ClockFn> {
        CookieService {
            jar: Mutex::new(Jar::new()),
        }
    }
}

impl CookieService<ClockFn> {
    /// Create an empty service on the system clock.
    pub fn new() -> CookieService<ClockFn> {
        Default::default()
    }
}

impl<T: Clock> CookieService<T> {
    /// Create an empty service with a specific time source.
    pub fn with_clock(clock: T) -> CookieService<T> {
        CookieService {
            jar: Mutex::new(Jar::with_clock(clock)),
        }
    }

    /// Lock the jar.
    ///
    /// Each operation leaves the jar consistent before it can panic, so a poisoned lock still
    /// guards a usable jar.
    fn jar(&self) -> MutexGuard<Jar<T>> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a cookie under an explicit host.
    ///
    /// The host is canonicalized but no `domain` resolution takes place. A cookie with the same
    /// host, name and path is replaced.
    pub fn add(
        &self,
        host: &str,
        path: &str,
        name: &str,
        value: &str,
        is_secure: bool,
        is_http_only: bool,
        is_session: bool,
        expiry: i64,
    ) -> Result<()> {
        let cookie = Cookie::builder()
            .host_str(host)
            .path(path)
            .name_value(name, value)
            .secure(is_secure)
            .http_only(is_http_only)
            .expiry(expiry)
            .session(is_session)
            .build()?;

        self.jar().add_cookie(cookie);
        Ok(())
    }

    /// Remove the cookie with an explicit host, name and path.
    ///
    /// Removing a cookie that does not exist is not an error. `blocked` is a hint for the
    /// permission layer and does not change what is removed.
    pub fn remove(&self, host: &str, name: &str, path: &str, blocked: bool) -> Result<()> {
        let host = canonicalize(host)?;
        if blocked {
            info!("removing cookie {:?} for host {:?} as blocked", name, host.as_str());
        }
        self.jar().remove_cookie(&host, name, path);
        Ok(())
    }

    /// Remove every cookie.
    pub fn remove_all(&self) {
        self.jar().clear();
    }

    /// Count the live cookies stored under exactly the given host.
    pub fn count_cookies_from_host(&self, host: &str) -> Result<usize> {
        let host = canonicalize(host)?;
        Ok(self.jar().count_from_host(&host))
    }

    /// Check if a live cookie with the given host, name and path exists.
    pub fn cookie_exists(&self, host: &str, name: &str, path: &str) -> Result<bool> {
        let host = canonicalize(host)?;
        Ok(self.jar().contains(&host, name, path))
    }

    /// Take a snapshot of every live cookie, in the order they were first added.
    pub fn enumerator(&self) -> Vec<Cookie> {
        let jar = self.jar();
        let cookies = jar.cookies().into_iter().cloned().collect();
        cookies
    }

    /// Store the cookies of a `Set-Cookie` header received from a URI.
    ///
    /// The header may hold several directives separated by newlines. Directives that cannot be
    /// parsed, URIs without a usable host, and `domain` attributes that do not name the request
    /// host are all ignored without error.
    pub fn set_cookie_string<U: CookieUri>(&self, uri: &U, header: &str) {
        let request = match request_host(uri) {
            Some(request) => request,
            None => return,
        };

        let mut jar = self.jar();
        for set_cookie in SetCookieIter::new(header) {
            match set_cookie {
                Ok(set_cookie) => store(&mut jar, uri, &request, &set_cookie),
                Err(error) => warn!("ignoring malformed cookie from {:?}: {}", request.as_str(), error),
            }
        }
    }

    /// Get the `Cookie` header value to send to a URI.
    ///
    /// Cookies are joined as `name=value; name2=value2` in the order they were added. Returns
    /// `None` when no cookies apply.
    pub fn get_cookie_string<U: CookieUri>(&self, uri: &U) -> Option<String> {
        let request = request_host(uri)?;
        let secure = uri.is_secure();

        let jar = self.jar();
        let pairs: Vec<&str> = jar.host_cookies(&request)
            .filter(|cookie| secure || !cookie.is_secure())
            .map(Cookie::pair_str)
            .collect();
        trace!("{} cookies for {:?}", pairs.len(), request.as_str());

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

/// Get the canonical host of a request, if cookies can apply to it at all.
///
/// Only `file` origins may use the empty host.
fn request_host<U: CookieUri>(uri: &U) -> Option<CanonicalHost> {
    let host = match canonicalize(uri.ascii_host()) {
        Ok(host) => host,
        Err(error) => {
            debug!("no cookies for {}: {}", uri.scheme(), error);
            return None;
        }
    };

    if host.is_empty() && uri.scheme() != FILE_SCHEME {
        debug!("no cookies for {} without a host", uri.scheme());
        return None;
    }

    Some(host)
}

/// Store a single parsed directive against a request host.
fn store<T: Clock, U: CookieUri>(
    jar: &mut Jar<T>,
    uri: &U,
    request: &CanonicalHost,
    set_cookie: &SetCookie,
) {
    let host = match resolve_storage_host(request, set_cookie.domain()) {
        Ok(host) => host,
        Err(rejection) => {
            debug!("rejecting cookie {:?}: {}", set_cookie.name(), rejection);
            return;
        }
    };

    let path = match set_cookie.path() {
        Some(path) if path.starts_with('/') => path,
        _ => default_path(uri.path()),
    };

    let mut builder = Cookie::builder()
        .host(host.clone())
        .path(path)
        .pair(set_cookie.pair().clone())
        .secure(set_cookie.secure())
        .http_only(set_cookie.http_only());

    let now = jar.now();
    if let Some(expiry) = set_cookie.lifetime().expiry(now) {
        // A cookie that arrives already expired deletes the one it would replace.
        if expiry <= now.unix_timestamp() {
            debug!("cookie {:?} for host {:?} arrived expired", set_cookie.name(), host.as_str());
            jar.remove_cookie(&host, set_cookie.name(), path);
            return;
        }
        builder = builder.expiry(expiry);
    }

    match builder.build() {
        Ok(cookie) => {
            jar.add_cookie(cookie);
        }
        Err(error) => warn!("could not build cookie {:?}: {}", set_cookie.name(), error),
    }
}
