//! Representation of a cookie within the value store.

mod iter;
mod parse;

use time::{Duration, OffsetDateTime};

use self::parse::{process_cookie, Argument};
pub use self::iter::SetCookieIter;
pub use self::parse::Pair;
use error::*;
use host::{canonicalize, CanonicalHost};

/// Expiry given to session cookies, which never expire by the clock.
pub const SESSION_EXPIRY: i64 = ::std::i64::MAX;

/// A builder for a cookie.
#[derive(Debug)]
pub enum Builder {
    /// A partially constructed cookie.
    Cookie(Partial),

    /// An error.
    Err(Error),
}

impl From<Error> for Builder {
    fn from(e: Error) -> Builder {
        Builder::Err(e)
    }
}

/// The fields of a cookie collected so far by a `Builder`.
#[derive(Debug, Clone)]
pub struct Partial {
    host: Option<CanonicalHost>,
    path: String,
    pair: Pair,
    secure: bool,
    http_only: bool,
    session: bool,
    expiry: i64,
}

impl Default for Partial {
    fn default() -> Partial {
        Partial {
            host: None,
            path: "/".to_owned(),
            pair: Pair::default(),
            secure: false,
            http_only: false,
            session: true,
            expiry: SESSION_EXPIRY,
        }
    }
}

impl Builder {
    /// Create a new cookie builder.
    ///
    /// The default cookie is a session cookie on the root path with no host.
    pub fn new() -> Builder {
        Builder::Cookie(Default::default())
    }

    /// Set the canonical host the cookie is stored under.
    pub fn host(self, host: CanonicalHost) -> Builder {
        self.map(|partial| {
            Ok(Partial {
                host: Some(host),
                ..partial
            })
        })
    }

    /// Set the host from a raw string, canonicalizing it first.
    pub fn host_str(self, host: &str) -> Builder {
        match canonicalize(host) {
            Ok(host) => self.host(host),
            Err(error) => Builder::Err(error),
        }
    }

    /// Set the path for a cookie to be matched in.
    pub fn path(self, path: &str) -> Builder {
        self.map(|partial| {
            Ok(Partial {
                path: path.to_owned(),
                ..partial
            })
        })
    }

    /// Set the name, value pair for the cookie.
    pub fn pair(self, pair: Pair) -> Builder {
        self.map(|partial| Ok(Partial { pair: pair, ..partial }))
    }

    /// Set the name and value of the cookie.
    pub fn name_value(self, name: &str, value: &str) -> Builder {
        self.pair(Pair::new(name, value))
    }

    /// Set whether or not the cookie requires a secure connection.
    pub fn secure(self, secure: bool) -> Builder {
        self.map(|partial| Ok(Partial { secure: secure, ..partial }))
    }

    /// Set whether a cookie should only be sent over HTTP connections.
    pub fn http_only(self, http_only: bool) -> Builder {
        self.map(|partial| {
            Ok(Partial {
                http_only: http_only,
                ..partial
            })
        })
    }

    /// Make the cookie last until the given UNIX time in seconds.
    pub fn expiry(self, expiry: i64) -> Builder {
        self.map(|partial| {
            Ok(Partial {
                session: false,
                expiry: expiry,
                ..partial
            })
        })
    }

    /// Set whether the cookie lives only for the session.
    ///
    /// A session cookie keeps any expiry it was given but is never expired by the clock.
    pub fn session(self, session: bool) -> Builder {
        self.map(|partial| {
            Ok(Partial {
                session: session,
                ..partial
            })
        })
    }

    /// Build the cookie.
    pub fn build(self) -> Result<Cookie> {
        match self {
            Builder::Cookie(Partial { host: None, .. }) => Err(ErrorKind::MissingHost.into()),
            Builder::Cookie(Partial {
                host: Some(host),
                path,
                pair,
                secure,
                http_only,
                session,
                expiry,
            }) => Ok(Cookie {
                host: host,
                path: path,
                pair: pair,
                secure: secure,
                http_only: http_only,
                session: session,
                expiry: expiry,
                creation_time: 0,
            }),
            Builder::Err(error) => Err(error),
        }
    }

    fn map<F>(self, f: F) -> Builder
    where
        F: FnOnce(Partial) -> Result<Partial>,
    {
        match self {
            Builder::Cookie(partial) => match f(partial) {
                Ok(partial) => Builder::Cookie(partial),
                Err(error) => Builder::Err(error),
            },
            _ => self,
        }
    }
}

/// A cookie filed in the jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    host: CanonicalHost,
    path: String,
    pair: Pair,
    secure: bool,
    http_only: bool,
    session: bool,
    /// UNIX time in seconds.
    expiry: i64,
    /// Microseconds, assigned by the jar.
    creation_time: i64,
}

impl Cookie {
    /// Start building a cookie.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Get the host the cookie is stored under.
    pub fn host(&self) -> &CanonicalHost {
        &self.host
    }

    /// Get the path the cookie applies to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the name of the cookie.
    pub fn name(&self) -> &str {
        self.pair.name()
    }

    /// Get the value of the cookie.
    pub fn value(&self) -> &str {
        self.pair.value()
    }

    /// Get the formatted `name=value` fragment sent in a `Cookie` header.
    pub fn pair_str(&self) -> &str {
        self.pair.as_str()
    }

    /// Check if the cookie requires a secure connection.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Check if the cookie should only be sent over HTTP connections.
    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Check if the cookie only lives for the session.
    pub fn is_session(&self) -> bool {
        self.session
    }

    /// Get the expiry of the cookie as UNIX time in seconds.
    pub fn expiry(&self) -> i64 {
        self.expiry
    }

    /// Get the time the cookie was stored, in microseconds.
    pub fn creation_time(&self) -> i64 {
        self.creation_time
    }

    /// Check if the cookie has expired at the given UNIX time in seconds.
    pub fn is_expired(&self, now: i64) -> bool {
        !self.session && self.expiry <= now
    }

    /// Check if the cookie is identified by the given host, name and path.
    pub fn is_identified_by(&self, host: &str, name: &str, path: &str) -> bool {
        self.host == host && self.name() == name && self.path == path
    }

    /// Check if two cookies share the same host, name and path.
    pub fn same_identity(&self, other: &Cookie) -> bool {
        self.is_identified_by(&other.host, other.name(), &other.path)
    }

    pub(crate) fn set_creation_time(&mut self, creation_time: i64) {
        self.creation_time = creation_time;
    }
}

/// How long a cookie from a `Set-Cookie` directive should live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// The cookie lives for the session.
    Session,
    /// The cookie lives for a number of seconds from when it is received.
    MaxAge(Duration),
    /// The cookie lives until a given time.
    Expires(OffsetDateTime),
}

impl Lifetime {
    /// Get the expiry in UNIX seconds relative to `now`, or `None` for a session cookie.
    pub fn expiry(&self, now: OffsetDateTime) -> Option<i64> {
        match *self {
            Lifetime::Session => None,
            Lifetime::MaxAge(duration) => {
                Some(now.unix_timestamp().saturating_add(duration.whole_seconds()))
            }
            Lifetime::Expires(time) => Some(time.unix_timestamp()),
        }
    }
}

/// The `Set-Cookie` directive sent from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pair: Pair,
    domain: Option<String>,
    path: Option<String>,
    lifetime: Lifetime,
    secure: bool,
    http_only: bool,
}

impl SetCookie {
    /// Parse a single directive.
    ///
    /// Malformed attributes are ignored; a malformed `name=value` pair fails the directive.
    pub fn parse(directive: &str) -> Result<SetCookie> {
        let (pair, args) = process_cookie(directive)?;
        let mut set_cookie = SetCookie {
            pair: pair,
            domain: None,
            path: None,
            lifetime: Lifetime::Session,
            secure: false,
            http_only: false,
        };

        // If a Max-Age argument has been seen, Expires should be ignored.
        let mut use_max_age = false;

        for arg in args {
            let arg = match arg {
                Ok(arg) => arg,
                Err(error) => {
                    debug!("ignoring cookie attribute: {}", error);
                    continue;
                }
            };

            match (arg, use_max_age) {
                (Argument::Expires(time), false) => {
                    set_cookie.lifetime = Lifetime::Expires(time);
                }
                (Argument::MaxAge(duration), _) => {
                    set_cookie.lifetime = Lifetime::MaxAge(duration);
                    use_max_age = true;
                }
                (Argument::Domain(domain), _) => {
                    set_cookie.domain = Some(domain.to_owned());
                }
                (Argument::Path(path), _) => {
                    set_cookie.path = Some(path.to_owned());
                }
                (Argument::Secure, _) => {
                    set_cookie.secure = true;
                }
                (Argument::HttpOnly, _) => {
                    set_cookie.http_only = true;
                }
                // Ignore all others
                _ => {}
            }
        }

        Ok(set_cookie)
    }

    /// Get the name of the cookie.
    pub fn name(&self) -> &str {
        self.pair.name()
    }

    /// Get the value of the cookie.
    pub fn value(&self) -> &str {
        self.pair.value()
    }

    /// Get the name, value pair.
    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    /// Get the raw `domain` attribute, if one was given.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_ref().map(String::as_str)
    }

    /// Get the raw `path` attribute, if one was given.
    pub fn path(&self) -> Option<&str> {
        self.path.as_ref().map(String::as_str)
    }

    /// Get how long the cookie should live.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Check if the cookie requires a secure connection.
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Check if the cookie should only be sent over HTTP connections.
    pub fn http_only(&self) -> bool {
        self.http_only
    }
}

/// Get the default cookie path for a request path.
///
/// This is the request path up to, but not including, its last `/`, or `/` when that would be
/// empty or the path is not absolute.
pub fn default_path(request_path: &str) -> &str {
    if !request_path.starts_with('/') {
        return "/";
    }
    match request_path.rfind('/') {
        Some(0) | None => "/",
        Some(end) => &request_path[..end],
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_cookie() {
        let cookie = Builder::new()
            .host_str("baz.com")
            .path("/")
            .name_value("foo", "bar")
            .secure(true)
            .expiry(1000)
            .build()
            .unwrap();

        assert_eq!(cookie.host().as_str(), "baz.com");
        assert_eq!(cookie.name(), "foo");
        assert_eq!(cookie.value(), "bar");
        assert_eq!(cookie.pair_str(), "foo=bar");
        assert!(cookie.is_secure());
        assert!(!cookie.is_http_only());
        assert!(!cookie.is_session());
        assert_eq!(cookie.expiry(), 1000);
    }

    #[test]
    fn build_requires_legal_host() {
        let missing = Builder::new().name_value("foo", "bar").build();
        assert!(missing.is_err());

        let dot = Builder::new().host_str(".").name_value("foo", "bar").build();
        match dot {
            Err(Error(ErrorKind::InvalidHost(_), _)) => {}
            other => panic!("expected InvalidHost, got {:?}", other),
        }

        let empty = Builder::new().host_str("").name_value("foo", "bar").build();
        assert_eq!(empty.unwrap().host().as_str(), "");
    }

    #[test]
    fn session_cookies_never_expire() {
        let cookie = Builder::new()
            .host_str("baz.com")
            .expiry(10)
            .session(true)
            .build()
            .unwrap();
        assert!(!cookie.is_expired(::std::i64::MAX));

        let cookie = Builder::new().host_str("baz.com").expiry(10).build().unwrap();
        assert!(!cookie.is_expired(9));
        assert!(cookie.is_expired(10));
        assert!(cookie.is_expired(11));
    }

    #[test]
    fn parse_set_cookie_attributes() {
        let set_cookie = SetCookie::parse(
            "SID=31d4d96e407aad42; Path=/; Domain=example.com; Secure; HttpOnly",
        ).unwrap();
        assert_eq!(set_cookie.name(), "SID");
        assert_eq!(set_cookie.value(), "31d4d96e407aad42");
        assert_eq!(set_cookie.domain(), Some("example.com"));
        assert_eq!(set_cookie.path(), Some("/"));
        assert_eq!(set_cookie.lifetime(), Lifetime::Session);
        assert!(set_cookie.secure());
        assert!(set_cookie.http_only());
    }

    #[test]
    fn attribute_names_ignore_case() {
        let set_cookie = SetCookie::parse("foo=bar; domain=.foo.com; PATH=/a; secure").unwrap();
        assert_eq!(set_cookie.domain(), Some(".foo.com"));
        assert_eq!(set_cookie.path(), Some("/a"));
        assert!(set_cookie.secure());
    }

    #[test]
    fn empty_domain_attribute_is_kept() {
        let set_cookie = SetCookie::parse("foo3=bar; domain=").unwrap();
        assert_eq!(set_cookie.domain(), Some(""));
    }

    #[test]
    fn last_attribute_wins() {
        let set_cookie = SetCookie::parse("foo=bar; domain=a.com; domain=b.com").unwrap();
        assert_eq!(set_cookie.domain(), Some("b.com"));
    }

    #[test]
    fn max_age_overrides_expires() {
        let now = OffsetDateTime::from_unix_timestamp(1_000_000).unwrap();

        let set_cookie = SetCookie::parse(
            "foo=bar; Max-Age=60; Expires=Wed, 21 Oct 2015 07:28:00 GMT",
        ).unwrap();
        assert_eq!(set_cookie.lifetime().expiry(now), Some(1_000_060));

        let set_cookie = SetCookie::parse(
            "foo=bar; Expires=Wed, 21 Oct 2015 07:28:00 GMT; Max-Age=60",
        ).unwrap();
        assert_eq!(set_cookie.lifetime().expiry(now), Some(1_000_060));

        let set_cookie = SetCookie::parse("foo=bar; Expires=Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(set_cookie.lifetime().expiry(now), Some(1_445_412_480));
    }

    #[test]
    fn malformed_attributes_are_ignored() {
        let set_cookie = SetCookie::parse("foo=bar; Max-Age=soon; Expires=never; Secure").unwrap();
        assert_eq!(set_cookie.lifetime(), Lifetime::Session);
        assert!(set_cookie.secure());
    }

    #[test]
    fn default_paths() {
        assert_eq!(default_path(""), "/");
        assert_eq!(default_path("/"), "/");
        assert_eq!(default_path("/index.html"), "/");
        assert_eq!(default_path("/path/to/page.html"), "/path/to");
        assert_eq!(default_path("/path/to/"), "/path/to");
        assert_eq!(default_path("relative"), "/");
    }
}
