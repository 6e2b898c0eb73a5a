//! Canonical storage hosts and `domain` attribute resolution.
//!
//! A canonical host is the raw ASCII host of a request (or an explicit management host)
//! after it has been checked for legality. No case folding, punycode conversion, or dot
//! stripping happens here: `baz.com` and `baz.com.` are different keys, and the empty host is
//! a real key. The single literal `.` is the one value that is never a legal key.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use error::*;

/// A host that is legal to file cookies under.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalHost(String);

impl CanonicalHost {
    /// Get the host as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the empty host used by hostless origins.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if the host ends in a `.`.
    pub fn has_trailing_dot(&self) -> bool {
        self.0.ends_with('.')
    }
}

impl Deref for CanonicalHost {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalHost {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalHost {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalHost {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CanonicalHost {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<'a> PartialEq<&'a str> for CanonicalHost {
    fn eq(&self, other: &&'a str) -> bool {
        self.0 == *other
    }
}

/// Canonicalize a raw host into a storage key.
///
/// Every input except the literal `"."` is returned unchanged. Canonicalizing an already
/// canonical host yields the same host.
pub fn canonicalize(raw: &str) -> Result<CanonicalHost> {
    if raw == "." {
        bail!(ErrorKind::InvalidHost(raw.to_owned()));
    }
    Ok(CanonicalHost(raw.to_owned()))
}

/// The reason a `domain` attribute was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The attribute did not canonicalize to a legal host.
    InvalidHost(String),
    /// The attribute names a host other than the request host.
    Mismatch {
        /// The request host the cookie came from.
        request: CanonicalHost,
        /// The host implied by the attribute.
        domain: CanonicalHost,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rejection::InvalidHost(ref domain) => {
                write!(f, "domain {:?} is not a legal host", domain)
            }
            Rejection::Mismatch { ref request, ref domain } => {
                write!(f, "domain {:?} does not match request host {:?}", domain.as_str(), request.as_str())
            }
        }
    }
}

/// Decide which host a cookie from `request` with an optional `domain` attribute is stored under.
///
/// An absent or empty attribute gives a host-only cookie filed under the request host. Otherwise
/// at most one leading `.` is dropped from the attribute and what remains must be exactly the
/// request host, trailing dot included. The result never begins with a `.` that the attribute
/// supplied.
pub fn resolve_storage_host(
    request: &CanonicalHost,
    domain: Option<&str>,
) -> ::std::result::Result<CanonicalHost, Rejection> {
    let domain = match domain {
        None | Some("") => return Ok(request.clone()),
        Some(domain) => domain,
    };

    // A bare "." would strip to the empty host and match hostless origins.
    if domain == "." {
        return Err(Rejection::InvalidHost(domain.to_owned()));
    }

    let candidate = if domain.starts_with('.') {
        &domain[1..]
    } else {
        domain
    };

    let candidate = canonicalize(candidate)
        .map_err(|_| Rejection::InvalidHost(domain.to_owned()))?;

    if candidate == *request {
        Ok(candidate)
    } else {
        Err(Rejection::Mismatch {
            request: request.clone(),
            domain: candidate,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn host(raw: &str) -> CanonicalHost {
        canonicalize(raw).unwrap()
    }

    #[test]
    fn canonicalize_keeps_hosts_unchanged() {
        for raw in &["", "baz.com", "baz.com.", ".baz.com", "..", "192.168.0.1", "localhost"] {
            assert_eq!(host(raw).as_str(), *raw);
        }
    }

    #[test]
    fn canonicalize_rejects_single_dot() {
        match canonicalize(".") {
            Err(Error(ErrorKind::InvalidHost(ref raw), _)) => assert_eq!(raw, "."),
            other => panic!("expected InvalidHost, got {:?}", other),
        }
    }

    #[test]
    fn canonicalize_is_idempotent() {
        for raw in &["", "foo.com", "foo.com.", ".foo.com", "a..b"] {
            let once = host(raw);
            let twice = canonicalize(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn trailing_dot_is_a_distinct_key() {
        assert!(host("baz.com") != host("baz.com."));
        assert!(host("baz.com.").has_trailing_dot());
    }

    #[test]
    fn missing_or_empty_domain_is_host_only() {
        let request = host("foo.com");
        assert_eq!(resolve_storage_host(&request, None), Ok(host("foo.com")));
        assert_eq!(resolve_storage_host(&request, Some("")), Ok(host("foo.com")));

        let empty = host("");
        assert_eq!(resolve_storage_host(&empty, Some("")), Ok(host("")));
    }

    #[test]
    fn leading_dot_is_stripped_once() {
        for request in &["foo.com", "192.168.0.1", "localhost", "co.uk"] {
            let request = host(request);
            let bare = resolve_storage_host(&request, Some(request.as_str())).unwrap();
            let dotted = format!(".{}", request);
            let dotted = resolve_storage_host(&request, Some(dotted.as_str())).unwrap();
            assert_eq!(bare, request);
            assert_eq!(dotted, request);
            assert!(!dotted.starts_with('.'));
        }

        let request = host("foo.com");
        assert!(resolve_storage_host(&request, Some("..foo.com")).is_err());
    }

    #[test]
    fn trailing_dot_state_must_match() {
        let plain = host("foo.com");
        let dotted = host("foo.com.");

        assert_eq!(
            resolve_storage_host(&plain, Some("foo.com.")),
            Err(Rejection::Mismatch {
                request: plain.clone(),
                domain: host("foo.com."),
            })
        );
        assert!(resolve_storage_host(&dotted, Some("foo.com")).is_err());
        assert!(resolve_storage_host(&dotted, Some(".foo.com")).is_err());
        assert_eq!(resolve_storage_host(&dotted, Some("foo.com.")), Ok(dotted.clone()));
        assert_eq!(resolve_storage_host(&dotted, Some(".foo.com.")), Ok(dotted));
    }

    #[test]
    fn other_hosts_are_rejected() {
        let request = host("foo.com");
        assert!(resolve_storage_host(&request, Some("other.com")).is_err());
        assert!(resolve_storage_host(&request, Some("com")).is_err());
        assert!(resolve_storage_host(&request, Some("www.foo.com")).is_err());

        let empty = host("");
        assert!(resolve_storage_host(&empty, Some("bar.com")).is_err());
    }

    #[test]
    fn single_dot_domain_is_invalid() {
        for request in &["", "foo.com"] {
            assert_eq!(
                resolve_storage_host(&host(request), Some(".")),
                Err(Rejection::InvalidHost(".".to_owned()))
            );
        }
    }
}
