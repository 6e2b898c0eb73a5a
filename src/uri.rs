//! The request URIs cookies are set from and sent to.
//!
//! The store only needs three things from a URI: its scheme, its ASCII host, and its path.
//! Anything that can answer those can drive the [`CookieService`](../service/struct.CookieService.html).

use url::Url;

/// The scheme whose origins have no host.
pub const FILE_SCHEME: &str = "file";

/// The view of a request URI used by the cookie service.
pub trait CookieUri {
    /// The lowercase scheme, such as `http`.
    fn scheme(&self) -> &str;

    /// The ASCII host of the URI, or the empty string when it has none.
    fn ascii_host(&self) -> &str;

    /// The path of the URI.
    fn path(&self) -> &str {
        "/"
    }

    /// Check if the URI was fetched over a secure channel.
    fn is_secure(&self) -> bool {
        self.scheme() == "https"
    }
}

impl<'a, U: CookieUri + ?Sized> CookieUri for &'a U {
    fn scheme(&self) -> &str {
        (**self).scheme()
    }

    fn ascii_host(&self) -> &str {
        (**self).ascii_host()
    }

    fn path(&self) -> &str {
        (**self).path()
    }

    fn is_secure(&self) -> bool {
        (**self).is_secure()
    }
}

/// `file` URLs never expose a host to the cookie store, even when they name one.
impl CookieUri for Url {
    fn scheme(&self) -> &str {
        Url::scheme(self)
    }

    fn ascii_host(&self) -> &str {
        if Url::scheme(self) == FILE_SCHEME {
            ""
        } else {
            self.host_str().unwrap_or("")
        }
    }

    fn path(&self) -> &str {
        Url::path(self)
    }
}

/// A URI given directly by its parts.
///
/// Useful where the host has already been extracted, including hosts a URL parser would refuse,
/// such as the empty host of `http:///` or the bare `.` of `http://./`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUri {
    scheme: String,
    host: String,
    path: String,
}

impl RequestUri {
    /// Create a URI for the root path of a host.
    pub fn new(scheme: &str, host: &str) -> RequestUri {
        RequestUri::with_path(scheme, host, "/")
    }

    /// Create a URI for a path on a host.
    pub fn with_path(scheme: &str, host: &str, path: &str) -> RequestUri {
        RequestUri {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_owned(),
            path: path.to_owned(),
        }
    }
}

impl CookieUri for RequestUri {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn ascii_host(&self) -> &str {
        if self.scheme == FILE_SCHEME {
            ""
        } else {
            &self.host
        }
    }

    fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn url_hosts() {
        let url = Url::parse("http://baz.com/a/b").unwrap();
        assert_eq!(url.ascii_host(), "baz.com");
        assert_eq!(CookieUri::path(&url), "/a/b");
        assert!(!url.is_secure());

        let url = Url::parse("https://baz.com./").unwrap();
        assert_eq!(url.ascii_host(), "baz.com.");
        assert!(url.is_secure());

        let url = Url::parse("http://192.168.0.1/").unwrap();
        assert_eq!(url.ascii_host(), "192.168.0.1");
    }

    #[test]
    fn file_urls_have_no_host() {
        for raw in &["file:///", "file://foo.bar/"] {
            let url = Url::parse(raw).unwrap();
            assert_eq!(url.ascii_host(), "");
        }
    }

    #[test]
    fn request_uri_parts() {
        let uri = RequestUri::new("HTTP", ".");
        assert_eq!(uri.scheme(), "http");
        assert_eq!(uri.ascii_host(), ".");
        assert_eq!(uri.path(), "/");

        let uri = RequestUri::new("file", "foo.bar");
        assert_eq!(uri.ascii_host(), "");
    }
}
