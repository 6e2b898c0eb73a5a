//! A cookie store keyed by canonical host.
//!
//! Cookies are parsed following [RFC 6265][rfc6265] and filed under a single canonical storage
//! host. The host of a request is canonicalized, any `domain` attribute is reconciled against it by exact identity, and the
//! resulting [`CanonicalHost`](host/struct.CanonicalHost.html) is the only key the
//! [`Jar`](jar/struct.Jar.html) ever sees. Lookups are then plain equality tests.
//!
//! The [`CookieService`](service/struct.CookieService.html) ties the pieces together and exposes
//! both the `Set-Cookie`/`Cookie` header surface and the host-keyed management API.
//!
//! [rfc6265]: https://tools.ietf.org/html/rfc6265

#![deny(missing_docs)]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;
extern crate time;
extern crate url;

pub mod cookie;
pub mod error;
pub mod host;
pub mod jar;
pub mod service;
pub mod uri;

pub use cookie::Cookie;
pub use host::CanonicalHost;
pub use jar::{Clock, Jar};
pub use service::CookieService;
pub use uri::{CookieUri, RequestUri};
