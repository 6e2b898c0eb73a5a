//! A cookie jar.
//!
//! The jar owns every stored cookie, bucketed by the canonical host the cookie was filed under.
//! The buckets are the only copy of the cookies: per-host queries read one bucket, and whole-jar
//! enumeration merges the buckets back into insertion order.
//!
//! The jar never decides which host a cookie belongs to. Hosts arrive already canonicalized and
//! resolved, so every lookup is an exact match on the key.
//!
//! Expiry is evaluated against an injected [`Clock`](trait.Clock.html) whenever the jar is read.
//! Expired cookies are never reported, and are dropped the next time the jar is modified.

use std::collections::HashMap;

use time::OffsetDateTime;

use cookie::Cookie;
use host::CanonicalHost;

/// Something that produces the current UTC time.
pub trait Clock {

    /// Get the current UTC time.
    fn now(&self) -> OffsetDateTime;
}

/// A function that produces the current time in UTC.
pub type ClockFn = fn() -> OffsetDateTime;

impl Clock for ClockFn {
    fn now(&self) -> OffsetDateTime {
        self()
    }
}

/// A fixed point in time is a clock that never moves.
impl Clock for OffsetDateTime {
    fn now(&self) -> OffsetDateTime {
        *self
    }
}

/// A cookie and its position in the insertion order of the jar.
#[derive(Debug, Clone)]
struct Entry {
    sequence: u64,
    cookie: Cookie,
}

/// A jar containing the cookies seen so far.
#[derive(Debug)]
pub struct Jar<T: Clock> {
    clock: T,
    hosts: HashMap<CanonicalHost, Vec<Entry>>,
    next_sequence: u64,
    last_creation_time: i64,
}

impl Default for Jar<ClockFn> {
    fn default() -> Jar<ClockFn> {
        Jar::with_clock(OffsetDateTime::now_utc as ClockFn)
    }
}

impl Jar<ClockFn> {
    /// Create a new empty jar on the system clock.
    pub fn new() -> Jar<ClockFn> {
        Default::default()
    }
}

impl<T: Clock> Jar<T> {
    /// Create a jar with a specific time source.
    pub fn with_clock(clock: T) -> Jar<T> {
        Jar {
            clock: clock,
            hosts: Default::default(),
            next_sequence: 0,
            last_creation_time: ::std::i64::MIN,
        }
    }

    /// Get the clock of the jar.
    pub fn clock(&self) -> &T {
        &self.clock
    }

    /// Get mutable access to the clock of the jar.
    pub fn clock_mut(&mut self) -> &mut T {
        &mut self.clock
    }

    /// Get the current time from the clock.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// The current time in UNIX seconds, which expiry is compared against.
    fn now_seconds(&self) -> i64 {
        self.clock.now().unix_timestamp()
    }

    /// Get a creation time strictly later than any handed out before.
    fn next_creation_time(&mut self) -> i64 {
        let micros = (self.clock.now().unix_timestamp_nanos() / 1_000) as i64;
        let creation_time = if micros > self.last_creation_time {
            micros
        } else {
            self.last_creation_time + 1
        };
        self.last_creation_time = creation_time;
        creation_time
    }

    /// Add a cookie to the jar.
    ///
    /// A cookie with the same host, name and path is replaced where it stands, keeping its
    /// position in the insertion order. The stored cookie is given a fresh creation time either
    /// way. Returns the cookie that was replaced.
    pub fn add_cookie(&mut self, mut cookie: Cookie) -> Option<Cookie> {
        self.purge_expired();

        let creation_time = self.next_creation_time();
        cookie.set_creation_time(creation_time);

        let bucket = self.hosts
            .entry(cookie.host().clone())
            .or_insert_with(Vec::new);

        if let Some(entry) = bucket.iter_mut().find(|entry| entry.cookie.same_identity(&cookie)) {
            debug!(
                "replacing cookie {:?} for host {:?} path {:?}",
                cookie.name(),
                cookie.host().as_str(),
                cookie.path()
            );
            return Some(::std::mem::replace(&mut entry.cookie, cookie));
        }

        debug!(
            "adding cookie {:?} for host {:?} path {:?}",
            cookie.name(),
            cookie.host().as_str(),
            cookie.path()
        );
        bucket.push(Entry {
            sequence: self.next_sequence,
            cookie: cookie,
        });
        self.next_sequence += 1;
        None
    }

    /// Remove the cookie identified by a host, name and path.
    ///
    /// Removing a cookie that is not present does nothing.
    pub fn remove_cookie(&mut self, host: &CanonicalHost, name: &str, path: &str) -> Option<Cookie> {
        self.purge_expired();

        let removed = {
            let bucket = self.hosts.get_mut(host)?;
            let position = bucket
                .iter()
                .position(|entry| entry.cookie.is_identified_by(host, name, path))?;
            bucket.remove(position).cookie
        };

        if self.hosts.get(host).map_or(false, Vec::is_empty) {
            self.hosts.remove(host);
        }

        debug!("removed cookie {:?} for host {:?} path {:?}", name, host.as_str(), path);
        Some(removed)
    }

    /// Remove every cookie.
    pub fn clear(&mut self) {
        debug!("clearing {} hosts", self.hosts.len());
        self.hosts.clear();
    }

    /// Drop every expired cookie, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.now_seconds();
        let mut purged = 0;

        self.hosts.retain(|_, bucket| {
            let before = bucket.len();
            bucket.retain(|entry| !entry.cookie.is_expired(now));
            purged += before - bucket.len();
            !bucket.is_empty()
        });

        if purged > 0 {
            debug!("purged {} expired cookies", purged);
        }
        purged
    }

    /// Get the live cookies filed under exactly the given host, in insertion order.
    pub fn host_cookies<'j>(&'j self, host: &str) -> impl Iterator<Item = &'j Cookie> + 'j {
        let now = self.now_seconds();
        self.hosts
            .get(host)
            .into_iter()
            .flat_map(|bucket| bucket.iter())
            .map(|entry| &entry.cookie)
            .filter(move |cookie| !cookie.is_expired(now))
    }

    /// Count the live cookies filed under exactly the given host.
    pub fn count_from_host(&self, host: &CanonicalHost) -> usize {
        self.host_cookies(host).count()
    }

    /// Check if a live cookie with the given host, name and path exists.
    pub fn contains(&self, host: &CanonicalHost, name: &str, path: &str) -> bool {
        self.host_cookies(host)
            .any(|cookie| cookie.is_identified_by(host, name, path))
    }

    /// Get every live cookie in the order it was first added.
    pub fn cookies(&self) -> Vec<&Cookie> {
        let now = self.now_seconds();
        let mut entries: Vec<&Entry> = self.hosts
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter(|entry| !entry.cookie.is_expired(now))
            .collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries.into_iter().map(|entry| &entry.cookie).collect()
    }

    /// Count every live cookie.
    pub fn len(&self) -> usize {
        let now = self.now_seconds();
        self.hosts
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter(|entry| !entry.cookie.is_expired(now))
            .count()
    }

    /// Check if there are no live cookies.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
