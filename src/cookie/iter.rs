//! Iterators that produce cookies.

use std::str::Lines;

use super::SetCookie;
use error::*;

/// An iterator over the `Set-Cookie` directives in a block of header text.
///
/// Directives are separated by newlines; blank lines are skipped.
#[derive(Debug, Clone)]
pub struct SetCookieIter<'s> {
    /// The remaining lines of header text.
    source: Lines<'s>,
}

impl<'s> SetCookieIter<'s> {
    /// Create a new iterator over header text.
    pub fn new(header: &'s str) -> SetCookieIter<'s> {
        SetCookieIter {
            source: header.lines(),
        }
    }
}

impl<'s> Iterator for SetCookieIter<'s> {
    type Item = Result<SetCookie>;

    fn next(&mut self) -> Option<Result<SetCookie>> {
        loop {
            let line = self.source.next()?;
            if !line.trim().is_empty() {
                return Some(SetCookie::parse(line));
            }
        }
    }
}
