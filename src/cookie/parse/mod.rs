//! Parsing for a `Set-Cookie` string.

mod date;

use std::str::FromStr;
use time::{Duration, OffsetDateTime};

use error::parser::*;

/// Byte is a [RFC5234](https://tools.ietf.org/html/rfc5234) CTL character.
///
/// ```text
/// CTL =  %x00-1F / %x7F ; controls
/// ```
fn is_ctl(byte: u8) -> bool {
    byte <= 0x1F || byte == 0x7F
}

/// Byte is a [RFC2616](https://tools.ietf.org/html/rfc2616) separator.
///
/// ```text
/// separator = "(" | ")" | "<" | ">" | "@"
///           | "," | ";" | ":" | "\" | <">
///           | "/" | "[" | "]" | "?" | "="
///           | "{" | "}" | SP | HT
/// ```
fn is_separator(byte: u8) -> bool {
    match byte {
        b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/' | b'['
        | b']' | b'?' | b'=' | b'{' | b'}' | b' ' | b'\t' => true,
        _ => false,
    }
}

/// Byte is a [RFC2616](https://tools.ietf.org/html/rfc2616) token character.
fn is_token_octet(byte: u8) -> bool {
    !(is_ctl(byte) || is_separator(byte))
}

/// Byte may appear in a cookie value.
///
/// Servers routinely send values outside the strict RFC6265 `cookie-octet` set, so anything
/// that is not a control character or the attribute delimiter is accepted.
fn is_value_octet(byte: u8) -> bool {
    byte == b'\t' || !(is_ctl(byte) || byte == b';')
}

/// Linear whitespace around fragments.
fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Strip the surrounding quotes from a value, if it has been quoted.
fn maybe_quoted(text: &str) -> Result<Quotable> {
    if text.starts_with('"') {
        ensure!(
            text.len() >= 2 && text.ends_with('"'),
            ErrorKind::MissingQuote
        );
        Ok(Quotable::Quoted(&text[1..text.len() - 1]))
    } else {
        Ok(Quotable::Plain(text))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Quotable<'s> {
    Quoted(&'s str),
    Plain(&'s str),
}

/// Require that a string has a non-zero length.
fn non_zero_length(s: &str) -> Result<&str> {
    ensure!(!s.is_empty(), ErrorKind::NotEnoughBytes);
    Ok(s)
}

/// Split a cookie into its `name=value` pair and the remaining arguments.
fn split_cookie(source: &str) -> (&str, &str) {
    match source.find(';') {
        Some(end) => (&source[..end], &source[end..]),
        None => (source, ""),
    }
}

/// Process a cookie string into a pair and a set of arguments.
pub fn process_cookie(source: &str) -> Result<(Pair, ArgumentIter)> {
    let (cookie, arguments) = split_cookie(source);
    Ok((cookie.parse()?, ArgumentIter::new(arguments)))
}

/// A decoded cookie name=value pair.
///
/// A pair without a `=` has an empty name and is sent back as its bare value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pair {
    /// Formatted `name=value` pair.
    pair: String,
    /// The length of the name at the start of the cookie.
    name_len: usize,
    /// The start and end of the value of the cookie.
    value_location: (usize, usize),
}

impl Pair {
    /// Create a pair from a name and a value.
    pub fn new(name: &str, value: &str) -> Pair {
        if name.is_empty() {
            Pair {
                pair: value.to_owned(),
                name_len: 0,
                value_location: (0, value.len()),
            }
        } else {
            Pair {
                pair: format!("{}={}", name, value),
                name_len: name.len(),
                value_location: (name.len() + 1, name.len() + 1 + value.len()),
            }
        }
    }

    /// Get the name of the cookie.
    pub fn name(&self) -> &str {
        &self.pair[..self.name_len]
    }

    /// Get the value of a cookie.
    pub fn value(&self) -> &str {
        let (start, end) = self.value_location;
        &self.pair[start..end]
    }

    /// Get the (name, value) pair of a cookie.
    pub fn as_tuple(&self) -> (&str, &str) {
        (self.name(), self.value())
    }

    /// Get the formatted `name=value` pair string of a cookie.
    ///
    /// Preserves any quotation from the original cookie as read.
    pub fn as_str(&self) -> &str {
        &self.pair
    }
}

impl FromStr for Pair {
    type Err = Error;

    fn from_str(source: &str) -> Result<Pair> {
        let source = non_zero_length(source.trim_matches(is_whitespace))?;

        let (name, value) = match source.find('=') {
            Some(delimiter) => (
                source[..delimiter].trim_matches(is_whitespace),
                source[delimiter + 1..].trim_matches(is_whitespace),
            ),
            None => ("", source),
        };

        ensure!(name.bytes().all(is_token_octet), ErrorKind::InvalidByte);
        ensure!(value.bytes().all(is_value_octet), ErrorKind::InvalidByte);

        // The formatted pair keeps the quotes; the value excludes them.
        let mut pair = Pair::new(name, value);
        if let Quotable::Quoted(_) = maybe_quoted(value)? {
            let (start, end) = pair.value_location;
            pair.value_location = (start + 1, end - 1);
        }
        Ok(pair)
    }
}

/// Iterator over the attributes of a single cookie.
pub struct ArgumentIter<'s> {
    remaining: &'s str,
}

impl<'s> ArgumentIter<'s> {
    /// Create a new iterator over the attributes following the pair.
    pub fn new(source: &'s str) -> ArgumentIter<'s> {
        ArgumentIter { remaining: source }
    }

    /// Take the next argument from the list.
    fn next_argument(&mut self) -> Option<Result<Argument<'s>>> {
        loop {
            // No more arguments
            if self.remaining.is_empty() {
                return None;
            }

            // Remove the leading delimiter
            if self.remaining.starts_with(';') {
                self.remaining = &self.remaining[1..];
            }

            let (next, rest) = split_cookie(self.remaining);
            self.remaining = rest;

            let next = next.trim_matches(is_whitespace);
            if !next.is_empty() {
                return Some(Argument::decode(next));
            }
        }
    }
}

impl<'s> Iterator for ArgumentIter<'s> {
    type Item = Result<Argument<'s>>;

    fn next(&mut self) -> Option<Result<Argument<'s>>> {
        self.next_argument()
    }
}

/// Possible cookie attributes.
#[derive(Debug, PartialEq, Eq)]
pub enum Argument<'s> {
    Expires(OffsetDateTime),
    MaxAge(Duration),
    Domain(&'s str),
    Path(&'s str),
    Secure,
    HttpOnly,
    Extension(&'s str),
}

impl<'s> Argument<'s> {
    fn decode(fragment: &'s str) -> Result<Argument<'s>> {
        let (name, value) = match fragment.find('=') {
            Some(delimiter) => (
                fragment[..delimiter].trim_matches(is_whitespace),
                fragment[delimiter + 1..].trim_matches(is_whitespace),
            ),
            None => (fragment, ""),
        };

        if name.eq_ignore_ascii_case("expires") {
            Ok(Argument::Expires(date::parse(value.as_bytes())?))
        } else if name.eq_ignore_ascii_case("max-age") {
            let seconds: i64 = non_zero_length(value)?.parse()?;
            Ok(Argument::MaxAge(Duration::seconds(seconds)))
        } else if name.eq_ignore_ascii_case("domain") {
            Ok(Argument::Domain(value))
        } else if name.eq_ignore_ascii_case("path") {
            Ok(Argument::Path(value))
        } else if name.eq_ignore_ascii_case("secure") {
            Ok(Argument::Secure)
        } else if name.eq_ignore_ascii_case("httponly") {
            Ok(Argument::HttpOnly)
        } else {
            Ok(Argument::Extension(fragment))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn maybe_quoted() {
        let checks = &[
            ("ABBA", Quotable::Plain("ABBA")),
            ("\"ABBA\"", Quotable::Quoted("ABBA")),
        ];

        for &(text, ref expected) in checks {
            let quote = super::maybe_quoted(text).unwrap();
            assert_eq!(&quote, expected);
        }

        assert!(super::maybe_quoted("\"ABBA").is_err());
    }

    #[test]
    fn parse_pairs() {
        let pair: Pair = "key=value".parse().unwrap();
        assert_eq!(pair.as_tuple(), ("key", "value"));
        assert_eq!(pair.as_str(), "key=value");

        let pair: Pair = " key = value ".parse().unwrap();
        assert_eq!(pair.as_str(), "key=value");

        let pair: Pair = "key=\"quoted\"".parse().unwrap();
        assert_eq!(pair.value(), "quoted");
        assert_eq!(pair.as_str(), "key=\"quoted\"");

        let pair: Pair = "key=".parse().unwrap();
        assert_eq!(pair.as_tuple(), ("key", ""));

        let pair: Pair = "bare".parse().unwrap();
        assert_eq!(pair.as_tuple(), ("", "bare"));
        assert_eq!(pair.as_str(), "bare");

        assert!("".parse::<Pair>().is_err());
        assert!("bad key=value".parse::<Pair>().is_err());
    }

    #[test]
    fn fragment_iterator() {
        let (cookie, args) = process_cookie(
            "\
             some=thing; \
             fragment; \
             Domain=google.com; \
             Expires=Sun, 25 Feb 2018 01:36:48 GMT; \
             max-age=3200;; \
             other=fragment",
        ).unwrap();
        let args: Vec<Argument<'static>> = args.map(Result::unwrap).collect();
        let expected_args = vec![
            Argument::Extension("fragment"),
            Argument::Domain("google.com"),
            Argument::Expires(OffsetDateTime::from_unix_timestamp(1_519_522_608).unwrap()),
            Argument::MaxAge(Duration::seconds(3200)),
            Argument::Extension("other=fragment"),
        ];
        assert_eq!(cookie, Pair::new("some", "thing"));
        assert_eq!(args, expected_args);
    }

    #[test]
    fn empty_attribute_values() {
        let (_, args) = process_cookie("foo=bar; domain=; path").unwrap();
        let args: Vec<Argument<'static>> = args.map(Result::unwrap).collect();
        assert_eq!(args, vec![Argument::Domain(""), Argument::Path("")]);
    }

    #[test]
    fn malformed_max_age() {
        let (_, mut args) = process_cookie("foo=bar; Max-Age=").unwrap();
        assert!(args.next().unwrap().is_err());
        assert!(args.next().is_none());
    }
}
