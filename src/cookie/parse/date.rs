//! Dates in Cookies have their own parsing rules.
//!
//! ```text
//! cookie-date     = *delimiter date-token-list *delimiter
//! date-token-list = date-token *( 1*delimiter date-token )
//! date-token      = 1*non-delimiter
//!
//! delimiter       = %x09 / %x20-2F / %x3B-40 / %x5B-60 / %x7B-7E
//! non-delimiter   = %x00-08 / %x0A-1F / DIGIT / ":" / ALPHA / %x7F-FF
//! non-digit       = %x00-2F / %x3A-FF
//!
//! day-of-month    = 1*2DIGIT ( non-digit *OCTET )
//! month           = ( "jan" / "feb" / "mar" / "apr" /
//!                     "may" / "jun" / "jul" / "aug" /
//!                     "sep" / "oct" / "nov" / "dec" ) *OCTET
//! year            = 2*4DIGIT ( non-digit *OCTET )
//! time            = hms-time ( non-digit *OCTET )
//! hms-time        = time-field ":" time-field ":" time-field
//! time-field      = 1*2DIGIT
//! ```

use std::convert::TryFrom;

use time::{Date as CalendarDate, Month, OffsetDateTime, PrimitiveDateTime, Time};

use super::*;

/// Is a date delimiter.
///
/// ```text
/// delimiter = %x09 / %x20-2F / %x3B-40 / %x5B-60 / %x7B-7E
/// ```
fn is_delimiter(byte: u8) -> bool {
    byte == 0x09
        || byte >= 0x20 && byte <= 0x2F
        || byte >= 0x3B && byte <= 0x40
        || byte >= 0x5B && byte <= 0x60
        || byte >= 0x7B && byte <= 0x7E
}

/// Split a run of leading digits of acceptable length from a token.
///
/// The digits must be followed by the end of the token or a non-digit.
fn decode_digits(token: &[u8], min: usize, max: usize) -> Option<(u32, &[u8])> {
    let len = token.iter().take_while(|byte| byte.is_ascii_digit()).count();
    if len < min || len > max {
        return None;
    }

    let value = token[..len]
        .iter()
        .fold(0, |value, digit| value * 10 + u32::from(digit - b'0'));
    Some((value, &token[len..]))
}

/// Consume the `:` between time fields.
fn time_separator(remaining: &[u8]) -> Option<&[u8]> {
    if remaining.first() == Some(&b':') {
        Some(&remaining[1..])
    } else {
        None
    }
}

/// Attempt to decode a time token.
fn decode_time(token: &[u8]) -> Option<(u8, u8, u8)> {
    let (hour, remaining) = decode_digits(token, 1, 2)?;
    let (minute, remaining) = decode_digits(time_separator(remaining)?, 1, 2)?;
    let (second, _) = decode_digits(time_separator(remaining)?, 1, 2)?;
    Some((hour as u8, minute as u8, second as u8))
}

/// Attempt to decode a day of month field.
fn decode_day(token: &[u8]) -> Option<u8> {
    decode_digits(token, 1, 2).map(|(day, _)| day as u8)
}

/// Attempt to decode a month by abbreviated name case insensitively.
fn decode_month(token: &[u8]) -> Option<Month> {
    let months: &[&[u8; 3]] = &[
        b"jan", b"feb", b"mar", b"apr", b"may", b"jun",
        b"jul", b"aug", b"sep", b"oct", b"nov", b"dec",
    ];

    if token.len() < 3 {
        return None;
    }

    months
        .iter()
        .position(|month| token[..3].eq_ignore_ascii_case(&month[..]))
        .and_then(|index| Month::try_from(index as u8 + 1).ok())
}

/// Attempt to decode a year as a 2-4 digit value.
fn decode_year(token: &[u8]) -> Option<i32> {
    decode_digits(token, 2, 4).map(|(year, _)| {
        // Uplift 2-digit years.
        match year {
            0..=69 => year as i32 + 2000,
            70..=99 => year as i32 + 1900,
            _ => year as i32,
        }
    })
}

/// Parse a cookie-date string into an actual datetime.
pub fn parse(source: &[u8]) -> Result<OffsetDateTime> {
    let mut date = Date::unset();
    date.gather(source);
    date.into_time()
}

/// Partial representation of a date.
struct Date {
    time: Option<(u8, u8, u8)>,
    day: Option<u8>,
    month: Option<Month>,
    year: Option<i32>,
}

impl Date {
    /// The unset date.
    fn unset() -> Date {
        Date {
            time: None,
            day: None,
            month: None,
            year: None,
        }
    }

    /// Gather the raw values from the tokens.
    fn gather(&mut self, source: &[u8]) {
        for token in DateIter::new(source) {
            let _ = Date::try_replace(token, &mut self.time, decode_time)
                || Date::try_replace(token, &mut self.day, decode_day)
                || Date::try_replace(token, &mut self.month, decode_month)
                || Date::try_replace(token, &mut self.year, decode_year);
        }
    }

    /// Convert to a time.
    fn into_time(self) -> Result<OffsetDateTime> {
        match (self.time, self.day, self.month, self.year) {
            (Some((hour, minute, second)), Some(day), Some(month), Some(year)) => {
                ensure!(
                    day >= 1 && day <= 31 && year >= 1601,
                    ErrorKind::InvalidDate
                );
                ensure!(
                    hour <= 23 && minute <= 59 && second <= 59,
                    ErrorKind::InvalidDate
                );

                let date = CalendarDate::from_calendar_date(year, month, day)?;
                let time = Time::from_hms(hour, minute, second)?;
                Ok(PrimitiveDateTime::new(date, time).assume_utc())
            }
            _ => bail!(ErrorKind::IncompleteDate),
        }
    }

    /// Try and replace a given field of the date.
    fn try_replace<T, F>(token: &[u8], field: &mut Option<T>, decode: F) -> bool
    where
        F: Fn(&[u8]) -> Option<T>,
    {
        if field.is_some() {
            return false;
        }
        *field = decode(token);
        field.is_some()
    }
}

/// Iterator over a list of date tokens.
struct DateIter<'s> {
    remaining: &'s [u8],
}

impl<'s> DateIter<'s> {
    fn new(source: &'s [u8]) -> DateIter<'s> {
        DateIter { remaining: source }
    }
}

impl<'s> Iterator for DateIter<'s> {
    type Item = &'s [u8];

    fn next(&mut self) -> Option<&'s [u8]> {
        // Remove leading delimiters
        let start = self.remaining
            .iter()
            .position(|&byte| !is_delimiter(byte))?;
        let remaining = &self.remaining[start..];

        let len = remaining
            .iter()
            .position(|&byte| is_delimiter(byte))
            .unwrap_or(remaining.len());
        self.remaining = &remaining[len..];

        Some(&remaining[..len])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn timestamp(source: &str) -> i64 {
        parse(source.as_bytes()).unwrap().unix_timestamp()
    }

    #[test]
    fn date_parse() {
        let tests = &[
            ("Sun, 06 Nov 1994 08:49:37 GMT", 784_111_777),
            ("Sunday, 06-Nov-94 08:49:37 GMT", 784_111_777),
            ("Wed, 21 Oct 2015 07:28:00 GMT", 1_445_412_480),
            (
                "I do delcare that this cookie doth expire on the 14th day of January. \
                 On that day it shall entirely expire when the clock reads 12:52:13. \
                 It shall not exist beyong the 32nd year of the 21st century",
                1_957_697_533,
            ),
        ];

        for &(source, expected) in tests {
            assert_eq!(timestamp(source), expected);
        }
    }

    #[test]
    fn incomplete_dates() {
        assert!(parse(b"").is_err());
        assert!(parse(b"Wed, 21 Oct 2015").is_err());
        assert!(parse(b"21 Oct 07:28:00").is_err());
    }

    #[test]
    fn invalid_dates() {
        assert!(parse(b"Sat, 30 Feb 2016 07:28:00 GMT").is_err());
        assert!(parse(b"Wed, 21 Oct 2015 24:28:00 GMT").is_err());
        assert!(parse(b"Wed, 21 Oct 1600 07:28:00 GMT").is_err());
    }

    #[test]
    fn tokens_skip_delimiters() {
        let tokens: Vec<&[u8]> = DateIter::new(b"  Wed,, 21-Oct ").collect();
        assert_eq!(tokens, vec![&b"Wed"[..], &b"21"[..], &b"Oct"[..]]);
    }
}
