//! Errors produced by the cookie store.

#![allow(missing_docs)]

error_chain!{
    // Links to other error chains.
    links {
        CookieParse(parser::Error, parser::ErrorKind);
    }

    // Internal error forms.
    errors {
        InvalidHost(host: String) {
            description("The host is not a legal storage key"),
            display("illegal host value: {:?}", host),
        }
        MissingHost {
            description("A cookie cannot be built without a host"),
        }
    }
}

/// Errors specific to parsing a `Set-Cookie` directive.
pub mod parser {
    error_chain!{
        foreign_links {
            Utf8(::std::str::Utf8Error);
            ParseInt(::std::num::ParseIntError);
            Time(::time::error::ComponentRange);
        }

        errors {
            NotEnoughBytes {
                description("Not enough bytes were present to form a fragment of the cookie"),
            }
            MissingQuote {
                description("The trailing quote to a quoted section was not present"),
            }
            MissingDelimiter {
                description("A delimiter was missing in the cookie string"),
            }
            InvalidByte {
                description("The cookie string contained an invalid byte"),
            }
            IncompleteDate {
                description("The provided date was incomplete"),
            }
            InvalidDate {
                description("The date provided was invalid"),
            }
        }
    }
}
