use std::time::Duration;

use cookie::Cookie;
use http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, SET_COOKIE},
};
use time::OffsetDateTime;
use tracing::error;

/// Session cookie with the fixed attributes: `Path=/`, `HttpOnly`, `Secure`.
pub(crate) fn session_cookie(
    name: &str,
    value: impl Into<String>,
    expires: OffsetDateTime,
) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value.into()))
        .path("/")
        .http_only(true)
        .secure(true)
        .expires(expires)
        .build()
}

/// `now + offset`, saturating at the largest representable time.
pub(crate) fn expires_in(offset: Duration) -> OffsetDateTime {
    let offset = time::Duration::try_from(offset).unwrap_or(time::Duration::MAX);
    OffsetDateTime::now_utc().saturating_add(offset)
}

/// An expiry one hour in the past, which makes clients drop the cookie.
pub(crate) fn expired() -> OffsetDateTime {
    OffsetDateTime::now_utc() - time::Duration::hours(1)
}

pub(crate) fn append_set_cookie(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
    match HeaderValue::try_from(cookie.to_string()) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => error!(cookie = cookie.name(), error = %e, "cookie is not a valid header value"),
    }
}

/// Value of the first cookie called `name` across all `Cookie` headers.
pub(crate) fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}

/// Cookie names must be RFC 6265 tokens.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')'
                        | b'<'
                        | b'>'
                        | b'@'
                        | b','
                        | b';'
                        | b':'
                        | b'\\'
                        | b'"'
                        | b'/'
                        | b'['
                        | b']'
                        | b'?'
                        | b'='
                        | b'{'
                        | b'}'
                )
        })
}
