//! `application/x-www-form-urlencoded` bodies for credentialed requests

/// Reserved form field carrying the anti-forgery token
pub const CSRF_FIELD: &str = "_csrf";

/// Header asking the server for structured data instead of a redirect
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Percent-encode every key and value and join the pairs with `&`,
/// keeping field order.
pub fn encode_form<K, V>(fields: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key.as_ref()),
                urlencoding::encode(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append the CSRF token, replacing any caller-supplied `_csrf` field
pub fn with_csrf_token(mut fields: Vec<(String, String)>, token: String) -> Vec<(String, String)> {
    fields.retain(|(key, _)| key != CSRF_FIELD);
    fields.push((CSRF_FIELD.to_string(), token));
    fields
}
