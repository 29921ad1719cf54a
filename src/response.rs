use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE};

use crate::{Result, TgBotError};

/// Backend-agnostic view over a completed HTTP exchange.
///
/// Header lookup is case-insensitive. The body is kept as raw bytes and decoded
/// on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Builds a response from a status code and a text body, without headers.
    pub fn from_text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, HeaderMap::new(), body.into().into_bytes())
    }

    /// Adds a header, ignoring names or values that are not valid HTTP.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of a header as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Decodes the body using the charset from `Content-Type`, falling back to
    /// lossy UTF-8.
    pub fn text(&self) -> String {
        self.charset()
            .and_then(|charset| self.text_with_charset(charset).ok())
            .unwrap_or_else(|| String::from_utf8_lossy(&self.body).into_owned())
    }

    /// Decodes the body with an explicit charset label such as `"iso-8859-1"`.
    pub fn text_with_charset(&self, charset: &str) -> Result<String> {
        let encoding = encoding_rs::Encoding::for_label(charset.trim().as_bytes())
            .ok_or_else(|| TgBotError::Decode(format!("unknown charset '{charset}'")))?;
        let (text, _, _) = encoding.decode(&self.body);
        Ok(text.into_owned())
    }

    /// Every `Set-Cookie` header value, in arrival order.
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    fn charset(&self) -> Option<&str> {
        let content_type = self.headers.get(CONTENT_TYPE)?.to_str().ok()?;
        content_type.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Response;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = Response::from_text(200, "ok").with_header("X-Request-Id", "abc");
        assert_eq!(response.header("x-request-id"), Some("abc"));
        assert_eq!(response.header("X-REQUEST-ID"), Some("abc"));
    }

    #[test]
    fn collects_every_set_cookie_value() {
        let response = Response::from_text(200, "")
            .with_header("Set-Cookie", "a=1")
            .with_header("set-cookie", "b=2");
        assert_eq!(response.set_cookies(), vec!["a=1", "b=2"]);
    }

    #[test]
    fn parses_content_length() {
        let response = Response::from_text(200, "").with_header("content-length", "42");
        assert_eq!(response.content_length(), Some(42));
        assert_eq!(Response::from_text(200, "").content_length(), None);
    }

    #[test]
    fn text_honors_content_type_charset() {
        let response = Response::new(200, Default::default(), vec![0x63, 0x61, 0x66, 0xE9])
            .with_header("Content-Type", "text/plain; charset=ISO-8859-1");
        assert_eq!(response.text(), "café");
    }

    #[test]
    fn text_with_unknown_charset_is_an_error() {
        let response = Response::from_text(200, "hi");
        assert!(response.text_with_charset("not-a-charset").is_err());
        assert_eq!(response.text_with_charset("utf-8").expect("utf-8"), "hi");
    }

    #[test]
    fn clones_are_structurally_identical() {
        let response = Response::from_text(200, "{\"ok\":true}").with_header("a", "b");
        assert_eq!(response.clone(), response);
    }
}
