use std::{fmt, time::Duration};

use crate::Payload;

/// HTTP method of a [`FetchOptions`] request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Per-call request shape handed to a [`Transport`](crate::Transport).
///
/// Options are never mutated by the retry engine; each attempt derives its own
/// copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub method: Method,
    /// Appended to the URL verbatim as `key=value` pairs, without escaping.
    pub params: Option<Vec<(String, String)>>,
    pub payload: Option<Payload>,
    pub headers: Option<Vec<(String, String)>>,
    pub content_type: Option<String>,
    pub follow_redirects: bool,
    /// When set, the transport returns a [`Response`](crate::Response) for every
    /// status code instead of failing on `>= 400`.
    pub mute_http_exceptions: bool,
    /// Bounds this request. Overrides any timeout the transport was built with.
    pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::Get,
            params: None,
            payload: None,
            headers: None,
            content_type: None,
            follow_redirects: true,
            mute_http_exceptions: false,
            timeout: None,
        }
    }
}

impl FetchOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params = Some(
            params
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn mute_http_exceptions(mut self, mute: bool) -> Self {
        self.mute_http_exceptions = mute;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the final request URL with `params` appended.
    pub fn url_for(&self, url: &str) -> String {
        match &self.params {
            Some(params) => append_query(url, params),
            None => url.to_owned(),
        }
    }
}

/// Joins pairs as `key=value` with `&`. Values are not escaped.
pub fn query_string<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key.as_ref(), value.as_ref()))
        .collect::<Vec<_>>()
        .join("&")
}

/// Appends a query string, using `&` when the URL already has a `?`.
///
/// Example: `("https://x/y", [("a", "1")])` → `"https://x/y?a=1"`
pub fn append_query<K, V>(url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let query = query_string(params);
    if url.contains('?') {
        format!("{url}&{query}")
    } else {
        format!("{url}?{query}")
    }
}
