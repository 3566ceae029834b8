use std::collections::HashMap;
use std::fmt;

use crate::http::header::Header;

/// HTTP request methods.
///
/// Matching against the wire token is case-sensitive. Anything outside the
/// fixed vocabulary becomes [`Method::UNKNOWN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// GET - Retrieve a resource
    #[default]
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// TRACE - Loop-back test
    TRACE,
    /// CONNECT - Tunnel request
    CONNECT,
    /// Token not in the vocabulary above
    UNKNOWN,
}

impl Method {
    /// Maps a request-line token onto a method.
    ///
    /// # Example
    ///
    /// ```
    /// # use webengine::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::UNKNOWN);
    /// ```
    pub fn from_token(token: &str) -> Self {
        match token {
            "OPTIONS" => Method::OPTIONS,
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "TRACE" => Method::TRACE,
            "CONNECT" => Method::CONNECT,
            _ => Method::UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::OPTIONS => "OPTIONS",
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::TRACE => "TRACE",
            Method::CONNECT => "CONNECT",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed HTTP request from a client.
///
/// When `valid` is false the request line could not be split into method,
/// target and version, and every other field is left at its default.
///
/// Header names are stored exactly as received and looked up
/// case-sensitively: `content-length` and `Content-Length` are different
/// headers here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request target up to the first `?`
    pub path: String,
    /// HTTP version token, verbatim (typically "HTTP/1.1")
    pub version: String,
    /// Request headers, last occurrence of a name wins
    pub headers: HashMap<String, String>,
    /// `name=value` pairs from the query string, not percent-decoded
    pub query_params: HashMap<String, String>,
    /// Query string decoded with form-urlencoded rules
    pub url_parameters: HashMap<String, String>,
    /// `name=value` pairs from the last body line of a POST
    pub post_params: HashMap<String, String>,
    /// Everything after the header block
    pub body: Vec<u8>,
    /// Whether the request line was well formed
    pub valid: bool,
}

/// Builder for constructing Request objects.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    query_params: HashMap<String, String>,
    post_params: HashMap<String, String>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    pub fn post_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post_params.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds a valid request. Fails only when method or path is missing.
    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            url_parameters: self.query_params.clone(),
            query_params: self.query_params,
            post_params: self.post_params,
            body: self.body,
            valid: true,
        })
    }
}

impl Request {
    /// An invalid request with every field at its default.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: impl AsRef<str>) -> Option<&str> {
        self.headers.get(key.as_ref()).map(|v| v.as_str())
    }

    /// The `Content-Length` header, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.header(Header::ContentLength)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Whether enough body bytes have arrived.
    ///
    /// With a numeric `Content-Length` the body must match it exactly.
    /// Without one (or with chunked transfer, which is not framed here) the
    /// request counts as complete once the header block has been seen.
    pub fn is_complete(&self) -> bool {
        match self.content_length() {
            Some(expected) => self.body.len() == expected,
            None => true,
        }
    }

    /// True when more body bytes arrived than `Content-Length` announced.
    /// Such a request can never become complete.
    pub fn body_overruns(&self) -> bool {
        self.content_length()
            .is_some_and(|expected| self.body.len() > expected)
    }
}
