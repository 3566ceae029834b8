use std::fmt;

/// HTTP status code.
///
/// Wraps the numeric code so that any value can be carried, while the named
/// constants cover the fixed status table. Codes outside the table serialize
/// with an empty reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

macro_rules! status_table {
    ($( $name:ident = $code:literal, $phrase:literal; )+) => {
        impl StatusCode {
            $(
                #[doc = concat!(stringify!($code), " ", $phrase)]
                pub const $name: StatusCode = StatusCode($code);
            )+
        }

        /// Returns the reason phrase for `code`, or `""` when the code is
        /// not in the table.
        ///
        /// ```
        /// # use webengine::http::status::reason_phrase;
        /// assert_eq!(reason_phrase(404), "Not Found");
        /// assert_eq!(reason_phrase(299), "");
        /// ```
        pub fn reason_phrase(code: u16) -> &'static str {
            match code {
                $( $code => $phrase, )+
                _ => "",
            }
        }
    };
}

status_table! {
    CONTINUE = 100, "Continue";
    SWITCHING_PROTOCOLS = 101, "Switching Protocols";

    OK = 200, "Ok";
    CREATED = 201, "Created";
    ACCEPTED = 202, "Accepted";
    NON_AUTHORITATIVE_INFORMATION = 203, "Non-Authoritative Information";
    NO_CONTENT = 204, "No Content";
    RESET_CONTENT = 205, "Reset Content";
    PARTIAL_CONTENT = 206, "Partial Content";

    MULTIPLE_CHOICES = 300, "Multiple Choices";
    MOVED_PERMANENTLY = 301, "Moved Permanently";
    FOUND = 302, "Found";
    SEE_OTHER = 303, "See Other";
    NOT_MODIFIED = 304, "Not Modified";
    USE_PROXY = 305, "Use Proxy";
    UNUSED = 306, "Unused";
    TEMPORARY_REDIRECT = 307, "Temporary Redirect";

    BAD_REQUEST = 400, "Bad Request";
    UNAUTHORIZED = 401, "Unauthorized";
    PAYMENT_REQUIRED = 402, "Payment Required";
    FORBIDDEN = 403, "Forbidden";
    NOT_FOUND = 404, "Not Found";
    METHOD_NOT_ALLOWED = 405, "Method Not Allowed";
    NOT_ACCEPTABLE = 406, "Not Acceptable";
    PROXY_AUTHENTICATION_REQUIRED = 407, "Proxy Authentication Required";
    REQUEST_TIMEOUT = 408, "Request Time-out";
    CONFLICT = 409, "Conflict";
    GONE = 410, "Gone";
    LENGTH_REQUIRED = 411, "Length Required";
    PRECONDITION_FAILED = 412, "Precondition Failed";
    REQUEST_ENTITY_TOO_LARGE = 413, "Request Entity Too Large";
    REQUEST_URI_TOO_LONG = 414, "Request-URI Too Long";
    UNSUPPORTED_MEDIA_TYPE = 415, "Unsupported Media Type";
    REQUESTED_RANGE_NOT_SATISFIABLE = 416, "Requested range not satisfiable";
    EXPECTATION_FAILED = 417, "Expectation Failed";

    INTERNAL_SERVER_ERROR = 500, "Internal Server Error";
    NOT_IMPLEMENTED = 501, "Not Implemented";
    BAD_GATEWAY = 502, "Bad Gateway";
    SERVICE_UNAVAILABLE = 503, "Service Unavailable";
    GATEWAY_TIMEOUT = 504, "Gateway Time-out";
    HTTP_VERSION_NOT_SUPPORTED = 505, "HTTP Version not supported";
}

impl StatusCode {
    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use webengine::http::status::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    /// ```
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    pub fn reason_phrase(&self) -> &'static str {
        reason_phrase(self.0)
    }

    /// Whether the code appears in the status table.
    pub fn is_known(&self) -> bool {
        !self.reason_phrase().is_empty()
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason_phrase() {
            "" => write!(f, "{}", self.0),
            phrase => write!(f, "{} {}", self.0, phrase),
        }
    }
}
