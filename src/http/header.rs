use std::fmt;

/// Well-known header names.
///
/// Headers are stored by their plain name, so a `Header` is only a typo-proof
/// way of spelling one. Anything not listed here is still usable as a string.
///
/// ```
/// # use webengine::http::header::Header;
/// assert_eq!(Header::ContentLength.as_str(), "Content-Length");
/// assert_eq!(Header::from_name("Content-Type"), Some(Header::ContentType));
/// assert_eq!(Header::from_name("content-type"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Header {
    Accept,
    AcceptCharset,
    AcceptEncoding,
    AcceptLanguage,
    Allow,
    Authorization,
    CacheControl,
    Connection,
    ContentEncoding,
    ContentLanguage,
    ContentLength,
    ContentLocation,
    ContentType,
    Cookie,
    Date,
    ETag,
    Expires,
    Host,
    IfModifiedSince,
    IfNoneMatch,
    LastModified,
    Location,
    Pragma,
    Referer,
    Server,
    SetCookie,
    TransferEncoding,
    UserAgent,
    WwwAuthenticate,
}

macro_rules! header_names {
    ($( $variant:ident => $name:literal, )+) => {
        impl Header {
            /// The name as it goes on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Header::$variant => $name, )+
                }
            }

            /// Looks up a header by its exact, case-sensitive name.
            pub fn from_name(name: &str) -> Option<Header> {
                match name {
                    $( $name => Some(Header::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

header_names! {
    Accept => "Accept",
    AcceptCharset => "Accept-Charset",
    AcceptEncoding => "Accept-Encoding",
    AcceptLanguage => "Accept-Language",
    Allow => "Allow",
    Authorization => "Authorization",
    CacheControl => "Cache-Control",
    Connection => "Connection",
    ContentEncoding => "Content-Encoding",
    ContentLanguage => "Content-Language",
    ContentLength => "Content-Length",
    ContentLocation => "Content-Location",
    ContentType => "Content-Type",
    Cookie => "Cookie",
    Date => "Date",
    ETag => "ETag",
    Expires => "Expires",
    Host => "Host",
    IfModifiedSince => "If-Modified-Since",
    IfNoneMatch => "If-None-Match",
    LastModified => "Last-Modified",
    Location => "Location",
    Pragma => "Pragma",
    Referer => "Referer",
    Server => "Server",
    SetCookie => "Set-Cookie",
    TransferEncoding => "Transfer-Encoding",
    UserAgent => "User-Agent",
    WwwAuthenticate => "WWW-Authenticate",
}

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Header> for String {
    fn from(header: Header) -> Self {
        header.as_str().to_string()
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
