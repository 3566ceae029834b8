//! Handlers plugged into the router.

use std::path::PathBuf;

use crate::http::header::Header;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::status::StatusCode;
use crate::log::Logger;

const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Something that can answer requests for one path.
///
/// `deliver` receives a response already set to `200` with an empty body
/// and fills in status, headers and body.
pub trait Resource: Send + Sync {
    /// The exact path this resource is registered under.
    fn unique_identifier(&self) -> &str;

    fn deliver(&self, request: &Request, response: &mut Response);
}

/// Answers a non-GET request with 405 and an `Allow: GET` header.
fn reject_method(response: &mut Response) {
    response.set_status(StatusCode::METHOD_NOT_ALLOWED);
    response.set_header(Header::Allow, "GET");
    response.set_body(Vec::new());
}

/// Serves a fixed byte buffer.
#[derive(Debug, Clone)]
pub struct ByteArrayResource {
    path: String,
    data: Vec<u8>,
    content_type: String,
}

impl ByteArrayResource {
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl Resource for ByteArrayResource {
    fn unique_identifier(&self) -> &str {
        &self.path
    }

    fn deliver(&self, request: &Request, response: &mut Response) {
        if request.method != Method::GET {
            reject_method(response);
            return;
        }

        response.set_header(Header::ContentType, self.content_type.as_str());
        response.set_header(Header::ContentLength, self.data.len().to_string());
        response.set_body(self.data.clone());
        response.set_status(StatusCode::OK);
    }
}

/// Serves the current contents of a file, read on every GET.
///
/// A file that cannot be read is answered with 403 and an empty body.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: String,
    file: PathBuf,
    content_type: String,
    logger: Logger,
}

impl FileResource {
    pub fn new(path: impl Into<String>, file: impl Into<PathBuf>, logger: Logger) -> Self {
        Self {
            path: path.into(),
            file: file.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            logger,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

impl Resource for FileResource {
    fn unique_identifier(&self) -> &str {
        &self.path
    }

    fn deliver(&self, request: &Request, response: &mut Response) {
        if request.method != Method::GET {
            reject_method(response);
            return;
        }

        match std::fs::read(&self.file) {
            Ok(data) => {
                response.set_header(Header::ContentType, self.content_type.as_str());
                response.set_header(Header::ContentLength, data.len().to_string());
                response.set_body(data);
                response.set_status(StatusCode::OK);
            }
            Err(e) => {
                self.logger.warning(format!(
                    "Cannot read {} for {}: {}",
                    self.file.display(),
                    self.path,
                    e
                ));
                response.set_body(Vec::new());
                response.set_status(StatusCode::FORBIDDEN);
            }
        }
    }
}
