//! HTTP protocol implementation.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`parser`**: Turns an accumulation buffer into a [`request::Request`] and decides completeness
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation, mutated in place by resources
//! - **`status`**: Status code table and reason phrases
//! - **`header`**: Typed names for well-known headers
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`resource`**: The `Resource` capability plus byte-buffer and file resources
//! - **`router`**: `WebEngine`, the path registry that dispatches requests
//! - **`connection`**: Per-socket buffer, idle timeout and typed read events
//!
//! # Pipeline
//!
//! ```text
//!   bytes ──► parser::assemble ──► Request ──► WebEngine::route ──► Response
//!                                                    │
//!                                        Resource::deliver(&Request, &mut Response)
//!                                                    │
//!   socket ◄── ResponseWriter ◄── writer::serialize_response ◄──────┘
//! ```
//!
//! # Example
//!
//! ```
//! use webengine::http::parser::parse_request;
//! use webengine::http::resource::ByteArrayResource;
//! use webengine::http::router::WebEngine;
//! use webengine::http::writer::serialize_response;
//! use webengine::log::Logger;
//!
//! let logger = Logger::tracing("example");
//! let mut engine = WebEngine::new(logger.clone());
//! engine.add_resource(ByteArrayResource::new("/", "Hello world"));
//!
//! let request = parse_request(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n", &logger);
//! let response = engine.route(&request);
//! assert!(serialize_response(&response).ends_with(b"Hello world"));
//! ```

pub mod connection;
pub mod header;
pub mod parser;
pub mod request;
pub mod resource;
pub mod response;
pub mod router;
pub mod status;
pub mod writer;
