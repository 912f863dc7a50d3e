//! HTTP protocol implementation.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection buffering, drain loop and response sequencing
//! - **`decoder`**: incremental request-line framing across readiness events
//! - **`parser`**: splits a request line into method and target
//! - **`request`**: method and request-line types
//! - **`percent`**: percent-decoding of targets, encoding of listing links
//! - **`resolve`**: maps targets onto the document root without escaping it
//! - **`handler`**: chooses file, listing or not-found response
//! - **`response`**: status codes and the response head
//! - **`writer`**: streams a response to a non-blocking socket
//! - **`listing`**: HTML directory listings
//! - **`mime`**: Content-Type detection based on file extensions
//!
//! # Request flow
//!
//! ```text
//!   readable event
//!        │ drain socket until would-block
//!        ▼
//!   RequestDecoder ── request line ──▶ parse_request_line
//!                                           │
//!                                           ▼
//!                     DocumentRoot::resolve (percent-decode, normalize)
//!                                           │
//!                                           ▼
//!                     FileService::respond ──▶ ResponseWriter
//!                                           │ would-block → wait for writable
//!                                           ▼
//!                                        socket
//! ```

pub mod connection;
pub mod decoder;
pub mod handler;
pub mod listing;
pub mod mime;
pub mod parser;
pub mod percent;
pub mod request;
pub mod resolve;
pub mod response;
pub mod writer;
