//! b2-http: reqwest transport for the b2 client
//!
//! This crate provides the implementation of the `Transport` trait from
//! b2-core using reqwest. It is the only crate that depends on an HTTP client.

pub mod transport;

pub use transport::ReqwestTransport;
