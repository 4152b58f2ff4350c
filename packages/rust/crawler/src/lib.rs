//! Cached page fetching and HTML querying for docreport.
//!
//! [`CachedClient`] issues sequential GET requests through the on-disk
//! response cache; [`load_document`] turns a fetched body into a navigable
//! tree, failing fast when there is nothing to parse. The [`html`] module is
//! the first-match query layer the report generators are built on.

pub mod client;
pub mod html;

pub use client::{CachedClient, load_document};
