//! Places Lead Generation API Library
//!
//! This library turns a business category and a city into a stream of
//! leads (name, phone, website, address, map link) by querying the Google
//! Places API, paging through results, deduplicating places and fetching
//! their details.
//!
//! # Modules
//!
//! - `api`: HTTP router.
//! - `catalog`: Category catalog and query expansion.
//! - `config`: Configuration management.
//! - `enrichment`: Lead pipeline (run orchestration and progress).
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `paginator`: Cursor pagination with run-wide deduplication.
//! - `services`: Places API client and the search/detail seams.

pub mod api;
pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod paginator;
pub mod services;
