//! Press Estimator library crate.
//!
//! This crate exposes the print-cost estimation engine, the rate
//! catalogs it reads from and the HTTP API components as reusable
//! modules.  External applications may depend on the `press_estimator`
//! crate and call into `engine::estimate` directly or embed the API via
//! `api::build_router`.

pub mod api;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod form;
pub mod geometry;
pub mod logging;
pub mod models;
