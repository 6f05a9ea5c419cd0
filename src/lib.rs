//! Tech Insights - A static news page builder
//!
//! This crate fetches RSS and Atom feeds from a fixed list of sources grouped
//! into categories and renders the freshest stories into a single HTML page.
//! It is meant to be run periodically by an external scheduler.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod writer;
