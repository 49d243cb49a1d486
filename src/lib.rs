#![doc = "docloom-core: core data model and engine for docloom."]

//! This crate contains the source-agnostic logic of the documentation
//! generator: the normalized item model that all adapters produce, the merge
//! engine combining per-source data, the cross-reference resolver, and the
//! read-only query surface the rendering stage consumes. Provider clients,
//! configuration-file loading, the CLI and the renderers live in separate
//! crates and are not included here.
//!
//! # Usage
//! Add this as a dependency for all shared model, merge, resolution and
//! pipeline code. Implement [`contract::SourceAdapter`] to plug in a new
//! data source.

pub mod collect;
pub mod config;
pub mod contract;
pub mod error;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod query;
pub mod resolve;
