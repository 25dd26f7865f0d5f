//! Recovering typographic structure from traced glyph sheets.
//!
//! A sheet of hand drawn (or generated) glyphs is traced into a set of
//! outlines, one per connected shape, with no notion of which shapes form a
//! character or where the text lines are. This crate recovers that
//! structure from geometry alone:
//!
//! - shapes are [`merge`]d into whole characters,
//! - characters are grouped into text [`lines`] and measured against the
//!   [`baseline`] of their line,
//! - the distribution of heights yields the x-height, cap-height and
//!   full-height [`reference`] lines,
//! - and every glyph is [`normalize`]d onto those lines.
//!
//! The [`Pipeline`] runs all of these for one pass of a job. The first pass
//! of a job stores the cluster centers it estimated; later passes over
//! regenerated glyphs reuse them so that the new glyphs land on the same
//! scale.

#![forbid(unsafe_code)]

pub mod baseline;
pub mod bbox;
pub mod density;
pub mod job;
pub mod lines;
pub mod merge;
pub mod metrics;
pub mod normalize;
pub mod observer;
pub mod path;
pub mod pipeline;
pub mod reference;
pub mod settings;
pub mod stats;
pub mod store;

mod error;

pub use bbox::BoundingBox;
pub use error::Error;
pub use job::{CenterStore, JobDir, MemoryStore};
pub use normalize::NormalizedGlyph;
pub use path::PathGeometry;
pub use pipeline::{NormalizedSheet, Pass, Pipeline};
pub use reference::{Cluster, ClusterCenters, ReferenceLines};
pub use settings::Settings;
pub use store::{GlyphCandidate, GlyphStore};
