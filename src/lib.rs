//! Batch pipeline for the OZ Different menstrual-poverty survey report.
//!
//! Loads the pre- and after-installation questionnaire exports, normalizes
//! the categorical answers, renders the charts and writes a single PDF with
//! narrative captions. The stages are plain functions over owned row
//! vectors; nothing is streamed or cached between runs.

pub mod after_report;
pub mod aggregate;
pub mod chart;
pub mod compose;
pub mod cross_report;
pub mod docwriter;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod pre_report;
pub mod types;
pub mod util;
