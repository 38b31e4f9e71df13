//! Ingestion for multi-entity purchasing exports: locates header rows
//! buried in sheet preambles, normalizes column names so heterogeneous
//! files concatenate into one schema, and reconstructs vendor master
//! records from label/value card sheets.

pub mod manifest;
pub mod normalize;
pub mod report;
pub mod sheet;
pub mod sink;
pub mod table;
pub mod vendor;
