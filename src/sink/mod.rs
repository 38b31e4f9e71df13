// src/sink/mod.rs
//
// Persistence collaborators. Both sinks write to a temporary file next to
// the target and rename into place once the write is complete.

pub mod csv;
pub mod parquet;
