//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable slot contract stores persist through.
//! - Isolate SQLite query details from the in-memory store layer.
//!
//! # Invariants
//! - Repositories treat payloads as opaque text; decoding belongs to stores.

pub mod slot_repo;
