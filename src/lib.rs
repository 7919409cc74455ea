//! Chemical safety compliance and alerting engine for swimming pools.
//!
//! Technicians submit periodic chemical readings; this crate classifies each
//! parameter against MAHC-derived safe ranges, aggregates the results into a
//! single pool status (including compound-risk escalation), analyzes trends
//! across a reading history, and manages the alert lifecycle with
//! de-duplication and cooldown-gated resolution.
//!
//! Every operation is a pure function over explicit inputs: readings, the
//! range catalog, and the caller-owned alert state. No I/O, no clock reads
//! (`now` is always a parameter), no hidden globals — calls for different
//! pools can run fully in parallel, and per-pool ordering is just "thread
//! the returned `AlertState` into the next call".
//!
//! Data flow:
//!   `ChemicalReading` → `status::evaluate_reading` → `PoolStatus`
//!   `&[ChemicalReading]` → `trend::analyze` → `TrendResult`
//!   `PoolStatus` + trends + `AlertState` → `alert::process` → alerts + state

pub mod alert;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod model;
pub mod status;
pub mod trend;
pub mod validate;
