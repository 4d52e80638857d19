//! Munger: direct-mail list normalization and enrichment
//!
//! Takes consumer/vehicle-owner CSV files with arbitrary column layouts and
//! rewrites every record onto one fixed 51-column mailing layout:
//!
//! 1. **Column discovery** -- The header row is matched against ordered,
//!    case-insensitive patterns to decide which input column feeds which
//!    canonical field. A file without a zip column is rejected.
//! 2. **Enrichment** -- Each data row is case-normalized, its full name split
//!    into first/middle/last, phones and addresses standardized, dates
//!    parsed, the zip validated and geocoded, and the distance to the job's
//!    central zip computed. Facility, ethnicity and suppression tables are
//!    consulted as read-only lookups.
//! 3. **Output** -- Records are written in the canonical (or configured)
//!    header order through a single buffered CSV writer.
//!
//! # Architecture
//!
//! - **Single reader, worker pool, single writer** on the tokio blocking
//!   pool, connected by bounded channels for backpressure
//! - **Shared read-only context** -- reference tables, job config and the
//!   column map are built once per job and shared behind `Arc`
//! - **Atomic counters** for per-job statistics
//! - **Atomic output** -- results land in a temporary sibling file that is
//!   renamed into place only when the job succeeds
//!
//! # Key Modules
//!
//! - [`columns`] -- Header pattern rules and the per-job column map
//! - [`enrich`] -- Per-record transformation and enrichment
//! - [`names`] -- Full-name tokenization and splitting
//! - [`normalize`] -- Case, phone, zip, SCF, state, year and date transforms
//! - [`geo`] -- Coordinates and haversine distance
//! - [`reference`] -- Lookup tables loaded from the resources directory
//! - [`pipeline`] -- Concurrent reader/worker/writer job runner
//! - [`schema`] -- Canonical fields, records and output header
//! - [`config`] -- Constants and the JSON job configuration
//! - [`stats`] -- Thread-safe counters for job metrics
//! - [`error`] -- Fatal job conditions
//!
//! # Example Usage
//!
//! ```bash
//! # Process every CSV in the current directory with 16 workers
//! munger run -C 16 --resources ~/Resource
//!
//! # Stream one list through stdin
//! cat list.csv | munger run - --resources ~/Resource > list_output.csv
//!
//! # Check which columns would be picked up
//! munger columns list.csv
//! ```

pub mod columns;
pub mod config;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod models;
pub mod names;
pub mod normalize;
pub mod pipeline;
pub mod reference;
pub mod schema;
pub mod stats;
