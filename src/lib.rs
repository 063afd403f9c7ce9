//! # Selfup - Self-Updating for Binaries
//!
//! A library that lets a running executable discover, fetch, and apply
//! an update to itself without an external package manager.
//!
//! ## Features
//!
//! - **Version Manifests**: One small JSON document per app/platform
//!   describing the latest version and its SHA-256 checksum
//! - **Incremental Patches**: bsdiff-style binary patches with an
//!   automatic fallback to a full gzipped binary download
//! - **Integrity Verification**: Every candidate is checked against the
//!   manifest checksum before anything touches the disk
//! - **Atomic Install**: Same-directory rename swap with rollback, so
//!   the target is never left half-written
//! - **Check Scheduling**: Persisted next-check timestamp with optional
//!   jitter, so fleets of instances do not stampede the server
//! - **Pluggable Seams**: Transport, diff/patch transform, target file,
//!   and platform are all trait-injected
//!
//! ## Usage
//!
//! ```rust,no_run
//! use selfup::{UpdateConfig, Updater};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), selfup::UpdateError> {
//!     let updater = Updater::new(UpdateConfig {
//!         current_version: env!("CARGO_PKG_VERSION").to_string(),
//!         app_name: "myapp".to_string(),
//!         api_url: "https://updates.example.com/".to_string(),
//!         bin_url: "https://updates.example.com/".to_string(),
//!         diff_url: "https://updates.example.com/".to_string(),
//!         ..UpdateConfig::default()
//!     });
//!     let outcome = updater.run().await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod acquire;
pub mod errors;
pub mod install;
pub mod manifest;
pub mod patcher;
pub mod requester;
pub mod resolver;
pub mod schedule;
pub mod updater;
pub mod verify;

pub use errors::UpdateError;
pub use manifest::VersionManifest;
pub use updater::{UpdateConfig, UpdateOutcome, Updater, DEV_VERSION};
