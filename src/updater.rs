//! The update orchestrator.
//!
//! One `run()` walks the whole state machine: schedule gate, manifest
//! fetch, version compare, patch attempt with full-binary fallback,
//! checksum verification, atomic install, optional success hook. A run
//! is a single logical sequence with no internal parallelism; hosts
//! that do not want to block spawn it on a background task. Concurrent
//! runs against the same target are not supported and must be
//! prevented by the caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use selfup::{UpdateConfig, Updater};
//!
//! # async fn run() -> Result<(), selfup::UpdateError> {
//! let updater = Updater::new(UpdateConfig {
//!     current_version: env!("CARGO_PKG_VERSION").to_string(),
//!     app_name: "myapp".to_string(),
//!     api_url: "https://updates.example.com/".to_string(),
//!     bin_url: "https://updates.example.com/".to_string(),
//!     diff_url: "https://updates.example.com/".to_string(),
//!     ..UpdateConfig::default()
//! });
//! let outcome = updater.run().await?;
//! # Ok(())
//! # }
//! ```

use crate::acquire::{self, BinarySource, PatchSource};
use crate::errors::UpdateError;
use crate::install;
use crate::manifest::{self, VersionManifest};
use crate::patcher::{Bsdiff, Patcher};
use crate::requester::{HttpRequester, Requester};
use crate::resolver::{CurrentExeResolver, CurrentPlatformResolver, PlatformResolver, TargetResolver};
use crate::schedule::FsSchedule;
use crate::verify::verify_sha256;
use anyhow::anyhow;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Version string that disables update checks entirely. Takes
/// precedence over `force_check`.
pub const DEV_VERSION: &str = "dev";

/// File under the state directory holding the next-eligible-check time.
const CHECK_TIME_FILE: &str = "cktime";

fn default_state_dir() -> String {
    "update".to_string()
}

fn default_check_interval() -> u64 {
    // Once a day, like most tools that phone home for versions.
    24 * 60 * 60
}

/// Configuration for one [`Updater`].
///
/// Serde-derived so hosts can embed it in their own configuration
/// files. The three base URLs may all point at the same server; each is
/// expected to end with `/`. An empty `diff_url` skips the patch
/// attempt and always downloads the full binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Version the host binary believes it is running. Opaque string,
    /// compared only for equality; `"dev"` disables checking.
    pub current_version: String,
    /// Application name, appended to the base URLs. One name per
    /// distributed binary.
    pub app_name: String,
    /// Base URL for version manifests (`{api_url}{app}/{platform}.json`).
    pub api_url: String,
    /// Base URL for full binary downloads.
    pub bin_url: String,
    /// Base URL for incremental patches. Empty disables patching.
    #[serde(default)]
    pub diff_url: String,
    /// Directory for schedule state, relative to the executable.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    /// Check regardless of the persisted schedule ("dev" still wins).
    #[serde(default)]
    pub force_check: bool,
    /// Base seconds between checks.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    /// Upper bound of the random jitter added to the interval.
    #[serde(default)]
    pub jitter_secs: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            current_version: DEV_VERSION.to_string(),
            app_name: String::new(),
            api_url: String::new(),
            bin_url: String::new(),
            diff_url: String::new(),
            state_dir: default_state_dir(),
            force_check: false,
            check_interval_secs: default_check_interval(),
            jitter_secs: 0,
        }
    }
}

/// Terminal classification of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Not due, same version, or dev build.
    NoUpdateNeeded,
    /// The incremental patch path produced the installed binary.
    PatchApplied,
    /// The full download path produced the installed binary.
    FullBinaryApplied,
}

type UpdateHook = Box<dyn Fn(&str) + Send + Sync>;

/// The update engine. Collaborators default to the real thing at
/// construction time and are swapped through the `with_*` methods;
/// nothing is mutated process-wide.
pub struct Updater {
    config: UpdateConfig,
    requester: Box<dyn Requester>,
    patcher: Box<dyn Patcher>,
    target_resolver: Box<dyn TargetResolver>,
    platform_resolver: Box<dyn PlatformResolver>,
    on_successful_update: Option<UpdateHook>,
}

impl Updater {
    pub fn new(config: UpdateConfig) -> Self {
        Self {
            config,
            requester: Box::new(HttpRequester::new()),
            patcher: Box::new(Bsdiff),
            target_resolver: Box::new(CurrentExeResolver),
            platform_resolver: Box::new(CurrentPlatformResolver),
            on_successful_update: None,
        }
    }

    /// Replaces the HTTP transport.
    pub fn with_requester(mut self, requester: impl Requester + 'static) -> Self {
        self.requester = Box::new(requester);
        self
    }

    /// Replaces the diff/patch transform.
    pub fn with_patcher(mut self, patcher: impl Patcher + 'static) -> Self {
        self.patcher = Box::new(patcher);
        self
    }

    /// Replaces the "what file gets updated" strategy.
    pub fn with_target_resolver(mut self, resolver: impl TargetResolver + 'static) -> Self {
        self.target_resolver = Box::new(resolver);
        self
    }

    /// Replaces the "which platform artifact" strategy.
    pub fn with_platform_resolver(mut self, resolver: impl PlatformResolver + 'static) -> Self {
        self.platform_resolver = Box::new(resolver);
        self
    }

    /// Registers a hook invoked with the new version string after a
    /// successful install.
    pub fn on_successful_update(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_successful_update = Some(Box::new(hook));
        self
    }

    /// Runs one update cycle.
    ///
    /// Returns the outcome, or the error that stopped the run. Patch
    /// failures do not stop the run — they fall through to the full
    /// binary download; see [`UpdateError`] for what can escape.
    pub async fn run(&self) -> Result<UpdateOutcome, UpdateError> {
        if self.config.current_version == DEV_VERSION {
            debug!("dev build, update checks disabled");
            return Ok(UpdateOutcome::NoUpdateNeeded);
        }

        let schedule = self.schedule()?;
        let now = Utc::now();
        if !self.config.force_check && !schedule.should_check(now) {
            debug!("update check not due yet");
            return Ok(UpdateOutcome::NoUpdateNeeded);
        }

        // The check is already in flight; a broken schedule file should
        // not cancel it.
        if let Err(err) = schedule.record_checked(now) {
            warn!(error = %err, "could not persist next update check time");
        }

        self.update().await
    }

    async fn update(&self) -> Result<UpdateOutcome, UpdateError> {
        let platform = self.platform_resolver.resolve();
        let manifest = manifest::fetch_manifest(
            self.requester.as_ref(),
            &self.config.api_url,
            &self.config.app_name,
            &platform,
        )
        .await?;

        if manifest.version == self.config.current_version {
            debug!(version = %manifest.version, "already running the latest version");
            return Ok(UpdateOutcome::NoUpdateNeeded);
        }

        let target = self.target_resolver.resolve()?;
        // Read the old binary fully and drop the handle: on Windows the
        // target cannot be renamed while this process holds it open.
        let old = fs::read(&target)?;

        let (candidate, outcome) = match self.try_patch(&old, &manifest, &platform).await {
            Ok(bytes) => (bytes, UpdateOutcome::PatchApplied),
            Err(err) => {
                // Every patch-path failure falls through to the full
                // binary; the kinds stay distinguishable in the logs.
                match &err {
                    UpdateError::HashMismatch => {
                        warn!("patched binary failed checksum verification, falling back to full download")
                    }
                    other => warn!(error = %other, "binary patch failed, falling back to full download"),
                }
                let bytes = self.fetch_full(&manifest, &platform).await?;
                (bytes, UpdateOutcome::FullBinaryApplied)
            }
        };

        install::install(&target, &candidate)?;
        debug!(version = %manifest.version, target = %target.display(), "binary updated");

        if let Some(hook) = &self.on_successful_update {
            hook(&manifest.version);
        }

        Ok(outcome)
    }

    async fn try_patch(
        &self,
        old: &[u8],
        manifest: &VersionManifest,
        platform: &str,
    ) -> Result<Vec<u8>, UpdateError> {
        if self.config.diff_url.is_empty() {
            return Err(UpdateError::PatchApply(anyhow!("no diff url configured")));
        }

        let source = PatchSource {
            diff_url: &self.config.diff_url,
            app: &self.config.app_name,
            from_version: &self.config.current_version,
            to_version: &manifest.version,
            platform,
        };
        let bytes = acquire::fetch_and_apply_patch(self.requester.as_ref(), self.patcher.as_ref(), old, &source).await?;

        if !verify_sha256(&bytes, &manifest.sha256) {
            return Err(UpdateError::HashMismatch);
        }
        Ok(bytes)
    }

    async fn fetch_full(&self, manifest: &VersionManifest, platform: &str) -> Result<Vec<u8>, UpdateError> {
        let source = BinarySource {
            bin_url: &self.config.bin_url,
            app: &self.config.app_name,
            to_version: &manifest.version,
            platform,
        };
        let bytes = acquire::fetch_full_binary(self.requester.as_ref(), &source).await?;

        if !verify_sha256(&bytes, &manifest.sha256) {
            return Err(UpdateError::HashMismatch);
        }
        Ok(bytes)
    }

    fn schedule(&self) -> Result<FsSchedule, UpdateError> {
        let dir = exec_relative_dir(&self.config.state_dir)?;
        Ok(FsSchedule::new(
            dir.join(CHECK_TIME_FILE),
            Duration::seconds(self.config.check_interval_secs as i64),
            Duration::seconds(self.config.jitter_secs as i64),
        ))
    }
}

/// Resolves `dir` relative to the running executable's directory.
/// An absolute `dir` is used as-is, which is what tests rely on.
fn exec_relative_dir(dir: &str) -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(match exe.parent() {
        Some(parent) => parent.join(dir),
        None => PathBuf::from(dir),
    })
}
