//! Resolution of *what* to update and *which* platform artifact to ask
//! the server for.
//!
//! Two small capability traits with two concrete variants each: the
//! defaults target the running executable on the running host, the
//! fixed variants serve tests and the "update a file other than the
//! running process" case.

use std::io;
use std::path::PathBuf;

/// Finds the file that will be replaced.
pub trait TargetResolver: Send + Sync {
    fn resolve(&self) -> io::Result<PathBuf>;
}

/// Resolves to the currently running executable.
pub struct CurrentExeResolver;

impl TargetResolver for CurrentExeResolver {
    fn resolve(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }
}

/// Resolves to a fixed path on disk.
pub struct SpecificFileResolver {
    path: PathBuf,
}

impl SpecificFileResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TargetResolver for SpecificFileResolver {
    fn resolve(&self) -> io::Result<PathBuf> {
        Ok(self.path.clone())
    }
}

/// Produces the `{os}-{arch}` key used in artifact URLs.
pub trait PlatformResolver: Send + Sync {
    fn resolve(&self) -> String;
}

/// Resolves to the platform this program is running on.
///
/// Artifacts are conventionally published under Go-style platform
/// names (`linux-amd64`, `darwin-arm64`), so the host triple values are
/// mapped onto those.
pub struct CurrentPlatformResolver;

impl PlatformResolver for CurrentPlatformResolver {
    fn resolve(&self) -> String {
        format!("{}-{}", host_os(), host_arch())
    }
}

/// Resolves to an explicitly configured os/arch pair.
pub struct SpecificPlatformResolver {
    os: String,
    arch: String,
}

impl SpecificPlatformResolver {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

impl PlatformResolver for SpecificPlatformResolver {
    fn resolve(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    }
}
