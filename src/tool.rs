//! External converter tool management.
//!
//! The compiled rule-set format is produced entirely by the upstream
//! `mihomo` binary; this module only keeps a usable copy of that binary
//! around. A cached copy is validated by asking it for its version. When
//! missing or unusable, the matching release asset for the host platform is
//! downloaded, decompressed, and installed in its place.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::metadata::ToolMetadata;
use crate::{Error, Result};

/// Default local path for the converter binary.
pub const DEFAULT_TOOL_PATH: &str = "./mihomo-bin";

/// Release index listing downloadable converter builds.
pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/chen08209/Clash.Meta/releases/tags/Prerelease-Alpha";

/// Variant tags excluded during asset selection.
const EXCLUDED_TAGS: [&str; 4] = ["compatible", "go120", "go122", "go123"];

/// Host platform in the release asset naming vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Detect the current host platform.
    pub fn detect() -> Self {
        Self {
            os: normalize_os(std::env::consts::OS).to_string(),
            arch: normalize_arch(std::env::consts::ARCH).to_string(),
        }
    }

    /// True when release assets exist for this operating system.
    pub fn is_supported(&self) -> bool {
        matches!(self.os.as_str(), "linux" | "darwin")
    }

    /// Asset name prefix for this platform.
    fn asset_pattern(&self) -> String {
        format!("mihomo-{}-{}-alpha", self.os, self.arch)
    }
}

/// Map a Rust OS name to the release naming vocabulary.
fn normalize_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

/// Map a machine-reported architecture to the release naming vocabulary.
///
/// Unknown values pass through unchanged; selection then finds no asset.
pub fn normalize_arch(machine: &str) -> &str {
    match machine {
        "x86_64" | "amd64" => "amd64",
        "aarch64" | "arm64" => "arm64",
        "armv7l" | "armv7" => "armv7",
        "i386" | "i686" => "386",
        other => other,
    }
}

/// A downloadable artifact in the release index.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Release index response. Fields beyond the asset list are ignored.
#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

/// Select the first asset matching the platform pattern.
///
/// Only gzip single-binary artifacts qualify; compatibility and pinned
/// Go-toolchain variants are skipped.
pub fn select_asset<'a>(assets: &'a [ReleaseAsset], platform: &Platform) -> Option<&'a ReleaseAsset> {
    let pattern = platform.asset_pattern();
    assets.iter().find(|asset| {
        asset.name.contains(&pattern)
            && asset.name.ends_with(".gz")
            && !EXCLUDED_TAGS.iter().any(|tag| asset.name.contains(tag))
    })
}

/// Manages the locally cached converter binary.
pub struct ToolManager {
    path: PathBuf,
    release_url: String,
}

impl ToolManager {
    /// Create a manager for a binary at `path`, acquiring from `release_url`.
    pub fn new(path: impl AsRef<Path>, release_url: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            release_url: release_url.into(),
        }
    }

    /// Create a manager with the default path and release index.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TOOL_PATH, DEFAULT_RELEASE_URL)
    }

    /// Path of the managed binary.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the metadata sidecar.
    fn metadata_path(&self) -> PathBuf {
        self.path.with_extension("meta")
    }

    /// Path for the in-progress download.
    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Probe the cached binary by asking it for its version.
    ///
    /// Any failure (missing file, not executable, nonzero exit) means the
    /// binary is unusable. Never fatal to the caller.
    pub fn check(&self) -> Option<String> {
        if !self.path.is_file() {
            return None;
        }

        let output = Command::new(&self.path).arg("-v").output().ok()?;
        if !output.status.success() {
            return None;
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            None
        } else {
            Some(version)
        }
    }

    /// Ensure a usable converter binary is present, acquiring one if the
    /// cached copy is missing or unusable.
    ///
    /// Returns the tool's reported version. Performs no network activity
    /// when the cached binary validates.
    pub fn ensure(&self) -> Result<String> {
        if let Some(version) = self.check() {
            log::info!("Found converter: {}", version);
            if let Ok(meta) = ToolMetadata::load(self.metadata_path()) {
                if let Some(age) = meta.age() {
                    log::debug!("Cached binary acquired {} hours ago", age.as_secs() / 3600);
                }
            }
            return Ok(version);
        }

        log::info!("Converter missing or unusable, acquiring");
        self.acquire()
    }

    /// Download and install the converter for the current platform.
    fn acquire(&self) -> Result<String> {
        let platform = Platform::detect();
        if !platform.is_supported() {
            return Err(Error::NoMatchingAsset {
                os: platform.os,
                arch: platform.arch,
            });
        }
        log::info!("Detected platform: {}/{}", platform.os, platform.arch);

        let release = self.fetch_release_index()?;
        let asset = select_asset(&release.assets, &platform).ok_or(Error::NoMatchingAsset {
            os: platform.os,
            arch: platform.arch,
        })?;
        log::info!("Downloading {}", asset.browser_download_url);

        let compressed = http_get_bytes(&asset.browser_download_url)?;
        let mut decoder = GzDecoder::new(&compressed[..]);
        let mut binary = Vec::new();
        decoder
            .read_to_end(&mut binary)
            .map_err(|e| Error::Download(format!("gzip decompression failed: {}", e)))?;

        self.install(&binary)?;

        let version = self.check().ok_or_else(|| {
            Error::ToolUnavailable("downloaded binary failed version check".to_string())
        })?;

        let meta = ToolMetadata::now_with_version(&version);
        if let Err(e) = meta.save(self.metadata_path()) {
            log::warn!("Failed to write tool metadata: {}", e);
        }

        log::info!("Converter installed: {}", version);
        Ok(version)
    }

    /// Query the release index.
    fn fetch_release_index(&self) -> Result<Release> {
        let response = ureq::get(&self.release_url)
            .call()
            .map_err(|e| Error::Download(format!("release index query failed: {}", e)))?;
        response
            .into_json()
            .map_err(|e| Error::Download(format!("invalid release index: {}", e)))
    }

    /// Write the binary to a temp file and atomically move it into place.
    fn install(&self, binary: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path)?;
        file.write_all(binary)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o755))?;
        }

        Ok(())
    }
}

/// Download a URL into memory.
fn http_get_bytes(url: &str) -> Result<Vec<u8>> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| Error::Download(format!("asset download failed: {}", e)))?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| Error::Download(format!("failed to read response: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> ReleaseAsset {
        ReleaseAsset {
            name: name.to_string(),
            browser_download_url: format!("https://example.com/{}", name),
        }
    }

    fn linux_amd64() -> Platform {
        Platform {
            os: "linux".to_string(),
            arch: "amd64".to_string(),
        }
    }

    #[test]
    fn test_normalize_arch() {
        assert_eq!(normalize_arch("x86_64"), "amd64");
        assert_eq!(normalize_arch("amd64"), "amd64");
        assert_eq!(normalize_arch("aarch64"), "arm64");
        assert_eq!(normalize_arch("arm64"), "arm64");
        assert_eq!(normalize_arch("armv7l"), "armv7");
        assert_eq!(normalize_arch("i386"), "386");
        assert_eq!(normalize_arch("i686"), "386");
        assert_eq!(normalize_arch("riscv64"), "riscv64");
    }

    #[test]
    fn test_platform_detect_is_normalized() {
        let platform = Platform::detect();
        assert_ne!(platform.os, "macos");
        assert_ne!(platform.arch, "x86_64");
        assert_ne!(platform.arch, "aarch64");
    }

    #[test]
    fn test_select_asset_matches_platform() {
        let assets = vec![
            asset("mihomo-darwin-arm64-alpha-abc123.gz"),
            asset("mihomo-linux-amd64-alpha-abc123.gz"),
        ];
        let selected = select_asset(&assets, &linux_amd64()).unwrap();
        assert_eq!(selected.name, "mihomo-linux-amd64-alpha-abc123.gz");
    }

    #[test]
    fn test_select_asset_skips_variant_builds() {
        let assets = vec![
            asset("mihomo-linux-amd64-compatible-alpha-abc123.gz"),
            asset("mihomo-linux-amd64-alpha-go120-abc123.gz"),
            asset("mihomo-linux-amd64-alpha-go123-abc123.gz"),
            asset("mihomo-linux-amd64-alpha-abc123.gz"),
        ];
        let selected = select_asset(&assets, &linux_amd64()).unwrap();
        assert_eq!(selected.name, "mihomo-linux-amd64-alpha-abc123.gz");
    }

    #[test]
    fn test_select_asset_requires_gzip() {
        let assets = vec![
            asset("mihomo-linux-amd64-alpha-abc123.zip"),
            asset("mihomo-linux-amd64-alpha-abc123.deb"),
        ];
        assert!(select_asset(&assets, &linux_amd64()).is_none());
    }

    #[test]
    fn test_select_asset_no_match() {
        let assets = vec![asset("mihomo-windows-amd64-alpha-abc123.zip")];
        assert!(select_asset(&assets, &linux_amd64()).is_none());
    }

    #[test]
    fn test_check_missing_binary() {
        let manager = ToolManager::new("/nonexistent/mihomo-bin", DEFAULT_RELEASE_URL);
        assert!(manager.check().is_none());
    }

    #[test]
    fn test_check_non_executable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mihomo-bin");
        fs::write(&path, b"not a binary").unwrap();

        let manager = ToolManager::new(&path, DEFAULT_RELEASE_URL);
        assert!(manager.check().is_none());
    }

    #[test]
    fn test_sidecar_paths() {
        let manager = ToolManager::new("/cache/mihomo-bin", DEFAULT_RELEASE_URL);
        assert_eq!(manager.metadata_path(), PathBuf::from("/cache/mihomo-bin.meta"));
        assert_eq!(manager.temp_path(), PathBuf::from("/cache/mihomo-bin.tmp"));
    }

    #[test]
    fn test_install_atomic_and_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mihomo-bin");
        let manager = ToolManager::new(&path, DEFAULT_RELEASE_URL);

        manager.install(b"#!/bin/sh\nexit 0\n").unwrap();

        assert!(path.is_file());
        assert!(!manager.temp_path().exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o755, 0o755);
        }
    }
}
