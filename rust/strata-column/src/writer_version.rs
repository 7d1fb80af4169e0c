//! Best-effort parsing of the free-form "created by" string left by the writer of
//! the data, e.g. `parquet-mr version 1.6.0 (build 6aa21f8776625b5fa6b18059cfebe7549f2e00cb)`.
//!
//! The parsed version is advisory: it only enables narrow compensations for known
//! writer bugs and its absence never blocks reading.

use std::{cmp::Ordering, fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

/// `<application> version [<version>] [(build <build id>)]`
static CREATED_BY_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s+version\s*(?:([^(]*?)\s*(?:\(\s*build\s*([^)]*?)\s*\))?)?$")
        .expect("valid created-by pattern")
});

/// `major.minor.patch[unknown][-pre-release][+build]`
static SEMVER_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)([^-+]*)?(?:-([^+]*))?(?:\+(.*))?$")
        .expect("valid semantic version pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("writer version string is empty")]
    Empty,
    #[error("'{0}' does not match '<application> version <version> (build <build id>)'")]
    Malformed(String),
    #[error("'{0}' does not name an application")]
    MissingApplication(String),
}

/// Structured form of a writer's "created by" string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterVersion {
    application: String,
    version: Option<String>,
    build_id: Option<String>,
}

impl WriterVersion {
    pub const PARQUET_MR: &'static str = "parquet-mr";

    /// First `parquet-mr` release whose delta byte array pages can be decoded
    /// independently of the previous page.
    const SEQUENTIAL_READS_FIX: SemanticVersion = SemanticVersion::new(1, 8, 0);

    /// Parses a "created by" string.
    ///
    /// # Errors
    ///
    /// Fails only on malformed input: an empty string, a string without the
    /// `version` keyword, or one without an application name.
    pub fn parse(created_by: &str) -> Result<WriterVersion, VersionParseError> {
        let created_by = created_by.trim();
        if created_by.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let captures = CREATED_BY_FORMAT
            .captures(created_by)
            .ok_or_else(|| VersionParseError::Malformed(created_by.to_string()))?;
        let non_empty =
            |i: usize| captures.get(i).map(|m| m.as_str().trim()).filter(|s| !s.is_empty());
        let application = non_empty(1)
            .ok_or_else(|| VersionParseError::MissingApplication(created_by.to_string()))?;
        Ok(WriterVersion {
            application: application.to_string(),
            version: non_empty(2).map(str::to_string),
            build_id: non_empty(3).map(str::to_string),
        })
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn build_id(&self) -> Option<&str> {
        self.build_id.as_deref()
    }

    /// The version component as a semantic version, if it has that shape.
    pub fn semantic_version(&self) -> Option<SemanticVersion> {
        self.version.as_deref().and_then(SemanticVersion::parse)
    }

    /// Whether pages written by this writer must be read in storage order because
    /// a page's first delta byte array value depends on the previous page.
    ///
    /// Applies to `parquet-mr` releases before 1.8.0, and to `parquet-mr` strings
    /// whose version cannot be interpreted.
    pub fn requires_sequential_page_reads(&self) -> bool {
        if self.application != Self::PARQUET_MR {
            return false;
        }
        match self.semantic_version() {
            Some(version) => version < Self::SEQUENTIAL_READS_FIX,
            None => true,
        }
    }
}

impl fmt::Display for WriterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} version", self.application)?;
        if let Some(version) = &self.version {
            write!(f, " {version}")?;
        }
        if let Some(build_id) = &self.build_id {
            write!(f, " (build {build_id})")?;
        }
        Ok(())
    }
}

/// `major.minor.patch` with an optional pre-release tag.
///
/// Ordering follows semver: a pre-release sorts before the release with the same
/// numbers. Pre-release tags are not compared with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub prerelease: bool,
}

impl SemanticVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> SemanticVersion {
        SemanticVersion {
            major,
            minor,
            patch,
            prerelease: false,
        }
    }

    /// Parses `1.8.0`, `1.5.1-SNAPSHOT`, `1.2.3rc1+build.5` and the like.
    pub fn parse(s: &str) -> Option<SemanticVersion> {
        let captures = SEMVER_FORMAT.captures(s.trim())?;
        let number = |i: usize| captures.get(i)?.as_str().parse::<u32>().ok();
        let tagged = |i: usize| captures.get(i).is_some_and(|m| !m.as_str().is_empty());
        Some(SemanticVersion {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            prerelease: tagged(4) || tagged(5),
        })
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| other.prerelease.cmp(&self.prerelease))
    }
}
