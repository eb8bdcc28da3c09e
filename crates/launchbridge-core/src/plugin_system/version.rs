use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use thiserror::Error;

use crate::plugin_system::error::PluginSystemError;

/// Error type for version parsing
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Invalid version format: '{0}'")]
    InvalidFormat(String),
    #[error("Version parse error: {0}")]
    ParseError(String),
}

/// Version of a host API contract.
///
/// Hosts report their contract as `major[.minor[.patch]]`; missing components
/// count as zero, so `4.0` and `4.0.0` are the same version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ApiVersion {
    /// Creates a new API version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parses a version string like "4", "4.1" or "4.1.2"
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(VersionError::InvalidFormat(version.to_string()));
        }

        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() > 3 {
            return Err(VersionError::InvalidFormat(version.to_string()));
        }

        let parse_part = |part: &str| -> Result<u64, VersionError> {
            part.parse::<u64>()
                .map_err(|e| VersionError::ParseError(format!("'{}' in '{}': {}", part, version, e)))
        };

        let major = parse_part(parts[0])?;
        let minor = parts.get(1).map(|part| parse_part(part)).transpose()?.unwrap_or(0);
        let patch = parts.get(2).map(|part| parse_part(part)).transpose()?.unwrap_or(0);

        Ok(Self::new(major, minor, patch))
    }

    /// The equivalent `semver::Version`.
    pub fn to_semver(&self) -> Version {
        Version::new(self.major, self.minor, self.patch)
    }
}

impl FromStr for ApiVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiVersion::parse(s)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Range of accepted host API versions, checked through a semver requirement.
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// Rendered form, e.g. `>=4.0.0`.
    constraint: String,
    /// The parsed semver requirement
    req: VersionReq,
}

impl VersionRange {
    /// Range accepting `minimum` and every later version.
    pub fn at_least(minimum: &ApiVersion) -> Self {
        let constraint = format!(">={}", minimum);
        let req = VersionReq {
            comparators: vec![semver::Comparator {
                op: semver::Op::GreaterEq,
                major: minimum.major,
                minor: Some(minimum.minor),
                patch: Some(minimum.patch),
                pre: semver::Prerelease::EMPTY,
            }],
        };
        Self { constraint, req }
    }

    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

/// Checks the host's API contract version before the bootstrap touches anything.
#[derive(Debug, Clone)]
pub struct CompatibilityGate {
    minimum: ApiVersion,
    range: VersionRange,
}

impl CompatibilityGate {
    pub fn new(minimum: ApiVersion) -> Self {
        let range = VersionRange::at_least(&minimum);
        Self { minimum, range }
    }

    pub fn from_minimum(minimum: &str) -> Result<Self, VersionError> {
        Ok(Self::new(ApiVersion::parse(minimum)?))
    }

    pub fn minimum(&self) -> &ApiVersion {
        &self.minimum
    }

    /// Succeeds when `reported` is the minimum version or later. A host that
    /// reports nothing, or something unparsable, is incompatible.
    pub fn check(&self, reported: Option<&str>) -> Result<ApiVersion, PluginSystemError> {
        let incompatible = |actual: &str| PluginSystemError::Incompatible {
            required: self.minimum.to_string(),
            actual: actual.to_string(),
        };

        let reported = reported.ok_or_else(|| incompatible("unknown"))?;
        let version = ApiVersion::parse(reported).map_err(|_| incompatible(reported))?;
        if self.range.includes(&version.to_semver()) {
            Ok(version)
        } else {
            Err(incompatible(reported))
        }
    }
}
