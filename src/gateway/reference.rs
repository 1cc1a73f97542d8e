use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::{PipelineError, Result};

// Optional `entity/project/` path, the artifact name, optional `:<alias>`.
static REF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^/:\s]+/)*(?P<name>[A-Za-z0-9][A-Za-z0-9._-]*)(?::(?P<alias>[A-Za-z0-9][A-Za-z0-9._-]*))?$")
        .expect("artifact reference pattern is valid")
});

static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v(\d+)$").expect("version pattern is valid"));

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("artifact name pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactVersion {
    Latest,
    Number(u32),
    /// User-assigned alias such as `reference`
    Alias(String),
}

/// A parsed `name[:version]` artifact reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub name: String,
    pub version: ArtifactVersion,
}

impl ArtifactRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let caps = REF_PATTERN
            .captures(raw.trim())
            .ok_or_else(|| PipelineError::InvalidReference(raw.to_string()))?;
        let name = caps["name"].to_string();
        let version = match caps.name("alias").map(|m| m.as_str()) {
            None | Some("latest") => ArtifactVersion::Latest,
            Some(alias) => match VERSION_PATTERN.captures(alias) {
                Some(v) => ArtifactVersion::Number(
                    v[1].parse()
                        .map_err(|_| PipelineError::InvalidReference(raw.to_string()))?,
                ),
                None => ArtifactVersion::Alias(alias.to_string()),
            },
        };
        Ok(Self { name, version })
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            ArtifactVersion::Latest => write!(f, "{}:latest", self.name),
            ArtifactVersion::Number(n) => write!(f, "{}:v{}", self.name, n),
            ArtifactVersion::Alias(alias) => write!(f, "{}:{}", self.name, alias),
        }
    }
}

/// Aliases name a version; `latest` and `vN` are reserved.
pub fn validate_alias(alias: &str) -> Result<()> {
    if NAME_PATTERN.is_match(alias) && alias != "latest" && !VERSION_PATTERN.is_match(alias) {
        Ok(())
    } else {
        Err(PipelineError::InvalidReference(alias.to_string()))
    }
}

/// Artifact names double as directory names, so keep them path-safe.
pub fn validate_name(name: &str) -> Result<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(PipelineError::InvalidReference(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_means_latest() {
        let r = ArtifactRef::parse("sample.csv").unwrap();
        assert_eq!(r.name, "sample.csv");
        assert_eq!(r.version, ArtifactVersion::Latest);
    }

    #[test]
    fn explicit_version_is_parsed() {
        let r = ArtifactRef::parse("clean_sample.csv:v3").unwrap();
        assert_eq!(r.version, ArtifactVersion::Number(3));
        assert_eq!(r.to_string(), "clean_sample.csv:v3");
    }

    #[test]
    fn entity_and_project_prefix_is_ignored() {
        let r = ArtifactRef::parse("someone/nyc_airbnb/model_export:latest").unwrap();
        assert_eq!(r.name, "model_export");
        assert_eq!(r.version, ArtifactVersion::Latest);
    }

    #[test]
    fn other_suffixes_are_aliases() {
        let r = ArtifactRef::parse("clean_sample.csv:reference").unwrap();
        assert_eq!(r.version, ArtifactVersion::Alias("reference".to_string()));
        assert_eq!(r.to_string(), "clean_sample.csv:reference");
    }

    #[test]
    fn reserved_aliases_are_rejected() {
        assert!(validate_alias("reference").is_ok());
        assert!(validate_alias("latest").is_err());
        assert!(validate_alias("v2").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ArtifactRef::parse("").is_err());
        assert!(ArtifactRef::parse("name:").is_err());
        assert!(ArtifactRef::parse("name:a:b").is_err());
        assert!(validate_name("../escape").is_err());
    }
}
