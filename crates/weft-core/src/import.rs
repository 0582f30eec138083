//! Import descriptions: the packages a bundle requires, with constraints.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::WeftError;
use crate::version::VersionRange;

/// Whether an unsatisfied import fails resolution or is quietly dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    Mandatory,
    Optional,
}

/// An immutable record of one or more required packages sharing a constraint
/// set.
///
/// Reserved directives (`version`, `bundle-symbolic-name`, `bundle-version`,
/// `resolution`, `selection-filter`) live in dedicated fields; `attributes`
/// holds only the arbitrary matching attributes compared against an export.
///
/// Construct through [`ImportDescriptionBuilder`]; the resolver never
/// observes a description mutate mid-search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDescription {
    packages: Vec<String>,
    version: VersionRange,
    bundle_symbolic_name: Option<String>,
    bundle_version: Option<VersionRange>,
    resolution: Resolution,
    selection_filter: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl ImportDescription {
    pub fn builder() -> ImportDescriptionBuilder {
        ImportDescriptionBuilder::default()
    }

    /// Package names in declaration order. Flattening into per-package
    /// resolution units preserves this order.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// The required version range. Always present; defaults to `[0.0.0,)`.
    pub fn version(&self) -> &VersionRange {
        &self.version
    }

    pub fn bundle_symbolic_name(&self) -> Option<&str> {
        self.bundle_symbolic_name.as_deref()
    }

    pub fn bundle_version(&self) -> Option<&VersionRange> {
        self.bundle_version.as_ref()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Raw selection-filter text, parsed lazily during resolution.
    pub fn selection_filter(&self) -> Option<&str> {
        self.selection_filter.as_deref()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

impl fmt::Display for ImportDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.packages.join(";"))?;
        write!(f, ";version={}", self.version)?;
        if let Some(ref name) = self.bundle_symbolic_name {
            write!(f, ";bundle-symbolic-name={name}")?;
        }
        if let Some(ref range) = self.bundle_version {
            write!(f, ";bundle-version={range}")?;
        }
        if self.resolution == Resolution::Optional {
            write!(f, ";resolution:=optional")?;
        }
        for (key, value) in &self.attributes {
            write!(f, ";{key}={value}")?;
        }
        Ok(())
    }
}

/// Builder for [`ImportDescription`].
#[derive(Debug, Default)]
pub struct ImportDescriptionBuilder {
    packages: Vec<String>,
    version: Option<VersionRange>,
    bundle_symbolic_name: Option<String>,
    bundle_version: Option<VersionRange>,
    resolution: Resolution,
    selection_filter: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl ImportDescriptionBuilder {
    pub fn package(mut self, name: &str) -> Self {
        self.packages.push(name.to_string());
        self
    }

    pub fn version(mut self, range: VersionRange) -> Self {
        self.version = Some(range);
        self
    }

    pub fn bundle_symbolic_name(mut self, name: &str) -> Self {
        self.bundle_symbolic_name = Some(name.to_string());
        self
    }

    pub fn bundle_version(mut self, range: VersionRange) -> Self {
        self.bundle_version = Some(range);
        self
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn selection_filter(mut self, filter: &str) -> Self {
        self.selection_filter = Some(filter.to_string());
        self
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> Result<ImportDescription, WeftError> {
        if self.packages.is_empty() {
            return Err(WeftError::Description {
                message: "import must name at least one package".to_string(),
            });
        }
        if self.packages.iter().any(|p| p.is_empty()) {
            return Err(WeftError::Description {
                message: "import package name cannot be empty".to_string(),
            });
        }
        Ok(ImportDescription {
            packages: self.packages,
            version: self.version.unwrap_or_else(VersionRange::at_least_zero),
            bundle_symbolic_name: self.bundle_symbolic_name,
            bundle_version: self.bundle_version,
            resolution: self.resolution,
            selection_filter: self.selection_filter,
            attributes: self.attributes,
        })
    }
}
