//! Export descriptions: the packages a bundle offers to importers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::WeftError;
use crate::version::Version;

/// An immutable record of one or more exported packages sharing a version,
/// a `uses` set, and matching attributes.
///
/// The `uses` set names the packages this export's implementation itself
/// references; any importer wired to this export inherits the provider's
/// view of those packages, and that view must stay consistent across the
/// importer's whole wiring.
///
/// Construct through [`ExportDescriptionBuilder`]. Value equality is full
/// structural equality; the resolver's consistency check depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportDescription {
    packages: BTreeSet<String>,
    version: Version,
    uses: BTreeSet<String>,
    mandatory: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
}

impl ExportDescription {
    pub fn builder() -> ExportDescriptionBuilder {
        ExportDescriptionBuilder::default()
    }

    pub fn packages(&self) -> &BTreeSet<String> {
        &self.packages
    }

    /// The exported version. Defaults to 0.0.0.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Packages this export's implementation references and importers must
    /// therefore see consistently.
    pub fn uses(&self) -> &BTreeSet<String> {
        &self.uses
    }

    /// Attribute keys an importer must also specify, with an equal value.
    pub fn mandatory(&self) -> &BTreeSet<String> {
        &self.mandatory
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn exports_package(&self, package: &str) -> bool {
        self.packages.contains(package)
    }
}

impl fmt::Display for ExportDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let packages: Vec<&str> = self.packages.iter().map(String::as_str).collect();
        write!(f, "{};version={}", packages.join(";"), self.version)?;
        if !self.uses.is_empty() {
            let uses: Vec<&str> = self.uses.iter().map(String::as_str).collect();
            write!(f, ";uses:={}", uses.join(","))?;
        }
        if !self.mandatory.is_empty() {
            let mandatory: Vec<&str> = self.mandatory.iter().map(String::as_str).collect();
            write!(f, ";mandatory:={}", mandatory.join(","))?;
        }
        for (key, value) in &self.attributes {
            write!(f, ";{key}={value}")?;
        }
        Ok(())
    }
}

/// Builder for [`ExportDescription`].
#[derive(Debug, Default)]
pub struct ExportDescriptionBuilder {
    packages: BTreeSet<String>,
    version: Option<Version>,
    uses: BTreeSet<String>,
    mandatory: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
}

impl ExportDescriptionBuilder {
    pub fn package(mut self, name: &str) -> Self {
        self.packages.insert(name.to_string());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn uses(mut self, package: &str) -> Self {
        self.uses.insert(package.to_string());
        self
    }

    pub fn mandatory(mut self, key: &str) -> Self {
        self.mandatory.insert(key.to_string());
        self
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> Result<ExportDescription, WeftError> {
        if self.packages.is_empty() {
            return Err(WeftError::Description {
                message: "export must name at least one package".to_string(),
            });
        }
        if self.packages.iter().any(|p| p.is_empty()) {
            return Err(WeftError::Description {
                message: "export package name cannot be empty".to_string(),
            });
        }
        for key in &self.mandatory {
            if !self.attributes.contains_key(key) {
                return Err(WeftError::Description {
                    message: format!("mandatory key `{key}` names no declared attribute"),
                });
            }
        }
        Ok(ExportDescription {
            packages: self.packages,
            version: self.version.unwrap_or_default(),
            uses: self.uses,
            mandatory: self.mandatory,
            attributes: self.attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_defaults_to_zero() {
        let export = ExportDescription::builder().package("org.weft.http").build().unwrap();
        assert_eq!(*export.version(), Version::new(0, 0, 0));
    }

    #[test]
    fn mandatory_must_name_an_attribute() {
        let err = ExportDescription::builder()
            .package("org.weft.http")
            .mandatory("vendor")
            .build();
        assert!(err.is_err());

        let ok = ExportDescription::builder()
            .package("org.weft.http")
            .attribute("vendor", "acme")
            .mandatory("vendor")
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn empty_package_set_rejected() {
        assert!(ExportDescription::builder().build().is_err());
    }

    #[test]
    fn value_equality_is_structural() {
        let a = ExportDescription::builder()
            .package("org.weft.http")
            .version(Version::new(1, 0, 0))
            .uses("org.weft.io")
            .build()
            .unwrap();
        let b = ExportDescription::builder()
            .package("org.weft.http")
            .version(Version::new(1, 0, 0))
            .uses("org.weft.io")
            .build()
            .unwrap();
        let c = ExportDescription::builder()
            .package("org.weft.http")
            .version(Version::new(2, 0, 0))
            .build()
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_lists_uses_and_mandatory() {
        let export = ExportDescription::builder()
            .package("org.weft.http")
            .version(Version::new(1, 2, 0))
            .uses("org.weft.io")
            .attribute("vendor", "acme")
            .mandatory("vendor")
            .build()
            .unwrap();
        let s = export.to_string();
        assert!(s.contains("version=1.2.0"));
        assert!(s.contains("uses:=org.weft.io"));
        assert!(s.contains("mandatory:=vendor"));
        assert!(s.contains("vendor=acme"));
    }
}
