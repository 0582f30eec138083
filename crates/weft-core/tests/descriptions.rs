use weft_core::export::ExportDescription;
use weft_core::import::{ImportDescription, Resolution};
use weft_core::version::{Version, VersionRange};

#[test]
fn import_serde_round_trip() {
    let import = ImportDescription::builder()
        .package("org.weft.http")
        .version(VersionRange::parse("[1.0,2.0)").unwrap())
        .bundle_symbolic_name("org.weft.provider")
        .resolution(Resolution::Optional)
        .attribute("vendor", "acme")
        .build()
        .unwrap();

    let json = serde_json::to_string(&import).unwrap();
    let back: ImportDescription = serde_json::from_str(&json).unwrap();
    assert_eq!(import, back);
}

#[test]
fn export_serde_round_trip() {
    let export = ExportDescription::builder()
        .package("org.weft.http")
        .version(Version::new(1, 2, 3))
        .uses("org.weft.io")
        .attribute("vendor", "acme")
        .mandatory("vendor")
        .build()
        .unwrap();

    let json = serde_json::to_string(&export).unwrap();
    let back: ExportDescription = serde_json::from_str(&json).unwrap();
    assert_eq!(export, back);
}

#[test]
fn version_serde_round_trip() {
    let version = Version::with_qualifier(1, 2, 3, "rc1");
    let json = serde_json::to_string(&version).unwrap();
    let back: Version = serde_json::from_str(&json).unwrap();
    assert_eq!(version, back);
}

#[test]
fn identical_builds_compare_equal() {
    let a = ImportDescription::builder().package("p").build().unwrap();
    let b = ImportDescription::builder().package("p").build().unwrap();
    assert_eq!(a, b);
}
