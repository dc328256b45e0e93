use exn::ResultExt;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::catalog::lookup;
use crate::error::{ErrorKind, Result};

/// File name of the device metadata inside a backup directory.
pub const INFO_FILENAME: &str = "Info.plist";

/// Device metadata from a backup's `Info.plist`.
///
/// Every scalar is optional: which keys are present depends on the device
/// (no IMEI on a Wi-Fi iPad) and on the software that made the backup.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "Build Version")]
    pub build_version: Option<String>,
    #[serde(rename = "Device Name")]
    pub device_name: Option<String>,
    #[serde(rename = "Display Name")]
    pub display_name: Option<String>,
    #[serde(rename = "GUID")]
    pub guid: Option<String>,
    #[serde(rename = "ICCID")]
    pub iccid: Option<String>,
    #[serde(rename = "IMEI")]
    pub imei: Option<String>,
    #[serde(rename = "Last Backup Date")]
    pub last_backup_date: Option<plist::Date>,
    #[serde(rename = "MEID")]
    pub meid: Option<String>,
    #[serde(rename = "Phone Number")]
    pub phone_number: Option<String>,
    /// Hardware identifier, e.g. `iPhone8,1`.
    #[serde(rename = "Product Type")]
    pub product_type: Option<String>,
    #[serde(rename = "Product Version")]
    pub product_version: Option<String>,
    #[serde(rename = "Serial Number")]
    pub serial_number: Option<String>,
    #[serde(rename = "Target Identifier")]
    pub target_identifier: Option<String>,
    #[serde(rename = "Target Type")]
    pub target_type: Option<String>,
    #[serde(rename = "Unique Identifier")]
    pub unique_identifier: Option<String>,
    /// Bundle identifiers of every installed application.
    #[serde(rename = "Installed Applications", default)]
    pub installed_applications: Vec<String>,
    /// Per-application data, keyed by bundle identifier, for applications
    /// that came from the App Store.
    #[serde(rename = "Applications", default)]
    pub applications: BTreeMap<String, plist::Value>,
}

/// An installed application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Application<'a> {
    pub bundle_id: &'a str,
    pub app_store: bool,
}

impl DeviceInfo {
    /// Read and parse an `Info.plist` (XML or binary).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        plist::from_file(path).or_raise(|| ErrorKind::InvalidPlist(path.to_path_buf()))
    }

    /// Marketing name of the device, see [`lookup`](crate::lookup).
    pub fn model(&self) -> &'static str {
        lookup(self.product_type.as_deref().unwrap_or_default())
    }

    /// Installed applications in `Info.plist` order, flagging the ones that
    /// came from the App Store.
    pub fn applications(&self) -> impl Iterator<Item = Application<'_>> {
        self.installed_applications.iter().map(|id| Application {
            bundle_id: id,
            app_store: self.applications.contains_key(id),
        })
    }

    /// Last backup date as RFC 3339.
    pub fn last_backup(&self) -> Option<String> {
        self.last_backup_date.as_ref().map(|date| {
            OffsetDateTime::from(SystemTime::from(date.clone()))
                .format(&Rfc3339)
                .unwrap_or_else(|_| date.to_xml_format())
        })
    }
}

/// The `--info` summary: the application list, then the device fields.
impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field(f: &mut fmt::Formatter<'_>, label: &str, value: Option<&str>) -> fmt::Result {
            writeln!(f, "{:<20}{}", format!("{label}:"), value.unwrap_or_default())
        }

        writeln!(f, "Applications:")?;
        for app in self.applications() {
            match app.app_store {
                true => writeln!(f, "+ {} (App Store)", app.bundle_id)?,
                false => writeln!(f, "+ {}", app.bundle_id)?,
            }
        }
        writeln!(f, "{}", "-".repeat(30))?;
        field(f, "Build Version", self.build_version.as_deref())?;
        field(f, "Device Name", self.device_name.as_deref())?;
        field(f, "Display Name", self.display_name.as_deref())?;
        field(f, "GUID", self.guid.as_deref())?;
        field(f, "ICCID", self.iccid.as_deref())?;
        field(f, "IMEI", self.imei.as_deref())?;
        field(f, "Last Backup Date", self.last_backup().as_deref())?;
        field(f, "MEID", self.meid.as_deref())?;
        field(f, "Phone Number", self.phone_number.as_deref())?;
        let product = self.product_type.as_deref().map(|p| format!("{p} ({})", self.model()));
        field(f, "Product Type", product.as_deref())?;
        field(f, "Product Version", self.product_version.as_deref())?;
        field(f, "Serial Number", self.serial_number.as_deref())?;
        field(f, "Target Identifier", self.target_identifier.as_deref())?;
        field(f, "Target Type", self.target_type.as_deref())?;
        field(f, "Unique Identifier", self.unique_identifier.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Applications</key>
    <dict>
        <key>com.example.app</key>
        <dict>
            <key>iTunesMetadata</key>
            <data>AAAA</data>
        </dict>
    </dict>
    <key>Build Version</key>
    <string>17A577</string>
    <key>Device Name</key>
    <string>Pooh's iPhone</string>
    <key>Display Name</key>
    <string>Pooh's iPhone</string>
    <key>GUID</key>
    <string>0123456789ABCDEF0123456789ABCDEF</string>
    <key>Installed Applications</key>
    <array>
        <string>com.apple.mobilesafari</string>
        <string>com.example.app</string>
    </array>
    <key>Last Backup Date</key>
    <date>2020-10-01T12:30:00Z</date>
    <key>Product Type</key>
    <string>iPhone8,1</string>
    <key>Product Version</key>
    <string>13.1</string>
    <key>Serial Number</key>
    <string>F00BA4</string>
    <key>Target Type</key>
    <string>Device</string>
</dict>
</plist>"#;

    fn parse() -> DeviceInfo {
        plist::from_bytes(INFO_PLIST.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_fields() {
        let info = parse();
        assert_eq!(info.build_version.as_deref(), Some("17A577"));
        assert_eq!(info.product_type.as_deref(), Some("iPhone8,1"));
        assert_eq!(info.model(), "iPhone 6s");
        // Wi-Fi only: no cellular identifiers.
        assert!(info.imei.is_none());
        assert!(info.meid.is_none());
        assert_eq!(info.last_backup().as_deref(), Some("2020-10-01T12:30:00Z"));
    }

    #[test]
    fn test_applications() {
        let info = parse();
        let apps: Vec<_> = info.applications().collect();
        assert_eq!(
            apps,
            vec![
                Application { bundle_id: "com.apple.mobilesafari", app_store: false },
                Application { bundle_id: "com.example.app", app_store: true },
            ]
        );
    }

    #[test]
    fn test_summary() {
        let summary = parse().to_string();
        assert!(summary.starts_with("Applications:\n+ com.apple.mobilesafari\n+ com.example.app (App Store)\n"));
        assert!(summary.contains("Product Type:       iPhone8,1 (iPhone 6s)\n"));
        assert!(summary.contains("IMEI:               \n"));
        assert!(summary.ends_with("Unique Identifier:  \n"));
    }

    #[test]
    fn test_unknown_model() {
        let info = DeviceInfo { product_type: Some("iPhone99,1".to_string()), ..Default::default() };
        assert_eq!(info.model(), crate::UNKNOWN_DEVICE);
        assert!(info.to_string().contains("iPhone99,1 (Unknown Device)"));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INFO_FILENAME);
        std::fs::write(&path, INFO_PLIST).unwrap();
        let info = DeviceInfo::from_path(&path).unwrap();
        assert_eq!(info.device_name.as_deref(), Some("Pooh's iPhone"));
        std::fs::write(&path, "definitely not a plist").unwrap();
        let err = DeviceInfo::from_path(&path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPlist(_)));
    }
}
