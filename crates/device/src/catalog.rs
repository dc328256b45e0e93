use std::collections::HashMap;
use std::sync::LazyLock;

/// Returned by [`lookup`] for hardware identifiers missing from the catalog.
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// Marketing names, each with every hardware identifier sold under it (radio
/// and storage variants of the same model get their own identifier).
const MODELS: &[(&str, &[&str])] = &[
    ("iPad", &["iPad1,1"]),
    ("iPad 2", &["iPad2,1", "iPad2,2", "iPad2,3", "iPad2,4"]),
    ("iPad (3rd Generation)", &["iPad3,1", "iPad3,2", "iPad3,3"]),
    ("iPad (4th Generation)", &["iPad3,4", "iPad3,5", "iPad3,6"]),
    ("iPad (5th Generation)", &["iPad6,11", "iPad6,12"]),
    ("iPad (6th Generation)", &["iPad7,5", "iPad7,6"]),
    ("iPad (7th Generation)", &["iPad7,11", "iPad7,12"]),
    ("iPad (8th Generation)", &["iPad11,6", "iPad11,7"]),
    ("iPad Air", &["iPad4,1", "iPad4,2", "iPad4,3"]),
    ("iPad Air 2", &["iPad5,3", "iPad5,4"]),
    ("iPad Air (3rd Generation)", &["iPad11,3", "iPad11,4"]),
    ("iPad Air (4th Generation)", &["iPad13,1", "iPad13,2"]),
    ("iPad Pro (12.9-inch)", &["iPad6,7", "iPad6,8"]),
    ("iPad Pro (9.7-inch)", &["iPad6,3", "iPad6,4"]),
    ("iPad Pro (12.9-inch 2nd Generation)", &["iPad7,1", "iPad7,2"]),
    ("iPad Pro (10.5-inch)", &["iPad7,3", "iPad7,4"]),
    ("iPad Pro (11-inch)", &["iPad8,1", "iPad8,2", "iPad8,3", "iPad8,4"]),
    ("iPad Pro (12.9-inch 3rd Generation)", &["iPad8,5", "iPad8,6", "iPad8,7", "iPad8,8"]),
    ("iPad Pro (11-inch 2nd Generation)", &["iPad8,9", "iPad8,10"]),
    ("iPad Pro (12.9-inch 4th Generation)", &["iPad8,11", "iPad8,12"]),
    ("iPad mini", &["iPad2,5", "iPad2,6", "iPad2,7"]),
    ("iPad mini 2", &["iPad4,4", "iPad4,5", "iPad4,6"]),
    ("iPad mini 3", &["iPad4,7", "iPad4,8", "iPad4,9"]),
    ("iPad mini 4", &["iPad5,1", "iPad5,2"]),
    ("iPad mini (5th Generation)", &["iPad11,1", "iPad11,2"]),
    ("iPhone 2G", &["iPhone1,1"]),
    ("iPhone 3G", &["iPhone1,2"]),
    ("iPhone 3GS", &["iPhone2,1"]),
    ("iPhone 4", &["iPhone3,1", "iPhone3,2", "iPhone3,3"]),
    ("iPhone 4S", &["iPhone4,1"]),
    ("iPhone 5", &["iPhone5,1", "iPhone5,2"]),
    ("iPhone 5c", &["iPhone5,3", "iPhone5,4"]),
    ("iPhone 5s", &["iPhone6,1", "iPhone6,2"]),
    ("iPhone 6", &["iPhone7,2"]),
    ("iPhone 6 Plus", &["iPhone7,1"]),
    ("iPhone 6s", &["iPhone8,1"]),
    ("iPhone 6s Plus", &["iPhone8,2"]),
    ("iPhone SE (1st Generation)", &["iPhone8,4"]),
    ("iPhone 7", &["iPhone9,1", "iPhone9,3"]),
    ("iPhone 7 Plus", &["iPhone9,2", "iPhone9,4"]),
    ("iPhone 8", &["iPhone10,1", "iPhone10,4"]),
    ("iPhone 8 Plus", &["iPhone10,2", "iPhone10,5"]),
    ("iPhone X", &["iPhone10,3", "iPhone10,6"]),
    ("iPhone XR", &["iPhone11,8"]),
    ("iPhone XS", &["iPhone11,2"]),
    ("iPhone XS Max", &["iPhone11,4", "iPhone11,6"]),
    ("iPhone 11", &["iPhone12,1"]),
    ("iPhone 11 Pro", &["iPhone12,3"]),
    ("iPhone 11 Pro Max", &["iPhone12,5"]),
    ("iPhone SE (2nd Generation)", &["iPhone12,8"]),
    ("iPhone 12 mini", &["iPhone13,1"]),
    ("iPhone 12", &["iPhone13,2"]),
    ("iPhone 12 Pro", &["iPhone13,3"]),
    ("iPhone 12 Pro Max", &["iPhone13,4"]),
];

static CATALOG: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    MODELS.iter().flat_map(|(name, identifiers)| identifiers.iter().map(move |id| (*id, *name))).collect()
});

/// Marketing name for a hardware identifier (the `Product Type` in
/// `Info.plist`, e.g. `"iPhone8,1"`).
///
/// Matching is exact. Unknown identifiers give [`UNKNOWN_DEVICE`]; an
/// unrecognised device should never get in the way of printing the rest.
///
/// ```
/// assert_eq!(unback_device::lookup("iPhone8,1"), "iPhone 6s");
/// assert_eq!(unback_device::lookup("iPhone8"), unback_device::UNKNOWN_DEVICE);
/// ```
pub fn lookup(identifier: &str) -> &'static str {
    CATALOG.get(identifier).copied().unwrap_or(UNKNOWN_DEVICE)
}
