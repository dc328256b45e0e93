use derive_more::Display;

/// What kind of filesystem entity a manifest record describes.
///
/// Stored in the `flags` column of the manifest. Any other value is a
/// malformed record.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum EntryType {
    /// A regular file with a payload stored in the backup.
    #[display("file")]
    RegularFile = 1,
    /// A directory; there is no payload.
    #[display("directory")]
    Directory = 2,
    /// An item whose content was not included in the backup (e.g. because of
    /// its data protection class). Extracted as an empty file.
    #[display("protected placeholder")]
    ProtectedPlaceholder = 4,
}

impl EntryType {
    /// The raw value as stored in the manifest.
    pub fn flags(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for EntryType {
    /// The unrecognised raw value.
    type Error = i64;
    fn try_from(flags: i64) -> Result<Self, Self::Error> {
        match flags {
            1 => Ok(Self::RegularFile),
            2 => Ok(Self::Directory),
            4 => Ok(Self::ProtectedPlaceholder),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, EntryType::RegularFile)]
    #[case(2, EntryType::Directory)]
    #[case(4, EntryType::ProtectedPlaceholder)]
    fn test_known_flags(#[case] flags: i64, #[case] expected: EntryType) {
        assert_eq!(EntryType::try_from(flags), Ok(expected));
        assert_eq!(expected.flags(), flags);
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(8)]
    #[case(-1)]
    fn test_unknown_flags(#[case] flags: i64) {
        assert_eq!(EntryType::try_from(flags), Err(flags));
    }
}
