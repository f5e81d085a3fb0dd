// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for EEPROM acquisition and validation

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for EEPROM operations
pub type Result<T> = std::result::Result<T, EepromError>;

/// Direction of a failed word transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Word read
    Read,
    /// Word write
    Write,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Errors that can occur while reading or validating an EEPROM image
#[derive(Debug, Error)]
pub enum EepromError {
    /// A backend word transfer did not complete
    #[error("EEPROM {access} failed at word {offset:#06x}: {reason}")]
    IoFailure {
        /// Transfer direction
        access: Access,
        /// Word offset that failed
        offset: u32,
        /// Backend-specific reason
        reason: String,
    },

    /// The init block does not start with the chip family magic
    #[error("Invalid EEPROM magic {found:#06x}, expected {expected:#06x}")]
    FormatMismatch {
        /// Magic word as read
        found: u16,
        /// Expected magic
        expected: u16,
    },

    /// Major version or revision outside the supported range
    #[error(
        "Bad EEPROM version {version:#06x} ({major}.{revision}), \
         supported: major {expected_major}, revision >= {min_revision}"
    )]
    VersionUnsupported {
        /// Raw version word
        version: u16,
        /// Observed major version
        major: u16,
        /// Observed revision
        revision: u16,
        /// Required major version
        expected_major: u16,
        /// Oldest supported revision
        min_revision: u16,
    },

    /// The calibration region does not fold to 0xffff
    #[error("Bad EEPROM checksum {computed:#06x} over {words} words")]
    ChecksumMismatch {
        /// Folded checksum
        computed: u16,
        /// Number of words folded
        words: usize,
    },

    /// A word buffer of the wrong size was handed to the deserializer
    #[error("EEPROM image is {len} words, expected {expected}")]
    ImageSize {
        /// Words present
        len: usize,
        /// Words required
        expected: usize,
    },

    /// I/O error outside of word transfers (sysfs, dump files)
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Device not found at the expected path
    #[error("Device not found: {path}")]
    DeviceNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Register space could not be mapped or accessed
    #[error("Register access failed: {reason}")]
    MapFailed {
        /// Reason for failure
        reason: String,
    },

    /// Dump file is not a sequence of 16-bit words
    #[error("Invalid EEPROM dump: {reason}")]
    InvalidDump {
        /// Reason for failure
        reason: String,
    },
}

impl EepromError {
    /// Create a failed word read error
    pub fn read_failed(offset: u32, reason: impl Into<String>) -> Self {
        Self::IoFailure {
            access: Access::Read,
            offset,
            reason: reason.into(),
        }
    }

    /// Create a failed word write error
    pub fn write_failed(offset: u32, reason: impl Into<String>) -> Self {
        Self::IoFailure {
            access: Access::Write,
            offset,
            reason: reason.into(),
        }
    }

    /// Create a device not found error
    pub fn device_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DeviceNotFound { path: path.into() }
    }

    /// Create a register mapping error
    pub fn map_failed(reason: impl Into<String>) -> Self {
        Self::MapFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid dump error
    pub fn invalid_dump(reason: impl Into<String>) -> Self {
        Self::InvalidDump {
            reason: reason.into(),
        }
    }

    /// Whether the error came from the transport rather than the image contents.
    ///
    /// Transport failures are worth retrying at the caller's discretion;
    /// content failures will reproduce on every read of the same chip.
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::IoFailure { .. } | Self::Io { .. } | Self::MapFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_diagnostics() {
        let e = EepromError::read_failed(0x42, "timeout");
        assert_eq!(e.to_string(), "EEPROM read failed at word 0x0042: timeout");
        assert!(e.is_transport());

        let e = EepromError::FormatMismatch {
            found: 0x1234,
            expected: 0xA55A,
        };
        assert_eq!(e.to_string(), "Invalid EEPROM magic 0x1234, expected 0xa55a");
        assert!(!e.is_transport());

        let e = EepromError::ChecksumMismatch {
            computed: 0xBEEF,
            words: 363,
        };
        assert!(e.to_string().contains("0xbeef"));
    }

    #[test]
    fn version_message_has_both_ranges() {
        let e = EepromError::VersionUnsupported {
            version: 0x1000,
            major: 1,
            revision: 0,
            expected_major: 14,
            min_revision: 1,
        };
        let msg = e.to_string();
        assert!(msg.contains("(1.0)"));
        assert!(msg.contains("major 14"));
        assert!(msg.contains("revision >= 1"));
    }
}
