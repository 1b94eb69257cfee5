//! Decoder configuration
//!
//! Controls which class-file versions are accepted and how much semantic checking the
//! decoder performs on top of the structural checks it always does.

/// Oldest major version ever emitted (JDK 1.0.2)
pub const MIN_MAJOR_VERSION: u16 = 45;

/// Newest major version known to this decoder (Java 25)
pub const MAX_MAJOR_VERSION: u16 = 69;

/// First major version whose minor version is restricted to `0` or the preview marker
pub const PREVIEW_GATED_MAJOR: u16 = 56;

/// Minor version marking a class compiled with preview features
pub const PREVIEW_MINOR_VERSION: u16 = 0xFFFF;

/// Configuration for class-file decoding
///
/// The decoder always validates:
/// - Magic number and bounds of every read
/// - Constant pool tags, slot layout and cross references
/// - Field and method descriptors of the class's own members
/// - That every count-prefixed section is consumed exactly
///
/// The flags below add checks that cost extra work per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Lowest accepted major version (inclusive)
    pub min_major_version: u16,

    /// Highest accepted major version (inclusive)
    pub max_major_version: u16,

    /// Accept classes compiled with `--enable-preview` (minor version `0xFFFF`)
    pub allow_preview: bool,

    /// Parse every class name and NameAndType/MethodType descriptor in the constant pool
    pub validate_descriptors: bool,

    /// Walk every Code attribute once to check that it ends on an instruction boundary
    pub validate_code: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            min_major_version: MIN_MAJOR_VERSION,
            max_major_version: MAX_MAJOR_VERSION,
            allow_preview: true,
            validate_descriptors: true,
            validate_code: true,
        }
    }
}

impl DecoderConfig {
    /// Creates a strict configuration
    ///
    /// Same checks as the default, but classes compiled with preview features are rejected.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            allow_preview: false,
            ..Self::default()
        }
    }

    /// Creates a lenient configuration for maximum throughput
    ///
    /// Accepts any major version from 45 upwards and skips descriptor and code
    /// pre-validation. Descriptor or bytecode problems then surface while scanning.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            min_major_version: MIN_MAJOR_VERSION,
            max_major_version: u16::MAX,
            allow_preview: true,
            validate_descriptors: false,
            validate_code: false,
        }
    }

    /// Restrict the accepted major version range
    #[must_use]
    pub fn with_versions(mut self, min_major: u16, max_major: u16) -> Self {
        self.min_major_version = min_major;
        self.max_major_version = max_major;
        self
    }

    /// Check a `(major, minor)` pair against this configuration, describing the reason on failure.
    pub(crate) fn check_version(&self, major: u16, minor: u16) -> Result<(), String> {
        if major < self.min_major_version || major > self.max_major_version {
            return Err(format!(
                "expected major version {}..={}, found {}",
                self.min_major_version, self.max_major_version, major
            ));
        }

        if major >= PREVIEW_GATED_MAJOR && minor != 0 {
            if minor != PREVIEW_MINOR_VERSION {
                return Err(format!(
                    "expected minor version 0 or 0x{PREVIEW_MINOR_VERSION:X} for major {major}, found {minor}"
                ));
            }
            if !self.allow_preview {
                return Err(format!("preview class files are not accepted (major {major})"));
            }
        }

        Ok(())
    }
}
