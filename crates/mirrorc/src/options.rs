//! Command-line flags.

use std::fmt;
use std::path::PathBuf;

use mirror_symbols::{DisplayOptions, SignatureOptions};

/// Parsed `mirror` invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub manifest: PathBuf,
    pub qualified: bool,
    pub compact: bool,
    /// Full metadata name (`Acme.Bag`1`) or simple name (`Bag`).
    pub type_filter: Option<String>,
    pub names: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionsError {
    MissingManifest,
    UnknownFlag(String),
    ExtraArgument(String),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::MissingManifest => write!(f, "missing manifest path"),
            OptionsError::UnknownFlag(flag) => write!(f, "unknown option '{flag}'"),
            OptionsError::ExtraArgument(arg) => {
                write!(f, "unexpected argument '{arg}' (only one manifest is read)")
            }
        }
    }
}

impl std::error::Error for OptionsError {}

impl CliOptions {
    /// Flags may appear before or after the manifest path.
    pub fn parse(args: &[String]) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        let mut manifest = None;
        for arg in args {
            if let Some(name) = arg.strip_prefix("--type=") {
                options.type_filter = Some(name.to_string());
            } else if arg == "--qualified" || arg == "-q" {
                options.qualified = true;
            } else if arg == "--compact" || arg == "-c" {
                options.compact = true;
            } else if arg == "--names" || arg == "-n" {
                options.names = true;
            } else if arg.starts_with('-') {
                return Err(OptionsError::UnknownFlag(arg.clone()));
            } else if manifest.is_none() {
                manifest = Some(PathBuf::from(arg));
            } else {
                return Err(OptionsError::ExtraArgument(arg.clone()));
            }
        }
        options.manifest = manifest.ok_or(OptionsError::MissingManifest)?;
        Ok(options)
    }

    pub fn signature_options(&self) -> SignatureOptions {
        SignatureOptions {
            fully_qualified: self.qualified,
            compact: self.compact,
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            fully_qualified: self.qualified,
            include_generic_arguments: true,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
