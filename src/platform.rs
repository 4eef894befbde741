//! Machine identifiers, tags, and detection of the current machine.
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::PlatformError;

/// Path of the system identification file read on Linux.
const OS_RELEASE: &str = "/etc/os-release";

/// Known machine/distro identifiers.
///
/// This is the single closed set shared by manifest validation, build-command
/// resolution, and machine detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MachineId {
    /// Alpine Linux.
    Alpine,
    /// Arch Linux.
    Arch,
    /// CentOS / CentOS Stream.
    Centos,
    /// macOS.
    Darwin,
    /// Debian.
    Debian,
    /// Fedora.
    Fedora,
    /// Gentoo.
    Gentoo,
    /// Manjaro.
    Manjaro,
    /// NixOS.
    Nixos,
    /// openSUSE.
    Opensuse,
    /// Ubuntu.
    Ubuntu,
    /// Void Linux.
    Void,
    /// Windows.
    Windows,
}

impl MachineId {
    /// Every supported identifier, in name order.
    pub const ALL: &'static [Self] = &[
        Self::Alpine,
        Self::Arch,
        Self::Centos,
        Self::Darwin,
        Self::Debian,
        Self::Fedora,
        Self::Gentoo,
        Self::Manjaro,
        Self::Nixos,
        Self::Opensuse,
        Self::Ubuntu,
        Self::Void,
        Self::Windows,
    ];

    /// The identifier as it appears in manifests and script file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alpine => "alpine",
            Self::Arch => "arch",
            Self::Centos => "centos",
            Self::Darwin => "darwin",
            Self::Debian => "debian",
            Self::Fedora => "fedora",
            Self::Gentoo => "gentoo",
            Self::Manjaro => "manjaro",
            Self::Nixos => "nixos",
            Self::Opensuse => "opensuse",
            Self::Ubuntu => "ubuntu",
            Self::Void => "void",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineId {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PlatformError::UnknownMachine(s.to_string()))
    }
}

/// A tag on a config entry or a key of a manifest's `builds` table.
///
/// # Examples
///
/// ```
/// use dotfiles_components::platform::{MachineId, Tag};
///
/// assert_eq!("*".parse::<Tag>().unwrap(), Tag::Any);
/// assert_eq!("arch".parse::<Tag>().unwrap(), Tag::Machine(MachineId::Arch));
/// assert!("beos".parse::<Tag>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// The wildcard `*`.
    Any,
    /// A specific machine identifier.
    Machine(MachineId),
}

impl Tag {
    /// Literal used for the wildcard tag.
    pub const WILDCARD: &'static str = "*";

    /// Whether an entry carrying this tag applies to `machine`.
    #[must_use]
    pub fn applies_to(self, machine: MachineId) -> bool {
        match self {
            Self::Any => true,
            Self::Machine(id) => id == machine,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(Self::WILDCARD),
            Self::Machine(id) => id.fmt(f),
        }
    }
}

impl FromStr for Tag {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::WILDCARD {
            Ok(Self::Any)
        } else {
            s.parse().map(Self::Machine)
        }
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Platform information for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Detected or simulated machine identifier.
    pub machine: MachineId,
}

impl Platform {
    /// Create a platform with an explicit identifier (used for `--machine`).
    #[must_use]
    pub const fn new(machine: MachineId) -> Self {
        Self { machine }
    }

    /// Detect the current machine.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS identification file cannot be read or names
    /// a distribution outside the supported set.
    pub fn detect() -> Result<Self, PlatformError> {
        if cfg!(target_os = "macos") {
            Ok(Self::new(MachineId::Darwin))
        } else if cfg!(target_os = "windows") {
            Ok(Self::new(MachineId::Windows))
        } else {
            Self::from_os_release(Path::new(OS_RELEASE))
        }
    }

    /// Read the distribution identifier from an `os-release` style file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, has no `ID=` line, or the
    /// identifier is not a supported machine.
    pub fn from_os_release(path: &Path) -> Result<Self, PlatformError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlatformError::DetectionFailed(format!("reading {}: {e}", path.display()))
        })?;
        let id = parse_os_release_id(&content).ok_or_else(|| {
            PlatformError::DetectionFailed(format!("no ID field in {}", path.display()))
        })?;
        id.parse().map(Self::new)
    }
}

/// Extract the value of the `ID=` field from `os-release` content.
///
/// Surrounding single or double quotes are stripped. Returns `None` when the
/// field is absent or empty.
#[must_use]
pub fn parse_os_release_id(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ID="))
        .map(|value| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .find(|value| !value.is_empty())
}
