//! Fixed root nodes and composite path resolution.
//!
//! A composite path names a root by its short identifier followed by a
//! `\`-separated relative path, e.g. `HKCU\Software\Vendor`. Resolution is
//! exact token matching: the leading segment must equal one of the known
//! identifiers. `HKPD` and `HKDD` are two identifiers for the same root.

use crate::access::AccessRights;
use crate::backend::RawHandle;
use crate::error::{RegistryError, Result};
use crate::key::RegistryKey;
use crate::value::{FromRegValue, RegValue, ValueType};

/// The fixed set of top-level entry points into the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootNode {
    /// Per-user trees, identifier `HKU`.
    Users,
    /// The current user's tree, identifier `HKCU`.
    CurrentUser,
    /// Class registrations, identifier `HKCR`.
    ClassesRoot,
    /// Machine-wide tree, identifier `HKLM`.
    LocalMachine,
    /// Current hardware profile, identifier `HKCC`.
    CurrentConfig,
    /// Performance counters, identifiers `HKPD` and `HKDD`.
    PerformanceData,
}

impl RootNode {
    /// Returns the canonical short identifier used in path strings.
    pub fn short_name(&self) -> &'static str {
        match self {
            RootNode::Users => "HKU",
            RootNode::CurrentUser => "HKCU",
            RootNode::ClassesRoot => "HKCR",
            RootNode::LocalMachine => "HKLM",
            RootNode::CurrentConfig => "HKCC",
            RootNode::PerformanceData => "HKPD",
        }
    }

    /// Returns the fixed pseudo-handle of this root.
    pub fn raw_handle(&self) -> RawHandle {
        match self {
            RootNode::Users => RawHandle::USERS,
            RootNode::CurrentUser => RawHandle::CURRENT_USER,
            RootNode::ClassesRoot => RawHandle::CLASSES_ROOT,
            RootNode::LocalMachine => RawHandle::LOCAL_MACHINE,
            RootNode::CurrentConfig => RawHandle::CURRENT_CONFIG,
            RootNode::PerformanceData => RawHandle::PERFORMANCE_DATA,
        }
    }

    /// Returns a non-owning handle to this root with full rights.
    ///
    /// Root handles are never closed; equality with other handles to the
    /// same root always holds.
    pub fn key(&self) -> RegistryKey {
        RegistryKey::root(self.raw_handle(), self.short_name())
    }
}

impl std::fmt::Display for RootNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Accepted path prefixes. Two identifiers alias PerformanceData.
const ROOT_TOKENS: [(&str, RootNode); 7] = [
    ("HKU", RootNode::Users),
    ("HKCU", RootNode::CurrentUser),
    ("HKCR", RootNode::ClassesRoot),
    ("HKLM", RootNode::LocalMachine),
    ("HKCC", RootNode::CurrentConfig),
    ("HKPD", RootNode::PerformanceData),
    ("HKDD", RootNode::PerformanceData),
];

/// Entry points addressing the store by composite path.
///
/// # Examples
///
/// ```rust
/// use reg_store::{AccessRights, Registry};
///
/// # fn main() -> reg_store::Result<()> {
/// let key = Registry::current_user()
///     .create_subkey_with("Software\\ResolverDoc", AccessRights::ALL)?;
/// key.set_string("greeting", "hello")?;
///
/// let greeting: String = Registry::get_value(
///     "HKCU\\Software\\ResolverDoc",
///     "greeting",
///     String::new(),
/// )?;
/// assert_eq!(greeting, "hello");
/// # Ok(())
/// # }
/// ```
pub struct Registry;

impl Registry {
    /// Handle to the Users root (`HKU`).
    pub fn users() -> RegistryKey {
        RootNode::Users.key()
    }

    /// Handle to the CurrentUser root (`HKCU`).
    pub fn current_user() -> RegistryKey {
        RootNode::CurrentUser.key()
    }

    /// Handle to the ClassesRoot root (`HKCR`).
    pub fn classes_root() -> RegistryKey {
        RootNode::ClassesRoot.key()
    }

    /// Handle to the LocalMachine root (`HKLM`).
    pub fn local_machine() -> RegistryKey {
        RootNode::LocalMachine.key()
    }

    /// Handle to the CurrentConfig root (`HKCC`).
    pub fn current_config() -> RegistryKey {
        RootNode::CurrentConfig.key()
    }

    /// Handle to the PerformanceData root (`HKPD`, alias `HKDD`).
    pub fn performance_data() -> RegistryKey {
        RootNode::PerformanceData.key()
    }

    /// Splits a composite path into its root and relative path.
    ///
    /// The leading segment must exactly equal one of the root identifiers,
    /// followed by a `\` separator or the end of the string. A bare
    /// identifier yields an empty relative path.
    ///
    /// # Errors
    ///
    /// Fails with [`RegistryError::InvalidArgument`] when the prefix matches
    /// no identifier.
    pub fn resolve(path: &str) -> Result<(RootNode, &str)> {
        for (token, root) in ROOT_TOKENS {
            if let Some(rest) = path.strip_prefix(token) {
                if rest.is_empty() {
                    return Ok((root, ""));
                }
                if let Some(relative) = rest.strip_prefix('\\') {
                    return Ok((root, relative));
                }
            }
        }
        Err(RegistryError::invalid_argument(format!(
            "path '{}' must start with a root identifier such as HKCU",
            path
        )))
    }

    /// Reads a value's tag and raw bytes from the key addressed by `path`.
    ///
    /// The key is opened read-only. A missing value is `Ok(None)`.
    pub fn get_raw(path: &str, value_name: &str) -> Result<Option<(ValueType, Vec<u8>)>> {
        let (root, relative) = Self::resolve(path)?;
        let key = root.key().open_subkey(relative)?;
        key.raw_value(value_name)
    }

    /// Reads a typed value from the key addressed by `path`, returning
    /// `default` when the value does not exist.
    ///
    /// The key is opened read-only.
    pub fn get_value<T: FromRegValue>(path: &str, value_name: &str, default: T) -> Result<T> {
        let (root, relative) = Self::resolve(path)?;
        let key = root.key().open_subkey(relative)?;
        key.get_value(value_name, default)
    }

    /// Writes a typed value to the key addressed by `path`.
    ///
    /// The key is opened with exactly `rights`; there is no automatic
    /// elevation, so the write only succeeds when the caller requests
    /// [`AccessRights::WRITE`] (or [`AccessRights::ALL`]).
    pub fn set_value(
        path: &str,
        value_name: &str,
        value: impl Into<RegValue>,
        rights: AccessRights,
    ) -> Result<bool> {
        let (root, relative) = Self::resolve(path)?;
        let key = root.key().open_subkey_with(relative, rights)?;
        key.set_value(value_name, value)
    }

    /// Serializes the entire store to a JSON snapshot.
    #[cfg(feature = "serde")]
    pub fn export_snapshot() -> Result<String> {
        crate::backend::export_snapshot().map_err(|_| RegistryError::Unknown)
    }

    /// Replaces the entire store with a previously exported snapshot.
    ///
    /// Handles opened before the import resolve against the imported tree;
    /// paths it does not contain report not-found from then on.
    #[cfg(feature = "serde")]
    pub fn import_snapshot(snapshot: &str) -> Result<()> {
        crate::backend::import_snapshot(snapshot)
            .map_err(|err| RegistryError::invalid_argument(format!("snapshot: {}", err)))
    }
}
