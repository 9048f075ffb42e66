//! Live key handles: ownership semantics and typed operations.
//!
//! A [`RegistryKey`] is an open (or closed) reference to one node of the
//! store. Opening the same logical node twice yields two independent handles
//! backed by independently allocated backend entries; there is no handle
//! caching or sharing.
//!
//! # Ownership
//!
//! Handles obtained from [`open_subkey`](RegistryKey::open_subkey) or
//! [`create_subkey`](RegistryKey::create_subkey) own their backend entry and
//! release it on drop. `Clone` produces a non-owning alias sharing the same
//! raw handle; dropping the alias never releases it. A move transfers
//! ownership as usual in Rust: no release runs for the moved-from binding.
//! Root handles are never owning and never closed.

use crate::access::AccessRights;
use crate::backend::{
    self, KeyInfo, RawHandle, STATUS_ACCESS_DENIED, STATUS_NOT_FOUND, STATUS_NO_MORE_ITEMS,
    STATUS_SUCCESS,
};
use crate::error::{RegistryError, Result};
use crate::value::{FromRegValue, RegValue, ValueType};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

/// An open or closed reference to a store node.
///
/// Access rights are fixed at open time and gate every mutating operation,
/// regardless of what the backend would permit. After [`close`](Self::close),
/// every operation fails with [`RegistryError::NullReference`].
#[derive(Debug)]
pub struct RegistryKey {
    /// Backend handle; null means closed.
    raw: RawHandle,

    /// Last path segment.
    name: String,

    /// Full path, always prefixed with the root identifier.
    path: String,

    /// Rights granted at open time.
    rights: AccessRights,

    /// True only for instances responsible for releasing the handle.
    owned: bool,
}

impl RegistryKey {
    /// Builds a non-owning handle for one of the root pseudo-handles.
    pub(crate) fn root(raw: RawHandle, name: &str) -> Self {
        Self {
            raw,
            name: name.to_string(),
            path: name.to_string(),
            rights: AccessRights::ALL,
            owned: false,
        }
    }

    fn child(&self, raw: RawHandle, subpath: &str, rights: AccessRights) -> Self {
        let leaf = subpath.rsplit('\\').next().unwrap_or(subpath);
        Self {
            raw,
            name: leaf.to_string(),
            path: format!("{}\\{}", self.path, subpath),
            rights,
            owned: true,
        }
    }

    fn ensure_open(&self) -> Result<RawHandle> {
        if self.raw.is_null() {
            Err(RegistryError::NullReference)
        } else {
            Ok(self.raw)
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.rights.can_write() {
            Ok(())
        } else {
            Err(RegistryError::AccessDenied)
        }
    }

    /// Returns the last path segment of this key.
    ///
    /// For example: a key at `HKLM\SOFTWARE\Microsoft` is named `Microsoft`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the full, root-prefixed path of this key.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the rights granted when this handle was opened.
    pub fn rights(&self) -> AccessRights {
        self.rights
    }

    /// Returns the raw backend handle.
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// Returns true if this handle has been closed (or moved out of).
    pub fn is_closed(&self) -> bool {
        self.raw.is_null()
    }

    /// Opens an existing child with read-only rights.
    ///
    /// See [`open_subkey_with`](Self::open_subkey_with).
    pub fn open_subkey(&self, name: &str) -> Result<RegistryKey> {
        self.open_subkey_with(name, AccessRights::READ)
    }

    /// Opens an existing child. `name` may span multiple segments.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NullReference`] if this handle is closed
    /// - [`RegistryError::InvalidArgument`] if `name` is empty
    /// - [`RegistryError::NotFound`] if the child does not exist
    /// - [`RegistryError::AccessDenied`] on permission failure
    /// - [`RegistryError::SystemCall`] for any other backend status
    #[instrument(skip(self), fields(path = %self.path))]
    pub fn open_subkey_with(&self, name: &str, rights: AccessRights) -> Result<RegistryKey> {
        self.try_open_subkey(name, rights)?
            .ok_or_else(|| RegistryError::not_found("key", name))
    }

    /// Opens an existing child, returning `Ok(None)` when it does not exist.
    pub fn try_open_subkey(&self, name: &str, rights: AccessRights) -> Result<Option<RegistryKey>> {
        let raw = self.ensure_open()?;
        if name.is_empty() {
            return Err(RegistryError::invalid_argument("subkey name is empty"));
        }

        match backend::open_key(raw, name) {
            Ok(handle) => Ok(Some(self.child(handle, name, rights))),
            Err(STATUS_NOT_FOUND) => Ok(None),
            Err(STATUS_ACCESS_DENIED) => Err(RegistryError::AccessDenied),
            Err(status) => Err(RegistryError::system(status)),
        }
    }

    /// Creates a child or opens it if it already exists, with read-only
    /// rights. See [`create_subkey_with`](Self::create_subkey_with).
    pub fn create_subkey(&self, name: &str) -> Result<RegistryKey> {
        self.create_subkey_with(name, AccessRights::READ)
    }

    /// Creates a child or opens it if it already exists.
    ///
    /// Opening an existing child is exactly equivalent to
    /// [`open_subkey_with`](Self::open_subkey_with); creating requires this
    /// handle to hold [`AccessRights::WRITE`]. Missing intermediate segments
    /// are created along with the final one.
    #[instrument(skip(self), fields(path = %self.path))]
    pub fn create_subkey_with(&self, name: &str, rights: AccessRights) -> Result<RegistryKey> {
        if let Some(existing) = self.try_open_subkey(name, rights)? {
            return Ok(existing);
        }

        self.ensure_writable()?;
        let raw = self.ensure_open()?;
        match backend::create_key(raw, name) {
            Ok((handle, created)) => {
                debug!(name, created, "created subkey");
                Ok(self.child(handle, name, rights))
            }
            Err(STATUS_ACCESS_DENIED) => Err(RegistryError::AccessDenied),
            Err(status) => Err(RegistryError::system(status)),
        }
    }

    /// Deletes a child and its subtree.
    ///
    /// Returns `Ok(false)` if the child does not exist, `Ok(true)` if it was
    /// removed. Requires [`AccessRights::WRITE`]; any other backend failure
    /// is reported as [`RegistryError::SystemCall`].
    pub fn delete_subkey(&self, name: &str) -> Result<bool> {
        let raw = self.ensure_open()?;
        self.ensure_writable()?;

        match backend::delete_key(raw, name) {
            Ok(()) => {
                debug!(name, "deleted subkey");
                Ok(true)
            }
            Err(STATUS_NOT_FOUND) => Ok(false),
            Err(status) => Err(RegistryError::system(status)),
        }
    }

    /// Reads a value's stored tag and an owned copy of its raw bytes.
    ///
    /// A missing value is `Ok(None)`, distinct from failure.
    pub fn raw_value(&self, name: &str) -> Result<Option<(ValueType, Vec<u8>)>> {
        let raw = self.ensure_open()?;
        match backend::query_value(raw, name) {
            Ok((tag, data)) => Ok(Some((ValueType::from_u32(tag)?, data))),
            Err(STATUS_NOT_FOUND) => Ok(None),
            Err(status) => Err(RegistryError::system(status)),
        }
    }

    /// Reads a value decoded as `T`, returning `default` when the value does
    /// not exist.
    ///
    /// The stored tag must be compatible with `T` per the marshaling table in
    /// [`FromRegValue`]; an incompatible combination fails with
    /// [`RegistryError::TypeMismatch`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reg_store::{AccessRights, Registry};
    ///
    /// # fn main() -> reg_store::Result<()> {
    /// let key = Registry::current_user()
    ///     .create_subkey_with("Software\\GetValueDoc", AccessRights::ALL)?;
    /// key.set_dword("answer", 42, false)?;
    ///
    /// let answer: i32 = key.get_value("answer", 0)?;
    /// assert_eq!(answer, 42);
    ///
    /// let missing: i32 = key.get_value("missing", -1)?;
    /// assert_eq!(missing, -1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_value<T: FromRegValue>(&self, name: &str, default: T) -> Result<T> {
        match self.raw_value(name)? {
            Some((tag, data)) => T::from_reg_value(tag, &data),
            None => Ok(default),
        }
    }

    /// Creates or replaces a value, encoding it to the canonical byte layout
    /// of its variant.
    ///
    /// Requires [`AccessRights::WRITE`] and an open handle. Returns whether
    /// the backend accepted the write; a backend refusal is `Ok(false)`, not
    /// an error.
    pub fn set_value(&self, name: &str, value: impl Into<RegValue>) -> Result<bool> {
        let raw = self.ensure_open()?;
        self.ensure_writable()?;

        let (tag, bytes) = value.into().into_tagged_bytes();
        Ok(backend::set_value(raw, name, tag.as_u32(), &bytes).is_ok())
    }

    /// Creates or replaces a text value (tag `REG_SZ`).
    pub fn set_string(&self, name: &str, value: &str) -> Result<bool> {
        self.set_value(name, value)
    }

    /// Creates or replaces a text list value (tag `REG_MULTI_SZ`).
    pub fn set_multi_string<S: AsRef<str>>(&self, name: &str, values: &[S]) -> Result<bool> {
        let items: Vec<String> = values.iter().map(|s| s.as_ref().to_string()).collect();
        self.set_value(name, RegValue::TextList(items))
    }

    /// Creates or replaces a 32-bit value (tag `REG_DWORD`, or
    /// `REG_DWORD_BIG_ENDIAN` when `big_endian` is set).
    pub fn set_dword(&self, name: &str, value: i32, big_endian: bool) -> Result<bool> {
        self.set_value(name, RegValue::Int32 { value, big_endian })
    }

    /// Creates or replaces a 64-bit value (tag `REG_QWORD`).
    pub fn set_qword(&self, name: &str, value: i64) -> Result<bool> {
        self.set_value(name, value)
    }

    /// Creates or replaces a floating-point value stored as its raw 8-byte
    /// image (tag `REG_BINARY`).
    pub fn set_double(&self, name: &str, value: f64) -> Result<bool> {
        self.set_value(name, value)
    }

    /// Creates or replaces a boolean value stored as one byte (tag
    /// `REG_BINARY`).
    pub fn set_bool(&self, name: &str, value: bool) -> Result<bool> {
        self.set_value(name, value)
    }

    /// Creates or replaces a raw binary value (tag `REG_BINARY`).
    pub fn set_binary(&self, name: &str, value: &[u8]) -> Result<bool> {
        self.set_value(name, value)
    }

    /// Deletes a value.
    ///
    /// Fails with [`RegistryError::NotFound`] if the value does not exist
    /// (unlike [`delete_subkey`](Self::delete_subkey), which reports absence
    /// as `Ok(false)`).
    pub fn delete_value(&self, name: &str) -> Result<bool> {
        let raw = self.ensure_open()?;
        self.ensure_writable()?;

        match backend::delete_value(raw, name) {
            Ok(()) => Ok(true),
            Err(STATUS_NOT_FOUND) => Err(RegistryError::not_found("value", name)),
            Err(_) => Ok(false),
        }
    }

    /// Returns the stored tag of a value without decoding its bytes.
    ///
    /// Fails with [`RegistryError::NotFound`] if the value does not exist.
    pub fn value_type(&self, name: &str) -> Result<ValueType> {
        let raw = self.ensure_open()?;
        match backend::query_value(raw, name) {
            Ok((tag, _)) => ValueType::from_u32(tag),
            Err(STATUS_NOT_FOUND) => Err(RegistryError::not_found("value", name)),
            Err(status) => Err(RegistryError::system(status)),
        }
    }

    /// Returns the names of all values of this key.
    ///
    /// Names are collected by repeated indexed queries until the backend
    /// signals the end of the sequence; any other status aborts the call.
    /// Order is stable within one call.
    pub fn value_names(&self) -> Result<Vec<String>> {
        let raw = self.ensure_open()?;
        let mut names = Vec::new();
        for index in 0.. {
            match backend::enum_value_name(raw, index) {
                Ok(name) => names.push(name),
                Err(STATUS_NO_MORE_ITEMS) => break,
                Err(status) => return Err(RegistryError::system(status)),
            }
        }
        Ok(names)
    }

    /// Returns the names of all children of this key.
    ///
    /// Same enumeration contract as [`value_names`](Self::value_names).
    pub fn subkey_names(&self) -> Result<Vec<String>> {
        let raw = self.ensure_open()?;
        let mut names = Vec::new();
        for index in 0.. {
            match backend::enum_key_name(raw, index) {
                Ok(name) => names.push(name),
                Err(STATUS_NO_MORE_ITEMS) => break,
                Err(status) => return Err(RegistryError::system(status)),
            }
        }
        Ok(names)
    }

    fn info(&self) -> Result<KeyInfo> {
        let raw = self.ensure_open()?;
        backend::query_info(raw).map_err(RegistryError::system)
    }

    /// Returns the number of direct children of this key.
    pub fn subkey_count(&self) -> Result<usize> {
        Ok(self.info()?.subkeys)
    }

    /// Returns the number of values of this key.
    pub fn value_count(&self) -> Result<usize> {
        Ok(self.info()?.values)
    }

    /// Returns the time of the most recent mutation of this key.
    pub fn last_write_time(&self) -> Result<DateTime<Utc>> {
        Ok(self.info()?.last_write)
    }

    /// Closes this handle. Idempotent; subsequent operations on this
    /// instance fail with [`RegistryError::NullReference`].
    pub fn close(&mut self) {
        if self.raw.is_null() {
            return;
        }
        let status = backend::close_key(self.raw);
        if status != STATUS_SUCCESS {
            warn!(status, path = %self.path, "close reported failure");
        }
        self.raw = RawHandle::NULL;
    }
}

/// Cloning yields a non-owning alias sharing the raw handle. The alias must
/// not release the handle; only the original owner does.
impl Clone for RegistryKey {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            name: self.name.clone(),
            path: self.path.clone(),
            rights: self.rights,
            owned: false,
        }
    }
}

/// Two handles are equal iff they reference the identical raw handle,
/// meaningful chiefly for the root pseudo-handles.
impl PartialEq for RegistryKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for RegistryKey {}

impl Drop for RegistryKey {
    fn drop(&mut self) {
        if self.owned && !self.raw.is_null() {
            let status = backend::close_key(self.raw);
            if status != STATUS_SUCCESS {
                warn!(status, path = %self.path, "failed to release key handle");
            }
        }
    }
}
