//! # Registry-Style Hierarchical Key-Value Store
//!
//! Typed, hierarchical, persistent key-value access organized as a tree of
//! named keys, each holding typed values and child keys.
//!
//! ## Features
//!
//! - **Handle semantics**: open keys are live handles with explicit
//!   ownership; clones are non-owning aliases, drops release exactly once
//! - **Strict typing**: every value carries a backend tag; typed reads
//!   validate tag compatibility instead of coercing
//! - **Path resolution**: composite paths (`HKCU\Software\Vendor`) resolve
//!   against a fixed set of root identifiers
//! - **Owned results**: every query returns owned buffers; no shared scratch
//!   state between calls
//!
//! ## Architecture
//!
//! The crate is built in three layers:
//!
//! 1. **Backend** (`backend`): a process-wide tree behind a lock, exposed as
//!    flat, status-code-returning primitives over opaque handles
//! 2. **Key handles** (`key`): [`RegistryKey`] wraps a raw handle with
//!    ownership, access rights, and typed operations, and maps backend
//!    statuses to typed errors per operation
//! 3. **Root resolver** (`registry`): [`Registry`] maps composite path
//!    strings to one of six fixed roots plus a relative path and delegates
//!    to a key handle
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use reg_store::{AccessRights, Registry};
//!
//! # fn main() -> reg_store::Result<()> {
//! let software = Registry::current_user()
//!     .create_subkey_with("Software\\CrateDoc", AccessRights::ALL)?;
//!
//! software.set_string("install_dir", "C:\\Tools")?;
//! software.set_dword("launch_count", 3, false)?;
//!
//! let dir: String = software.get_value("install_dir", String::new())?;
//! assert_eq!(dir, "C:\\Tools");
//!
//! for name in software.value_names()? {
//!     println!("{}", name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Addressing by Path
//!
//! ```rust
//! use reg_store::{AccessRights, Registry, RootNode};
//!
//! # fn main() -> reg_store::Result<()> {
//! let (root, relative) = Registry::resolve("HKLM\\SOFTWARE\\Vendor")?;
//! assert_eq!(root, RootNode::LocalMachine);
//! assert_eq!(relative, "SOFTWARE\\Vendor");
//!
//! Registry::local_machine().create_subkey_with(relative, AccessRights::ALL)?;
//! Registry::set_value("HKLM\\SOFTWARE\\Vendor", "edition", "pro", AccessRights::ALL)?;
//! let edition: String =
//!     Registry::get_value("HKLM\\SOFTWARE\\Vendor", "edition", String::new())?;
//! assert_eq!(edition, "pro");
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported Value Types
//!
//! Binary, text (`REG_SZ` class), text lists (`REG_MULTI_SZ` class), 32-bit
//! integers (native or big-endian tag), 64-bit integers, doubles and
//! booleans (raw byte image under `REG_BINARY`). See [`RegValue`] for the
//! canonical layouts and [`FromRegValue`] for the read compatibility table.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod backend;
pub mod error;
pub mod key;
pub mod registry;
pub mod utils;
pub mod value;

// Re-export main types for convenience
pub use access::AccessRights;
pub use backend::{
    status_message, KeyInfo, NativeStatus, RawHandle, STATUS_ACCESS_DENIED,
    STATUS_INVALID_ARGUMENT, STATUS_INVALID_HANDLE, STATUS_NOT_FOUND, STATUS_NO_MORE_ITEMS,
    STATUS_SUCCESS,
};
pub use error::{compose_message, RegistryError, Result};
pub use key::RegistryKey;
pub use registry::{Registry, RootNode};
pub use value::{FromRegValue, RegValue, ValueType};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
