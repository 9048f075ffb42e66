//! Access rights granted to a key handle at open time.

use bitflags::bitflags;

bitflags! {
    /// Rights a handle holds over its key.
    ///
    /// Rights are fixed when the handle is opened and gate every mutating
    /// operation at the handle layer, regardless of what the backend itself
    /// would permit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessRights: u32 {
        /// Read values, enumerate children, query metadata.
        const READ = 0x01;
        /// Create and delete children, write and delete values.
        const WRITE = 0x10;
        /// Both [`AccessRights::READ`] and [`AccessRights::WRITE`].
        const ALL = Self::READ.bits() | Self::WRITE.bits();
    }
}

impl Default for AccessRights {
    fn default() -> Self {
        AccessRights::READ
    }
}

impl AccessRights {
    /// Returns true if the handle may perform mutating operations.
    pub fn can_write(&self) -> bool {
        self.contains(AccessRights::WRITE)
    }
}
