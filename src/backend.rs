//! Backend store primitives and native status codes.
//!
//! The store is a process-wide tree of named nodes behind a lock, exposed
//! through a narrow, status-code-based surface that mirrors the native
//! registry API shape: flat functions over opaque handles, with failures
//! reported as [`NativeStatus`] codes. The core handle layer
//! ([`RegistryKey`](crate::RegistryKey)) maps these statuses to typed errors
//! per operation.
//!
//! Every query returns owned buffers; no scratch state is shared between
//! calls, so holding a result across an overlapping call from another thread
//! is safe.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{OnceLock, RwLock};
use tracing::trace;

/// Native status code reported by backend primitives.
pub type NativeStatus = i32;

/// The operation completed successfully.
pub const STATUS_SUCCESS: NativeStatus = 0;
/// The addressed key or value does not exist.
pub const STATUS_NOT_FOUND: NativeStatus = 2;
/// The backend refused the operation.
pub const STATUS_ACCESS_DENIED: NativeStatus = 5;
/// The handle does not refer to a live table entry or root.
pub const STATUS_INVALID_HANDLE: NativeStatus = 6;
/// A primitive argument was rejected.
pub const STATUS_INVALID_ARGUMENT: NativeStatus = 87;
/// Enumeration reached the end of the sequence.
pub const STATUS_NO_MORE_ITEMS: NativeStatus = 259;

/// Returns the display text for a native status code.
pub fn status_message(status: NativeStatus) -> &'static str {
    match status {
        STATUS_SUCCESS => "the operation completed successfully",
        STATUS_NOT_FOUND => "the specified key or value does not exist",
        STATUS_ACCESS_DENIED => "access is denied",
        STATUS_INVALID_HANDLE => "the handle is invalid",
        STATUS_INVALID_ARGUMENT => "the parameter is incorrect",
        STATUS_NO_MORE_ITEMS => "no more data is available",
        _ => "unrecognized status code",
    }
}

/// Opaque backend handle value.
///
/// The six roots are fixed pseudo-handles that are never table-allocated and
/// never released; every opened key gets a freshly allocated id, so two opens
/// of the same logical node yield distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(u32);

impl RawHandle {
    /// The null handle. A key whose handle is null is closed.
    pub const NULL: RawHandle = RawHandle(0);
    /// Pseudo-handle of the ClassesRoot tree.
    pub const CLASSES_ROOT: RawHandle = RawHandle(0x8000_0000);
    /// Pseudo-handle of the CurrentUser tree.
    pub const CURRENT_USER: RawHandle = RawHandle(0x8000_0001);
    /// Pseudo-handle of the LocalMachine tree.
    pub const LOCAL_MACHINE: RawHandle = RawHandle(0x8000_0002);
    /// Pseudo-handle of the Users tree.
    pub const USERS: RawHandle = RawHandle(0x8000_0003);
    /// Pseudo-handle of the PerformanceData tree.
    pub const PERFORMANCE_DATA: RawHandle = RawHandle(0x8000_0004);
    /// Pseudo-handle of the CurrentConfig tree.
    pub const CURRENT_CONFIG: RawHandle = RawHandle(0x8000_0005);

    /// Returns true for the null handle.
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true for one of the six root pseudo-handles.
    pub fn is_pseudo(&self) -> bool {
        (0x8000_0000..=0x8000_0005).contains(&self.0)
    }

    fn root_index(&self) -> Option<usize> {
        if self.is_pseudo() {
            Some((self.0 - 0x8000_0000) as usize)
        } else {
            None
        }
    }
}

/// Metadata snapshot of a key, returned by [`query_info`].
#[derive(Debug, Clone, Copy)]
pub struct KeyInfo {
    /// Number of direct children.
    pub subkeys: usize,
    /// Number of values.
    pub values: usize,
    /// Timestamp of the most recent mutation of the key.
    pub last_write: DateTime<Utc>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct StoredValue {
    tag: u32,
    data: Vec<u8>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Node {
    values: BTreeMap<String, StoredValue>,
    children: BTreeMap<String, Node>,
    last_write: DateTime<Utc>,
}

impl Node {
    fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            children: BTreeMap::new(),
            last_write: Utc::now(),
        }
    }
}

/// An open handle-table entry: the root tree plus the absolute segment path.
///
/// Entries address nodes by path rather than by reference, so a node deleted
/// underneath a live handle simply resolves to `STATUS_NOT_FOUND` afterwards.
#[derive(Debug, Clone)]
struct HandleEntry {
    root: usize,
    path: Vec<String>,
}

struct Store {
    roots: [Node; 6],
    handles: HashMap<u32, HandleEntry>,
    next_handle: u32,
}

impl Store {
    fn new() -> Self {
        Self {
            roots: [
                Node::new(),
                Node::new(),
                Node::new(),
                Node::new(),
                Node::new(),
                Node::new(),
            ],
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Resolves a handle to its root index and owned segment path.
    fn target(&self, handle: RawHandle) -> Result<(usize, Vec<String>), NativeStatus> {
        if let Some(root) = handle.root_index() {
            return Ok((root, Vec::new()));
        }
        match self.handles.get(&handle.0) {
            Some(entry) => Ok((entry.root, entry.path.clone())),
            None => Err(STATUS_INVALID_HANDLE),
        }
    }

    fn node_at(&self, root: usize, path: &[String]) -> Result<&Node, NativeStatus> {
        let mut node = &self.roots[root];
        for segment in path {
            node = node.children.get(segment).ok_or(STATUS_NOT_FOUND)?;
        }
        Ok(node)
    }

    fn node_at_mut(&mut self, root: usize, path: &[String]) -> Result<&mut Node, NativeStatus> {
        let mut node = &mut self.roots[root];
        for segment in path {
            node = node.children.get_mut(segment).ok_or(STATUS_NOT_FOUND)?;
        }
        Ok(node)
    }

    fn node(&self, handle: RawHandle) -> Result<&Node, NativeStatus> {
        let (root, path) = self.target(handle)?;
        self.node_at(root, &path)
    }

    fn node_mut(&mut self, handle: RawHandle) -> Result<&mut Node, NativeStatus> {
        let (root, path) = self.target(handle)?;
        self.node_at_mut(root, &path)
    }

    fn alloc(&mut self, entry: HandleEntry) -> RawHandle {
        let id = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(id, entry);
        RawHandle(id)
    }
}

fn store() -> &'static RwLock<Store> {
    static STORE: OnceLock<RwLock<Store>> = OnceLock::new();
    STORE.get_or_init(|| RwLock::new(Store::new()))
}

/// Splits a relative path into its non-empty segments.
fn split_segments(path: &str) -> Vec<String> {
    path.split('\\')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Opens an existing key below `parent` and allocates a fresh handle for it.
///
/// `subpath` may span multiple segments. An empty `subpath` yields a new
/// handle aliasing the parent's node.
pub fn open_key(parent: RawHandle, subpath: &str) -> Result<RawHandle, NativeStatus> {
    let mut store = store().write().expect("store lock poisoned");
    let (root, mut path) = store.target(parent)?;
    path.extend(split_segments(subpath));
    store.node_at(root, &path)?;
    let handle = store.alloc(HandleEntry { root, path });
    trace!(handle = ?handle, subpath, "opened key");
    Ok(handle)
}

/// Opens `subpath` below `parent`, creating any missing segments.
///
/// This is a single atomic open-or-create primitive: no separate existence
/// probe is needed. The returned flag is true when the final segment was
/// created by this call.
pub fn create_key(parent: RawHandle, subpath: &str) -> Result<(RawHandle, bool), NativeStatus> {
    let mut store = store().write().expect("store lock poisoned");
    let (root, base) = store.target(parent)?;
    let segments = split_segments(subpath);

    let now = Utc::now();
    let mut created = false;
    {
        let mut node = store.node_at_mut(root, &base)?;
        for segment in segments.iter() {
            created = !node.children.contains_key(segment);
            if created {
                node.last_write = now;
            }
            node = node
                .children
                .entry(segment.clone())
                .or_insert_with(Node::new);
        }
    }

    let mut path = base;
    path.extend(segments);
    let handle = store.alloc(HandleEntry { root, path });
    trace!(handle = ?handle, subpath, created, "created or opened key");
    Ok((handle, created))
}

/// Deletes the key addressed by `subpath` below `parent`, with its subtree.
pub fn delete_key(parent: RawHandle, subpath: &str) -> Result<(), NativeStatus> {
    let segments = split_segments(subpath);
    let (last, ancestors) = match segments.split_last() {
        Some(parts) => parts,
        None => return Err(STATUS_INVALID_ARGUMENT),
    };

    let mut store = store().write().expect("store lock poisoned");
    let (root, mut path) = store.target(parent)?;
    path.extend(ancestors.iter().cloned());
    let node = store.node_at_mut(root, &path)?;
    if node.children.remove(last).is_none() {
        return Err(STATUS_NOT_FOUND);
    }
    node.last_write = Utc::now();
    trace!(subpath, "deleted key");
    Ok(())
}

/// Reads a value's tag and an owned copy of its bytes.
pub fn query_value(handle: RawHandle, name: &str) -> Result<(u32, Vec<u8>), NativeStatus> {
    let store = store().read().expect("store lock poisoned");
    let node = store.node(handle)?;
    match node.values.get(name) {
        Some(value) => Ok((value.tag, value.data.clone())),
        None => Err(STATUS_NOT_FOUND),
    }
}

/// Creates or replaces a value.
pub fn set_value(handle: RawHandle, name: &str, tag: u32, data: &[u8]) -> Result<(), NativeStatus> {
    let mut store = store().write().expect("store lock poisoned");
    let node = store.node_mut(handle)?;
    node.values.insert(
        name.to_string(),
        StoredValue {
            tag,
            data: data.to_vec(),
        },
    );
    node.last_write = Utc::now();
    Ok(())
}

/// Deletes a value.
pub fn delete_value(handle: RawHandle, name: &str) -> Result<(), NativeStatus> {
    let mut store = store().write().expect("store lock poisoned");
    let node = store.node_mut(handle)?;
    if node.values.remove(name).is_none() {
        return Err(STATUS_NOT_FOUND);
    }
    node.last_write = Utc::now();
    Ok(())
}

/// Returns the name of the child at `index`, or `STATUS_NO_MORE_ITEMS` past
/// the end. Order is stable for an unmodified key.
pub fn enum_key_name(handle: RawHandle, index: usize) -> Result<String, NativeStatus> {
    let store = store().read().expect("store lock poisoned");
    let node = store.node(handle)?;
    node.children
        .keys()
        .nth(index)
        .cloned()
        .ok_or(STATUS_NO_MORE_ITEMS)
}

/// Returns the name of the value at `index`, or `STATUS_NO_MORE_ITEMS` past
/// the end. Order is stable for an unmodified key.
pub fn enum_value_name(handle: RawHandle, index: usize) -> Result<String, NativeStatus> {
    let store = store().read().expect("store lock poisoned");
    let node = store.node(handle)?;
    node.values
        .keys()
        .nth(index)
        .cloned()
        .ok_or(STATUS_NO_MORE_ITEMS)
}

/// Returns child count, value count and last-write time in one query.
pub fn query_info(handle: RawHandle) -> Result<KeyInfo, NativeStatus> {
    let store = store().read().expect("store lock poisoned");
    let node = store.node(handle)?;
    Ok(KeyInfo {
        subkeys: node.children.len(),
        values: node.values.len(),
        last_write: node.last_write,
    })
}

/// Releases a table-allocated handle. Pseudo-handles are never released and
/// closing one is a successful no-op.
pub fn close_key(handle: RawHandle) -> NativeStatus {
    if handle.is_pseudo() {
        return STATUS_SUCCESS;
    }
    if handle.is_null() {
        return STATUS_INVALID_HANDLE;
    }
    let mut store = store().write().expect("store lock poisoned");
    match store.handles.remove(&handle.0) {
        Some(_) => STATUS_SUCCESS,
        None => STATUS_INVALID_HANDLE,
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct Snapshot {
    classes_root: Node,
    current_user: Node,
    local_machine: Node,
    users: Node,
    performance_data: Node,
    current_config: Node,
}

/// Serializes the entire store to JSON.
#[cfg(feature = "serde")]
pub fn export_snapshot() -> Result<String, serde_json::Error> {
    let store = store().read().expect("store lock poisoned");
    let snapshot = Snapshot {
        classes_root: store.roots[0].clone(),
        current_user: store.roots[1].clone(),
        local_machine: store.roots[2].clone(),
        users: store.roots[3].clone(),
        performance_data: store.roots[4].clone(),
        current_config: store.roots[5].clone(),
    };
    serde_json::to_string(&snapshot)
}

/// Replaces the entire store with a previously exported snapshot.
///
/// Handles opened before the import keep addressing by path; a path absent
/// from the imported tree resolves to `STATUS_NOT_FOUND` afterwards.
#[cfg(feature = "serde")]
pub fn import_snapshot(json: &str) -> Result<(), serde_json::Error> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    let mut store = store().write().expect("store lock poisoned");
    store.roots = [
        snapshot.classes_root,
        snapshot.current_user,
        snapshot.local_machine,
        snapshot.users,
        snapshot.performance_data,
        snapshot.current_config,
    ];
    Ok(())
}
