//! Identifiers for interactable types and spawned instances

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one class of trackable interactable ("lockbox", "free_chest").
///
/// Unique per registration and used as the lookup key everywhere.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct InteractableTypeId(Box<str>);

impl InteractableTypeId {
    /// Create a new type id
    pub fn new(name: &str) -> Self {
        Self(name.into())
    }

    /// Get the name
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InteractableTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InteractableTypeId({:?})", self.0)
    }
}

impl fmt::Display for InteractableTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InteractableTypeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InteractableTypeId {
    fn from(s: String) -> Self {
        Self(s.into_boxed_str())
    }
}

impl AsRef<str> for InteractableTypeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for InteractableTypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Opaque reference to one spawned interactable instance.
///
/// Stands in for a host engine object reference. The tracker never owns the
/// underlying object; a handle may outlive it and simply stop resolving.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    /// Create a handle from raw bits
    #[inline]
    pub const fn from_raw(bits: u64) -> Self {
        Self(bits)
    }

    /// Get the raw bits
    #[inline]
    pub const fn to_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceHandle({:#x})", self.0)
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for InstanceHandle {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

/// Thread-safe handle allocator for hosts without their own object ids
pub struct HandleAllocator {
    next: AtomicU64,
}

impl HandleAllocator {
    /// Create a new allocator, starting at 1
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next unique handle
    pub fn allocate(&self) -> InstanceHandle {
        InstanceHandle(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate a batch of consecutive handles
    pub fn allocate_batch(&self, count: u32) -> impl Iterator<Item = InstanceHandle> {
        let start = self.next.fetch_add(count as u64, Ordering::Relaxed);
        (0..count as u64).map(move |i| InstanceHandle(start + i))
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}
