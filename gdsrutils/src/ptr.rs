//!
//! # Shared-Pointer Types
//!

// Std-lib
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

// Crates.io
use by_address::ByAddress;

///
/// # Ptr
///
/// Thread-safe, reference-counted, shared handle to a `T`.
/// Layout cells are the primary use-case: a [Ptr] to a cell may be held
/// by its library and by any number of references which place it.
/// Mutation through any alias is visible through all of them.
///
/// Access goes through the inner [RwLock], forwarded via [Deref]:
///
/// ```text
/// let cell = ptr.read()?;
/// let name = cell.name();
/// ```
///
/// Comparisons and hashes are *by address*, not by value.
/// Two [Ptr]s are equal only if they point to the same allocation.
/// This makes them suitable as hash-keys for tree walks in which many nodes are shared.
///
#[derive(Debug, Default)]
pub struct Ptr<T: ?Sized>(ByAddress<Arc<RwLock<T>>>);

impl<T> Ptr<T> {
    /// Pointer Constructor
    pub fn new(t: T) -> Self {
        Self(ByAddress(Arc::new(RwLock::new(t))))
    }
    /// Read access which recovers the data from a poisoned lock.
    /// For use in infallible contexts such as `PartialEq` and `Display`.
    pub fn read_or_recover(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }
    /// Non-blocking read access, recovering from poisoned locks.
    /// Returns `None` if the lock is currently held for writing.
    pub fn try_read_or_recover(&self) -> Option<RwLockReadGuard<'_, T>> {
        match self.0.try_read() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
    /// Write access which recovers the data from a poisoned lock.
    pub fn write_or_recover(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
    /// Boolean indication of whether `self` and `other` share an allocation.
    /// Equivalent to `==`, spelled out for readability at call-sites.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0 .0, &other.0 .0)
    }
    /// Number of live handles to the shared data
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}
impl<T> From<T> for Ptr<T> {
    fn from(t: T) -> Self {
        Self::new(t)
    }
}
impl<T: ?Sized> Deref for Ptr<T> {
    type Target = RwLock<T>;
    fn deref(&self) -> &Self::Target {
        &self.0 .0
    }
}
// [Deref] gets in the way of deriving these, so they are written out.
impl<T: ?Sized> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self(ByAddress::clone(&self.0))
    }
}
impl<T: ?Sized> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<T: ?Sized> Eq for Ptr<T> {}
impl<T: ?Sized> Hash for Ptr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

///
/// # Pointer List
///
/// Insertion-ordered list of [Ptr]s.
/// Adding a value returns a handle to it.
/// Other methods pass through to the underlying [Vec] via [Deref].
///
#[derive(Debug, Clone)]
pub struct PtrList<T>(Vec<Ptr<T>>);

impl<T> PtrList<T> {
    /// Create a new and empty [PtrList]. Also available via [Default].
    pub fn new() -> Self {
        Self(Vec::new())
    }
    /// Create a [PtrList] from owned `T`s.
    pub fn from_owned(vals: Vec<T>) -> Self {
        Self(vals.into_iter().map(Ptr::new).collect())
    }
    /// Add a `T`-convertible value, returning a handle to it.
    pub fn add(&mut self, t: impl Into<T>) -> Ptr<T> {
        let ptr = Ptr::new(t.into());
        self.0.push(ptr.clone());
        ptr
    }
    /// Push an existing [Ptr], sharing it with its other holders.
    pub fn add_ptr(&mut self, ptr: Ptr<T>) -> Ptr<T> {
        self.0.push(ptr.clone());
        ptr
    }
    /// Index of the entry pointing to the same allocation as `ptr`, if any
    pub fn position_of(&self, ptr: &Ptr<T>) -> Option<usize> {
        self.0.iter().position(|p| p == ptr)
    }
    /// Remove the entry pointing to the same allocation as `ptr`.
    /// Returns it if it was present.
    pub fn remove_ptr(&mut self, ptr: &Ptr<T>) -> Option<Ptr<T>> {
        let idx = self.position_of(ptr)?;
        Some(self.0.remove(idx))
    }
    /// Index of the first entry whose value satisfies `f`.
    /// Reads each entry through [Ptr::read_or_recover].
    pub fn position_where(&self, f: impl Fn(&T) -> bool) -> Option<usize> {
        self.0.iter().position(|p| f(&*p.read_or_recover()))
    }
}
impl<T> Default for PtrList<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T> Deref for PtrList<T> {
    type Target = Vec<Ptr<T>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<T> std::ops::DerefMut for PtrList<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
impl<T> From<Vec<Ptr<T>>> for PtrList<T> {
    fn from(v: Vec<Ptr<T>>) -> Self {
        Self(v)
    }
}
impl<T> FromIterator<Ptr<T>> for PtrList<T> {
    fn from_iter<I: IntoIterator<Item = Ptr<T>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl<'a, T> IntoIterator for &'a PtrList<T> {
    type Item = &'a Ptr<T>;
    type IntoIter = std::slice::Iter<'a, Ptr<T>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptrs_compare_by_address() {
        let p1 = Ptr::new(43);
        let p2 = Ptr::new(43);
        assert_ne!(p1, p2);

        let p3 = p1.clone();
        assert_ne!(p3, p2);
        assert_eq!(p3, p1);
        assert!(p3.ptr_eq(&p1));
        assert_eq!(p1.strong_count(), 2);
    }
    #[test]
    fn shared_mutation() {
        let p1 = Ptr::new(String::from("a"));
        let p2 = p1.clone();
        p2.write().unwrap().push('b');
        assert_eq!(*p1.read().unwrap(), "ab");
        assert_eq!(*p1.read_or_recover(), "ab");

        let guard = p1.write_or_recover();
        assert!(p2.try_read_or_recover().is_none());
        drop(guard);
        assert_eq!(*p2.try_read_or_recover().unwrap(), "ab");
    }
    #[test]
    fn ptr_list() {
        let mut list = PtrList::<i32>::new();

        let a = list.add(1);
        let b = list.add(2);
        assert_eq!(list.len(), 2);
        assert_eq!(*b.read().unwrap(), 2);

        let shared = Ptr::new(3);
        list.add_ptr(shared.clone());
        assert_eq!(list.position_of(&shared), Some(2));
        assert_eq!(list.position_where(|v| *v == 2), Some(1));

        assert!(list.remove_ptr(&a).is_some());
        assert!(list.remove_ptr(&a).is_none());
        assert_eq!(list.len(), 2);
        assert_eq!(*list[0].read().unwrap(), 2);
    }
}
