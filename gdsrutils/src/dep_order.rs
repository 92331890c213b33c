//!
//! # Dependency-Ordering Trait and Helpers
//!

// Std-lib
use std::collections::HashSet;
use std::marker::PhantomData;

///
/// # Dependency-Ordering Trait
///
/// Libraries in which cells place other cells form a dependency graph.
/// Writing them out, or checking them for cycles, requires visiting that graph in dependency order.
///
/// Implementers provide `process`, which pushes each of an item's direct dependencies
/// onto the [DepOrderer] via `orderer.push`, and `fail`, which builds the cycle error.
/// The default [DepOrder::order] returns items with every dependency ahead of its dependents.
///
/// ```text
/// struct CellOrder;
/// impl DepOrder for CellOrder {
///     type Item = Ptr<Cell>;
///     type Error = LayoutError;
///
///     fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error> {
///         for dep in item.read()?.dependencies() {
///             orderer.push(&dep)?;
///         }
///         Ok(())
///     }
///     fn fail(item: &Self::Item) -> Self::Error {
///         LayoutError::cycle(item)
///     }
/// }
/// ```
///
pub trait DepOrder: Sized {
    /// Item Type. Typically pointers or keys to the nodes in the dependency graph.
    type Item: Clone + Eq + std::hash::Hash;
    /// Error Type
    type Error;

    /// Dependency-order all entries in slice `items`
    fn order(items: &[Self::Item]) -> Result<Vec<Self::Item>, Self::Error> {
        DepOrderer::<Self>::order(items)
    }

    /// Process a single `item`, pushing each of its direct dependencies
    fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error>;
    /// Create the error for a cycle detected upon re-entering `item`
    fn fail(item: &Self::Item) -> Self::Error;
}

/// # Dependency Order Helper
/// Public solely for use in the call-signature of [DepOrder::process].
pub struct DepOrderer<P: DepOrder> {
    /// Ordered, completed items
    stack: Vec<P::Item>,
    /// Completed items, for quick membership tests
    seen: HashSet<P::Item>,
    /// Items with an open stack-frame. Re-entering one of these is a cycle.
    pending: HashSet<P::Item>,
    p: PhantomData<P>,
}
impl<P: DepOrder> DepOrderer<P> {
    /// Dependency-order all entries in slice `items`
    pub fn order(items: &[P::Item]) -> Result<Vec<P::Item>, P::Error> {
        let mut this = Self {
            stack: Vec::with_capacity(items.len()),
            seen: HashSet::with_capacity(items.len()),
            pending: HashSet::new(),
            p: PhantomData,
        };
        for item in items.iter() {
            this.push(item)?;
        }
        Ok(this.stack)
    }
    /// Push `item`'s dependencies, and then itself, onto the stack
    pub fn push(&mut self, item: &P::Item) -> Result<(), P::Error> {
        if self.seen.contains(item) {
            return Ok(());
        }
        if !self.pending.insert(item.clone()) {
            return Err(P::fail(item));
        }
        P::process(item, self)?;
        self.pending.remove(item);
        self.seen.insert(item.clone());
        self.stack.push(item.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Graph over `usize` nodes, edges listed per node
    struct Edges;
    thread_local! {
        static EDGES: std::cell::RefCell<Vec<Vec<usize>>> = std::cell::RefCell::new(Vec::new());
    }
    impl DepOrder for Edges {
        type Item = usize;
        type Error = usize;
        fn process(item: &usize, orderer: &mut DepOrderer<Self>) -> Result<(), usize> {
            let deps = EDGES.with(|e| e.borrow()[*item].clone());
            for dep in deps.iter() {
                orderer.push(dep)?;
            }
            Ok(())
        }
        fn fail(item: &usize) -> usize {
            *item
        }
    }

    #[test]
    fn orders_dependencies_first() {
        EDGES.with(|e| *e.borrow_mut() = vec![vec![1, 2], vec![2], vec![]]);
        assert_eq!(Edges::order(&[0]), Ok(vec![2, 1, 0]));
        assert_eq!(Edges::order(&[2, 0, 1]), Ok(vec![2, 1, 0]));
    }
    #[test]
    fn detects_cycles() {
        EDGES.with(|e| *e.borrow_mut() = vec![vec![1], vec![2], vec![0]]);
        assert_eq!(Edges::order(&[0]), Err(0));
        EDGES.with(|e| *e.borrow_mut() = vec![vec![0]]);
        assert_eq!(Edges::order(&[0]), Err(0));
    }
}
