//! Bounded stack of borrowed scopes, used while resolving names during a render pass.
//!
//! The stack never owns what it points at; the borrow checker ties every
//! reference to the tree it came from, so a tree cannot be dropped while a
//! stack still refers into it.
use crate::data::Data;
use crate::error::{Error, Result};

/// Default capacity.
pub const MAXSIZE: usize = 64;

#[derive(Debug, Clone)]
pub struct DataStack<'a> {
    frames: Vec<&'a Data>,
    capacity: usize,
}

impl Default for DataStack<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DataStack<'a> {
    pub fn new() -> Self {
        Self::with_capacity(MAXSIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { frames: Vec::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Fails at capacity, leaving the stack unchanged.
    pub fn push(&mut self, scope: &'a Data) -> Result<()> {
        if self.frames.len() >= self.capacity {
            log::debug!("push rejected: stack at capacity {}", self.capacity);
            return Err(Error::StackOverflow { capacity: self.capacity });
        }
        self.frames.push(scope);
        Ok(())
    }

    /// Popping an empty stack is a no-op.
    pub fn pop(&mut self) -> Option<&'a Data> {
        self.frames.pop()
    }

    pub fn back(&self) -> Result<&'a Data> {
        self.frames.last().copied().ok_or(Error::StackUnderflow)
    }

    /// Every live scope, bottom to top. Reverse it for innermost-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a Data> + ExactSizeIterator + '_ {
        self.frames.iter().copied()
    }

    pub fn as_slice(&self) -> &[&'a Data] {
        &self.frames
    }

    /// First map scope, innermost-first, that has `key`.
    pub fn lookup(&self, key: &str) -> Option<&'a Data> {
        self.iter().rev().find_map(|scope| scope.get(key))
    }

    /// Resolve a dotted name (`a.b.c`). The head goes through `lookup`, the
    /// tail descends maps from there. `"."` is the top scope itself.
    pub fn resolve(&self, name: &str) -> Option<&'a Data> {
        if name == "." {
            return self.back().ok();
        }
        let mut segments = name.split('.');
        let head = segments.next()?;
        segments.try_fold(self.lookup(head)?, |node, seg| node.get(seg))
    }
}

impl<'s, 'a> IntoIterator for &'s DataStack<'a> {
    type Item = &'s &'a Data;
    type IntoIter = std::slice::Iter<'s, &'a Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Tag;

    fn map(entries: &[(&str, Data)]) -> Data {
        let mut d = Data::new();
        d.allocate(Tag::Map, entries.len()).unwrap();
        for (k, v) in entries {
            d.insert(*k, v.clone()).unwrap();
        }
        d
    }

    #[test]
    fn bounded_push_pop_back() {
        let nodes: Vec<Data> = (0..5).map(|i| Data::from(i.to_string())).collect();
        let mut stack = DataStack::with_capacity(4);

        for n in &nodes[..4] {
            stack.push(n).unwrap();
        }
        assert_eq!(stack.push(&nodes[4]), Err(Error::StackOverflow { capacity: 4 }));
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.back().unwrap().as_str(), Some("3"));

        for _ in 0..4 {
            assert!(stack.pop().is_some());
        }
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
        assert_eq!(stack.back(), Err(Error::StackUnderflow));
    }

    #[test]
    fn iteration_covers_every_frame_in_push_order() {
        let a = Data::from("a");
        let b = Data::from("b");
        let c = Data::from("c");
        let mut stack = DataStack::new();
        stack.push(&a).unwrap();
        stack.push(&b).unwrap();
        stack.push(&c).unwrap();

        let order: Vec<_> = stack.iter().filter_map(Data::as_str).collect();
        assert_eq!(order, ["a", "b", "c"]);
        let inner_first: Vec<_> = stack.iter().rev().filter_map(Data::as_str).collect();
        assert_eq!(inner_first, ["c", "b", "a"]);
        assert_eq!(stack.as_slice().len(), 3);
        assert_eq!((&stack).into_iter().count(), 3);
    }

    #[test]
    fn empty_stack_iterates_nothing() {
        let stack = DataStack::new();
        assert_eq!(stack.iter().count(), 0);
        assert_eq!(stack.capacity(), MAXSIZE);
    }

    #[test]
    fn lookup_prefers_innermost_scope() {
        let outer = map(&[("name", Data::from("outer")), ("only_outer", Data::from("x"))]);
        let inner = map(&[("name", Data::from("inner"))]);
        let text = Data::from("not a scope");

        let mut stack = DataStack::new();
        stack.push(&outer).unwrap();
        stack.push(&inner).unwrap();
        stack.push(&text).unwrap();

        assert_eq!(stack.lookup("name").and_then(Data::as_str), Some("inner"));
        assert_eq!(stack.lookup("only_outer").and_then(Data::as_str), Some("x"));
        assert!(stack.lookup("missing").is_none());

        stack.pop();
        stack.pop();
        assert_eq!(stack.lookup("name").and_then(Data::as_str), Some("outer"));
    }

    #[test]
    fn resolve_dotted_names() {
        let person = map(&[("name", Data::from("ada"))]);
        let root = map(&[("person", person)]);

        let mut stack = DataStack::new();
        stack.push(&root).unwrap();
        assert_eq!(stack.resolve("person.name").and_then(Data::as_str), Some("ada"));
        assert!(stack.resolve("person.age").is_none());
        assert!(stack.resolve("nobody.name").is_none());
        assert_eq!(stack.resolve("."), Some(&root));

        stack.pop();
        assert!(stack.resolve(".").is_none());
    }
}
