//! Type descriptors - immutable per-class identity records
//!
//! Design: one descriptor per class, built on first use by the declaration
//! macros and kept for the rest of the process:
//! - Identity: canonical name + 32-bit FNV-1a id
//! - Direct supertypes in declaration order (traversal priority)
//! - Parents are stored inline; hierarchies rarely fan out past four

use std::fmt;
use std::ptr;

use smallvec::SmallVec;
use tracing::debug;

use crate::hash::{fnv1a_32, RttiId};

/// Inline capacity for direct supertypes
pub const INLINE_PARENTS: usize = 4;

/// Direct supertype list
pub type Parents = SmallVec<[&'static TypeDescriptor; INLINE_PARENTS]>;

/// Identity and direct-supertype links of one class
pub struct TypeDescriptor {
    id: RttiId,
    name: String,
    parents: Parents,
}

impl TypeDescriptor {
    /// Build a descriptor from its canonical name and parent descriptors.
    ///
    /// Normally called once per class from `Class::descriptor`.
    pub fn new(name: impl Into<String>, parents: Parents) -> Self {
        let name = name.into();
        let id = fnv1a_32(&name);

        debug!(
            id = format_args!("{:#010x}", id),
            class = %name,
            parents = parents.len(),
            "type descriptor constructed"
        );

        Self { id, name, parents }
    }

    #[inline]
    pub fn id(&self) -> RttiId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct supertypes, in declaration order
    #[inline]
    pub fn parents(&self) -> &[&'static TypeDescriptor] {
        &self.parents
    }

    /// Whether this class is `target` or derives from it.
    ///
    /// Own id first, then parents left to right, depth first; stops at the
    /// first hit.
    pub fn reaches(&self, target: RttiId) -> bool {
        self.id == target || self.parents.iter().any(|parent| parent.reaches(target))
    }

    /// Like [`reaches`](Self::reaches), comparing descriptor identity instead
    /// of ids. Two classes whose names collide on the same id are still told
    /// apart.
    pub fn reaches_descriptor(&self, target: &TypeDescriptor) -> bool {
        ptr::eq(self, target)
            || self
                .parents
                .iter()
                .any(|parent| parent.reaches_descriptor(target))
    }

    /// All transitive supertypes, depth-first pre-order, self excluded.
    ///
    /// A base shared by several paths is yielded once, at its first visit.
    pub fn ancestors(&self) -> Ancestors<'_> {
        let mut stack: Vec<&TypeDescriptor> = Vec::new();
        stack.extend(self.parents.iter().rev().map(|p| &**p));
        Ancestors {
            stack,
            seen: Vec::new(),
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &format_args!("{:#010x}", self.id))
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#010x})", self.name, self.id)
    }
}

/// Iterator returned by [`TypeDescriptor::ancestors`]
pub struct Ancestors<'a> {
    stack: Vec<&'a TypeDescriptor>,
    seen: Vec<*const TypeDescriptor>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            let addr: *const TypeDescriptor = current;
            if self.seen.contains(&addr) {
                continue;
            }
            self.seen.push(addr);
            self.stack.extend(current.parents.iter().rev().map(|p| &**p));
            return Some(current);
        }
        None
    }
}
