//! Cast resolution engine
//!
//! Two traits split the work:
//! - [`Class`] is static and implemented for every view type, concrete
//!   (`Penguin`) or interface (`dyn Flyable`). It owns the descriptor and the
//!   per-class traversal that adjusts the view at each hop.
//! - [`Rtti`] is object-safe and reaches the concrete class through the
//!   vtable, so a query made through `&dyn Animal` starts at the most-derived
//!   view of the object.
//!
//! Results travel back through a typed landing slot on the caller's stack.
//! A class whose id matches the target only lands its view if the slot
//! expects exactly that view type; an id collision therefore reads as a miss
//! on that branch and the walk goes on.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::descriptor::TypeDescriptor;
use crate::hash::RttiId;

/// Object-safe identity and cast capabilities.
///
/// Declare `Rtti` as a supertrait of every participating interface. Concrete
/// classes get it from the blanket impl over [`Class`].
pub trait Rtti {
    /// Canonical name of the concrete class
    fn rtti_name(&self) -> &'static str;

    /// Id of the concrete class
    fn rtti_id(&self) -> RttiId;

    /// Whether the concrete class is `target` or derives from it
    fn is(&self, target: RttiId) -> bool;

    /// Resolve `slot.target()` against this object, landing the adjusted
    /// shared view in `slot` on success.
    fn rtti_cast<'a>(&'a self, slot: &mut CastSlot<'a, '_>) -> bool;

    /// Exclusive counterpart of [`rtti_cast`](Self::rtti_cast).
    fn rtti_cast_mut<'a>(&'a mut self, slot: &mut CastSlotMut<'a, '_>) -> bool;
}

/// A view type taking part in the hierarchy.
///
/// Implemented by [`rtti_meta!`](crate::rtti_meta) for concrete types and
/// for `dyn Trait` interface types.
pub trait Class: 'static {
    /// The class descriptor, built once on first use
    fn descriptor() -> &'static TypeDescriptor;

    #[inline]
    fn class_id() -> RttiId {
        Self::descriptor().id()
    }

    #[inline]
    fn class_name() -> &'static str {
        Self::descriptor().name()
    }

    /// Whether [`cast_view`](Self::cast_view) would land a `view`-typed
    /// result for `target`, decided on types alone. An id match only counts
    /// when `view` is this class.
    fn lands(target: RttiId, view: TypeId) -> bool;

    /// Land `this` if it is the target view, otherwise adjust it to each
    /// direct supertype in declaration order and recurse. Stops at the first
    /// success.
    fn cast_view<'a>(this: &'a Self, slot: &mut CastSlot<'a, '_>) -> bool;

    /// Exclusive traversal. An exclusive borrow can be handed to a single
    /// branch only, so the branch is picked with [`lands`](Self::lands)
    /// before the view is adjusted: the same branch the shared walk would
    /// succeed on.
    fn cast_view_mut<'a>(this: &'a mut Self, slot: &mut CastSlotMut<'a, '_>) -> bool;
}

impl<T: Class> Rtti for T {
    #[inline]
    fn rtti_name(&self) -> &'static str {
        T::class_name()
    }

    #[inline]
    fn rtti_id(&self) -> RttiId {
        T::class_id()
    }

    #[inline]
    fn is(&self, target: RttiId) -> bool {
        T::descriptor().reaches(target)
    }

    #[inline]
    fn rtti_cast<'a>(&'a self, slot: &mut CastSlot<'a, '_>) -> bool {
        T::cast_view(self, slot)
    }

    #[inline]
    fn rtti_cast_mut<'a>(&'a mut self, slot: &mut CastSlotMut<'a, '_>) -> bool {
        T::cast_view_mut(self, slot)
    }
}

/// Typed landing place for one view, erased behind `dyn Any` inside a slot
pub(crate) struct Landing<V: ?Sized + 'static>(Option<NonNull<V>>);

impl<V: ?Sized + 'static> Landing<V> {
    pub(crate) fn empty() -> Self {
        Self(None)
    }

    pub(crate) fn take(&mut self) -> Option<NonNull<V>> {
        self.0.take()
    }
}

/// Shared-view request: target id plus an erased landing place.
///
/// `'a` is the borrow of the source object. Only views borrowed for the
/// whole of `'a` can land, so whatever the caller gets back aliases the
/// source object.
pub struct CastSlot<'a, 's> {
    target: RttiId,
    view: TypeId,
    out: &'s mut (dyn Any + 'static),
    _borrow: PhantomData<fn(&'a ()) -> &'a ()>,
}

impl<'a, 's> CastSlot<'a, 's> {
    pub(crate) fn new<V: ?Sized + 'static>(target: RttiId, landing: &'s mut Landing<V>) -> Self {
        Self {
            target,
            view: TypeId::of::<V>(),
            out: landing,
            _borrow: PhantomData,
        }
    }

    #[inline]
    pub fn target(&self) -> RttiId {
        self.target
    }

    /// Type of the view this slot expects
    #[inline]
    pub fn view(&self) -> TypeId {
        self.view
    }

    /// Whether this slot expects a `V` view
    #[inline]
    pub fn accepts<V: ?Sized + 'static>(&self) -> bool {
        self.out.is::<Landing<V>>()
    }

    /// Store `view` as the result. Returns `false` if the slot expects a
    /// different view type.
    #[inline]
    pub fn land<V: ?Sized + 'static>(&mut self, view: &'a V) -> bool {
        match self.out.downcast_mut::<Landing<V>>() {
            Some(landing) => {
                landing.0 = Some(NonNull::from(view));
                true
            }
            None => false,
        }
    }
}

/// Exclusive-view request, see [`CastSlot`]
pub struct CastSlotMut<'a, 's> {
    target: RttiId,
    view: TypeId,
    out: &'s mut (dyn Any + 'static),
    _borrow: PhantomData<fn(&'a mut ()) -> &'a mut ()>,
}

impl<'a, 's> CastSlotMut<'a, 's> {
    pub(crate) fn new<V: ?Sized + 'static>(target: RttiId, landing: &'s mut Landing<V>) -> Self {
        Self {
            target,
            view: TypeId::of::<V>(),
            out: landing,
            _borrow: PhantomData,
        }
    }

    #[inline]
    pub fn target(&self) -> RttiId {
        self.target
    }

    /// Type of the view this slot expects
    #[inline]
    pub fn view(&self) -> TypeId {
        self.view
    }

    #[inline]
    pub fn accepts<V: ?Sized + 'static>(&self) -> bool {
        self.out.is::<Landing<V>>()
    }

    #[inline]
    pub fn land<V: ?Sized + 'static>(&mut self, view: &'a mut V) -> bool {
        match self.out.downcast_mut::<Landing<V>>() {
            Some(landing) => {
                landing.0 = Some(NonNull::from(view));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lands_matching_view() {
        let value = 7u32;
        let mut landing = Landing::<u32>::empty();
        {
            let mut slot = CastSlot::new(1, &mut landing);
            assert_eq!(slot.target(), 1);
            assert_eq!(slot.view(), TypeId::of::<u32>());
            assert!(slot.accepts::<u32>());
            assert!(slot.land(&value));
        }
        let ptr = landing.take().map(|p| p.as_ptr() as *const u32);
        assert_eq!(ptr, Some(&value as *const u32));
    }

    #[test]
    fn test_slot_rejects_other_view() {
        let value = 7u64;
        let mut landing = Landing::<u32>::empty();
        {
            let mut slot = CastSlot::new(1, &mut landing);
            assert!(!slot.accepts::<u64>());
            assert!(!slot.land(&value));
        }
        assert!(landing.take().is_none());
    }

    #[test]
    fn test_mut_slot_lands_exclusive_view() {
        let mut value = String::from("x");
        let expected: *const String = &value;
        let mut landing = Landing::<String>::empty();
        {
            let mut slot = CastSlotMut::new(9, &mut landing);
            assert!(slot.land(&mut value));
        }
        let ptr = landing.take().map(|p| p.as_ptr() as *const String);
        assert_eq!(ptr, Some(expected));
    }
}
