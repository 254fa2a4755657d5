//! Typed casts
//!
//! Two failure modes, kept apart on purpose:
//! - pointer form (`cast_*`) answers `None` when the target is unreachable
//! - reference form (`try_cast_*`) reports [`RttiError::TypeMismatch`]
//!
//! Exclusive views only come out of exclusive sources.

use tracing::debug;

use crate::engine::{CastSlot, CastSlotMut, Class, Landing, Rtti};
use crate::error::{Result, RttiError};

/// View `src` as a `T`, or `None` if its class does not derive from `T`.
pub fn cast_ref<'a, T, S>(src: &'a S) -> Option<&'a T>
where
    T: Class + ?Sized,
    S: Rtti + ?Sized,
{
    let mut landing = Landing::<T>::empty();
    let mut slot: CastSlot<'a, '_> = CastSlot::new(T::class_id(), &mut landing);
    if !src.rtti_cast(&mut slot) {
        return None;
    }
    // SAFETY: `CastSlot::land` only accepts views borrowed for `'a`, the
    // lifetime of the shared borrow of `src`.
    landing.take().map(|view| unsafe { view.as_ref() })
}

/// Exclusive counterpart of [`cast_ref`].
pub fn cast_mut<'a, T, S>(src: &'a mut S) -> Option<&'a mut T>
where
    T: Class + ?Sized,
    S: Rtti + ?Sized,
{
    let mut landing = Landing::<T>::empty();
    let mut slot: CastSlotMut<'a, '_> = CastSlotMut::new(T::class_id(), &mut landing);
    if !src.rtti_cast_mut(&mut slot) {
        return None;
    }
    // SAFETY: the landed view was reborrowed from `src` for `'a`; `src` is
    // consumed by this call, so the returned reference is the only path to
    // the object for `'a`.
    landing.take().map(|mut view| unsafe { view.as_mut() })
}

/// Pointer form with null propagation: `None` in, `None` out, no traversal.
#[inline]
pub fn cast_ptr<'a, T, S>(src: Option<&'a S>) -> Option<&'a T>
where
    T: Class + ?Sized,
    S: Rtti + ?Sized,
{
    src.and_then(cast_ref::<T, S>)
}

#[inline]
pub fn cast_ptr_mut<'a, T, S>(src: Option<&'a mut S>) -> Option<&'a mut T>
where
    T: Class + ?Sized,
    S: Rtti + ?Sized,
{
    src.and_then(cast_mut::<T, S>)
}

/// Reference form: an unreachable target is an error.
pub fn try_cast_ref<'a, T, S>(src: &'a S) -> Result<&'a T>
where
    T: Class + ?Sized,
    S: Rtti + ?Sized,
{
    cast_ref::<T, S>(src).ok_or_else(|| mismatch(src.rtti_name(), T::class_name()))
}

pub fn try_cast_mut<'a, T, S>(src: &'a mut S) -> Result<&'a mut T>
where
    T: Class + ?Sized,
    S: Rtti + ?Sized,
{
    let from = src.rtti_name();
    cast_mut::<T, S>(src).ok_or_else(|| mismatch(from, T::class_name()))
}

/// Whether `src`'s class is `T` or derives from it
#[inline]
pub fn is_a<T, S>(src: &S) -> bool
where
    T: Class + ?Sized,
    S: Rtti + ?Sized,
{
    src.is(T::class_id())
}

fn mismatch(from: &'static str, to: &'static str) -> RttiError {
    debug!(from, to, "rtti cast failed");
    RttiError::type_mismatch(from, to)
}

/// Method-call sugar over the free functions, for any `Rtti` handle.
pub trait RttiExt: Rtti {
    #[inline]
    fn cast<T: Class + ?Sized>(&self) -> Option<&T> {
        cast_ref::<T, Self>(self)
    }

    #[inline]
    fn cast_mut<T: Class + ?Sized>(&mut self) -> Option<&mut T> {
        cast_mut::<T, Self>(self)
    }

    #[inline]
    fn try_cast<T: Class + ?Sized>(&self) -> Result<&T> {
        try_cast_ref::<T, Self>(self)
    }

    #[inline]
    fn try_cast_mut<T: Class + ?Sized>(&mut self) -> Result<&mut T> {
        try_cast_mut::<T, Self>(self)
    }

    #[inline]
    fn is_a<T: Class + ?Sized>(&self) -> bool {
        is_a::<T, Self>(self)
    }
}

impl<S: Rtti + ?Sized> RttiExt for S {}
