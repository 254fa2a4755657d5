//! rttimeta - runtime type identification for closed hierarchies
//!
//! Classes (concrete types and `dyn Trait` interfaces) declare their direct
//! supertypes with [`rtti_meta!`]. Any handle to an object, typically a
//! `&dyn Interface`, can then be asked whether the object is also some other
//! class in its hierarchy and be cast to that view:
//!
//! ```
//! use rttimeta::{rtti_meta, Rtti, RttiExt};
//!
//! pub trait Shape: Rtti {}
//! pub trait Named: Rtti { fn name(&self) -> &str; }
//! rtti_meta!(dyn Shape);
//! rtti_meta!(dyn Named);
//!
//! pub struct Circle;
//! impl Shape for Circle {}
//! impl Named for Circle { fn name(&self) -> &str { "circle" } }
//! rtti_meta!(Circle: dyn Shape, dyn Named);
//!
//! let circle = Circle;
//! let shape: &dyn Shape = &circle;
//! assert_eq!(shape.cast::<dyn Named>().map(|n| n.name()), Some("circle"));
//! assert!(shape.try_cast::<dyn Named>().is_ok());
//! ```
//!
//! Identity is a 32-bit FNV-1a hash of the canonical class name. Each class
//! descriptor is built once, on first use, and is safe to reach from any
//! thread. Queries only read descriptors and never allocate.

#[macro_use]
mod macros;

pub mod cast;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod hash;
pub mod logging;
pub mod name;
pub mod registry;

pub use cast::{
    cast_mut, cast_ptr, cast_ptr_mut, cast_ref, is_a, try_cast_mut, try_cast_ref, RttiExt,
};
pub use config::{CollisionPolicy, RegistryConfig, RttiConfig};
pub use descriptor::TypeDescriptor;
pub use engine::{CastSlot, CastSlotMut, Class, Rtti};
pub use error::{Result, RttiError};
pub use hash::{fnv1a_32, RttiId};
pub use logging::{init_dev_logging, init_logging, LogConfig, LogFormat, LogOutput};
pub use registry::{Collision, Registry};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;
    pub use smallvec::smallvec;
    pub use std::any::TypeId;

    /// Implemented only for `P` itself
    pub trait Same<P: ?Sized> {
        fn same_ref(&self) -> &P;
        fn same_mut(&mut self) -> &mut P;
    }

    impl<T: ?Sized> Same<T> for T {
        #[inline]
        fn same_ref(&self) -> &T {
            self
        }

        #[inline]
        fn same_mut(&mut self) -> &mut T {
            self
        }
    }

    /// Field view pinned to exactly `P`; `F` is inferred without deref
    /// coercion, so `Box<P>` and other wrappers are refused.
    #[inline]
    pub fn exact_ref<P: ?Sized, F: ?Sized + Same<P>>(field: &F) -> &P {
        field.same_ref()
    }

    #[inline]
    pub fn exact_mut<P: ?Sized, F: ?Sized + Same<P>>(field: &mut F) -> &mut P {
        field.same_mut()
    }

    pub struct Invalid;

    /// `<T as AmbiguousIfSame<P, _>>::check` fails to resolve when `T == P`
    pub trait AmbiguousIfSame<P: ?Sized, A> {
        fn check() {}
    }

    impl<T: ?Sized, P: ?Sized> AmbiguousIfSame<P, ()> for T {}
    impl<T: ?Sized + Same<P>, P: ?Sized> AmbiguousIfSame<P, Invalid> for T {}

    /// `<T as AmbiguousIfSized<_>>::check` fails to resolve when `T: Sized`
    pub trait AmbiguousIfSized<A> {
        fn check() {}
    }

    impl<T: ?Sized> AmbiguousIfSized<()> for T {}
    impl<T> AmbiguousIfSized<Invalid> for T {}

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_exact_views_keep_address() {
            let mut value = 5u32;
            let expected: *const u32 = &value;
            assert!(std::ptr::eq(exact_ref::<u32, _>(&value), expected));
            *exact_mut::<u32, _>(&mut value) += 1;
            assert_eq!(value, 6);
        }

        #[test]
        fn test_checks_resolve_for_distinct_types() {
            let _ = <u8 as AmbiguousIfSame<u16, _>>::check;
            let _ = <str as AmbiguousIfSized<_>>::check;
        }
    }
}
