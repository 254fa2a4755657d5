//! Declaration macros
//!
//! A class opts in by listing its direct supertypes, in traversal priority:
//!
//! ```
//! use rttimeta::{rtti_meta, Rtti, RttiExt};
//!
//! pub trait Animal: Rtti {}
//! pub trait Flyable: Animal {}
//! pub trait Swimmable: Animal {}
//!
//! rtti_meta!(dyn Animal);
//! rtti_meta!(dyn Flyable: dyn Animal);
//! rtti_meta!(dyn Swimmable: dyn Animal);
//!
//! pub struct Penguin;
//! impl Animal for Penguin {}
//! impl Flyable for Penguin {}
//! impl Swimmable for Penguin {}
//! rtti_meta!(Penguin: dyn Flyable, dyn Swimmable);
//!
//! let penguin = Penguin;
//! let animal: &dyn Animal = &penguin;
//! assert!(animal.cast::<dyn Swimmable>().is_some());
//! assert!(animal.cast::<Penguin>().is_some());
//! ```
//!
//! A concrete class can also embed a concrete ancestor in a field; the field
//! accessor is that hop's view adjustment:
//!
//! ```
//! use rttimeta::{rtti_meta, Rtti, RttiExt};
//!
//! pub trait Widget: Rtti {}
//! rtti_meta!(dyn Widget);
//!
//! pub struct Base { pub id: u32 }
//! rtti_meta!(Base);
//!
//! pub struct Button { pub base: Base }
//! impl Widget for Button {}
//! rtti_meta!(Button: dyn Widget, Base => base);
//!
//! let button = Button { base: Base { id: 3 } };
//! let widget: &dyn Widget = &button;
//! assert_eq!(widget.cast::<Base>().map(|b| b.id), Some(3));
//! ```
//!
//! Malformed declarations fail to compile: an interface supertype must be a
//! real supertrait, an embedded base must be a field of exactly that type
//! (no `Box` or other `Deref` wrapper), a supertype without a field must be a
//! trait object, and a class cannot list itself under any path. Together
//! these keep every declared hierarchy acyclic.
//!
//! ```compile_fail
//! use rttimeta::{rtti_meta, Rtti};
//!
//! pub trait Animal: Rtti {}
//! pub trait Rock: Rtti {}
//! rtti_meta!(dyn Animal);
//! // `Animal` is not a supertrait of `Rock`
//! rtti_meta!(dyn Rock: dyn Animal);
//! ```
//!
//! ```compile_fail
//! use rttimeta::{rtti_meta, Rtti};
//!
//! pub trait Animal: Rtti {}
//! rtti_meta!(dyn Animal: dyn Animal);
//! ```
//!
//! ```compile_fail
//! use rttimeta::{rtti_meta, Rtti};
//!
//! pub trait Animal: Rtti {}
//! rtti_meta!(dyn Animal: dyn self::Animal);
//!
//! fn main() {}
//! ```
//!
//! ```compile_fail
//! use rttimeta::rtti_meta;
//!
//! pub struct Node {
//!     pub next: Box<Node>,
//! }
//! rtti_meta!(Node: self::Node => next);
//!
//! fn main() {}
//! ```
//!
//! ```compile_fail
//! use rttimeta::rtti_meta;
//!
//! pub struct Ping {
//!     pub pong: Box<Pong>,
//! }
//! pub struct Pong {
//!     pub ping: Box<Ping>,
//! }
//! rtti_meta!(Ping: Pong => pong);
//! rtti_meta!(Pong: Ping => ping);
//!
//! fn main() {}
//! ```
//!
//! ```compile_fail
//! use rttimeta::rtti_meta;
//!
//! pub struct Inner;
//! rtti_meta!(Inner);
//!
//! pub struct Outer(Inner);
//! impl std::ops::Deref for Outer {
//!     type Target = Inner;
//!     fn deref(&self) -> &Inner {
//!         &self.0
//!     }
//! }
//! // A concrete supertype needs its field
//! rtti_meta!(Outer: Inner);
//!
//! fn main() {}
//! ```

/// Declare a class and its direct supertypes.
///
/// - `rtti_meta!(Type)` / `rtti_meta!(dyn Trait)`: a root class
/// - `rtti_meta!(Type: dyn A, dyn B)`: supertypes reached by unsizing or
///   trait upcasting
/// - `rtti_meta!(Type: Base => field)`: a concrete supertype embedded in
///   `field`
#[macro_export]
macro_rules! rtti_meta {
    (@impl $ty:ty; $($parent:ty $(=> $field:tt)?),*) => {
        const _: () = {
            #[allow(dead_code)]
            fn __rtti_well_formed() {
                $($crate::__rtti_check!($ty, $parent $(, $field)?);)*
            }
        };

        impl $crate::Class for $ty {
            fn descriptor() -> &'static $crate::TypeDescriptor {
                static DESCRIPTOR: $crate::__private::OnceCell<$crate::TypeDescriptor> =
                    $crate::__private::OnceCell::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::TypeDescriptor::new(
                        $crate::name::canonical_name(module_path!(), stringify!($ty)),
                        $crate::__private::smallvec![
                            $(<$parent as $crate::Class>::descriptor()),*
                        ],
                    )
                })
            }

            fn lands(target: $crate::RttiId, view: $crate::__private::TypeId) -> bool {
                (target == <Self as $crate::Class>::class_id()
                    && view == $crate::__private::TypeId::of::<Self>())
                    $(|| <$parent as $crate::Class>::lands(target, view))*
            }

            fn cast_view<'a>(this: &'a Self, slot: &mut $crate::CastSlot<'a, '_>) -> bool {
                if slot.target() == <Self as $crate::Class>::class_id() && slot.land(this) {
                    return true;
                }
                $(
                    if <$parent as $crate::Class>::cast_view(
                        $crate::__rtti_adjust!($parent; this $(, $field)?),
                        slot,
                    ) {
                        return true;
                    }
                )*
                false
            }

            fn cast_view_mut<'a>(
                this: &'a mut Self,
                slot: &mut $crate::CastSlotMut<'a, '_>,
            ) -> bool {
                let target = slot.target();
                if target == <Self as $crate::Class>::class_id() && slot.accepts::<Self>() {
                    return slot.land(this);
                }
                $(
                    if <$parent as $crate::Class>::lands(target, slot.view()) {
                        return <$parent as $crate::Class>::cast_view_mut(
                            $crate::__rtti_adjust_mut!($parent; this $(, $field)?),
                            slot,
                        );
                    }
                )*
                false
            }
        }
    };
    ($ty:ty) => {
        $crate::rtti_meta!(@impl $ty;);
    };
    ($ty:ty : $($parent:ty $(=> $field:tt)?),+ $(,)?) => {
        $crate::rtti_meta!(@impl $ty; $($parent $(=> $field)?),+);
    };
}

/// Declaration checks, one per direct supertype. Each fails to compile as
/// an ambiguous impl when violated.
#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_check {
    ($ty:ty, $parent:ty) => {
        // Hops without a field are upcasts to a trait object
        let _ = <$parent as $crate::__private::AmbiguousIfSized<_>>::check;
        let _ = <$ty as $crate::__private::AmbiguousIfSame<$parent, _>>::check;
    };
    ($ty:ty, $parent:ty, $field:tt) => {
        let _ = <$ty as $crate::__private::AmbiguousIfSame<$parent, _>>::check;
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_adjust {
    ($parent:ty; $this:ident) => {
        $this
    };
    ($parent:ty; $this:ident, $field:tt) => {
        $crate::__private::exact_ref::<$parent, _>(&$this.$field)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rtti_adjust_mut {
    ($parent:ty; $this:ident) => {
        $this
    };
    ($parent:ty; $this:ident, $field:tt) => {
        $crate::__private::exact_mut::<$parent, _>(&mut $this.$field)
    };
}
