//! A utility library for version-sync and its internal crates.
//!
//! This library makes _*no stability guarantees*_.

pub mod fs;
pub mod path;
pub mod result;

mod private {
    pub(crate) trait Sealed {}

    impl<T, E> Sealed for Result<T, E> {}
}
