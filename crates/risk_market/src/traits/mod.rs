//! Traits implemented by market objects.

mod bumpable;

pub use bumpable::Bumpable;
