//! Basic types and helper traits shared by every module.

pub(crate) mod display_ext;
pub(crate) mod leased;

pub use threaded::OptionalSend;
pub use threaded::OptionalSync;

mod threaded {
    /// Alias of `Send`, used in trait bounds of public types.
    pub trait OptionalSend: Send {}
    impl<T: Send + ?Sized> OptionalSend for T {}

    /// Alias of `Sync`, used in trait bounds of public types.
    pub trait OptionalSync: Sync {}
    impl<T: Sync + ?Sized> OptionalSync for T {}
}

/// A type that can be written to and read back from storage or the wire.
pub trait Serde: serde::Serialize + for<'a> serde::Deserialize<'a> {}
impl<T> Serde for T where T: serde::Serialize + for<'a> serde::Deserialize<'a> {}
