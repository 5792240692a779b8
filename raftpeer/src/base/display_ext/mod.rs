//! Implement [`std::fmt::Display`] for types such as `Option<T>` and slice
//! `&[T]`.

mod display_option;
mod display_slice;

pub(crate) use display_option::DisplayOption;
pub(crate) use display_option::DisplayOptionExt;
pub(crate) use display_slice::DisplaySlice;
pub(crate) use display_slice::DisplaySliceExt;
