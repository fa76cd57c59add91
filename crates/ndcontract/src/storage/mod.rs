//! Backing memory for tensors.
//!
//! A tensor's elements live either in memory the tensor owns (allocated by
//! [`Storage::allocate`]) or in a caller-provided region it merely borrows
//! (created by [`Storage::borrowed`]). The distinction decides who releases
//! the memory: owned storage is freed on [`Storage::release`] or drop, a
//! borrowed region is never freed by this crate.

mod buffer;

pub use buffer::Storage;
pub(crate) use buffer::alloc_vec;
