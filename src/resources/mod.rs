//! Filesystem primitives the group engine is built from.
pub mod backup;
pub mod copy;
pub mod diff;
pub mod fs;
