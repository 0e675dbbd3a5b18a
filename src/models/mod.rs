//! Request-scoped values produced by the validators.
//!
//! Both types are immutable once built and never outlive the request that
//! produced them.

pub mod file_target;
pub mod object_reference;
