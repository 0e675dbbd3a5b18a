//! Collaborators the handlers call into: object store, upstream API and
//! local filesystem.

pub mod file_service;
pub mod object_store;
pub mod upstream;
