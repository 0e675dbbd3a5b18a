//! HTTP handlers. Every operation runs under [`guard::map_api_errors`].

pub mod file_handlers;
pub mod guard;
pub mod object_handlers;
pub mod proxy_handlers;
pub mod status_handlers;
