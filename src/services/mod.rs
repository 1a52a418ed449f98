pub mod aggregate;
pub mod categories;
pub mod fingerprint;
pub mod http_source;
pub mod index;
pub mod reconcile;
pub mod registry;
pub mod variants;
