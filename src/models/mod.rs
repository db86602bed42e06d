//! Models module for the SDK
//!
//! Defines the normalized collection representation produced by the importers
//! and consumed by request-execution tooling.

pub mod collection;
pub mod enums;
pub mod request;

pub use collection::{COLLECTION_VERSION, Collection, FolderItem, Item, RequestItem};
pub use enums::*;
pub use request::{
    Auth, BasicAuth, BearerAuth, Body, DigestAuth, Field, Request, RequestVars, Var,
};

/// Generate a fresh, globally unique identifier for a collection node.
pub fn new_uid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
