//! SAML 2.0 types and data structures.
//!
//! The query, the response and assertion that answer it, and the protocol
//! constants they are serialized with.

mod assertion;
mod attribute_query;
mod constants;
mod name_id;
mod response;
mod status;

pub use assertion::*;
pub use attribute_query::*;
pub use constants::*;
pub use name_id::*;
pub use response::*;
pub use status::*;
