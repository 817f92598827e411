//! Resource attribute schemas
//!
//! Declares the attributes each resource accepts and validates desired-state
//! records before any resolution or remote call happens.
//!
//! # Checks
//!
//! - **Unknown attributes**: rejected
//! - **Required attributes**: must be set
//! - **Computed attributes**: read-only ones cannot be set
//! - **Types**: strings, booleans, maps and string lists
//! - **Conflicts**: mutually exclusive attributes (metadata pairs)
//! - **Raw JSON**: `_json` attributes must hold a JSON object

mod types;
mod validate;

pub use types::{Attribute, JsonType, ResourceSchema};
pub use validate::is_set;
