//! Resource model for kust
//!
//! Everything the resolver moves around lives here: the [`Gvk`] and
//! [`ResId`] identity types, the [`Resource`] document wrapper, and the
//! insertion-ordered [`ResMap`] collection with its two merge operators.
//!
//! ```
//! use kust_resource::{ResMap, Resource};
//! use serde_json::json;
//!
//! let cm = Resource::from_value(json!({
//!     "apiVersion": "v1",
//!     "kind": "ConfigMap",
//!     "metadata": {"name": "cfg"},
//! }))
//! .unwrap();
//!
//! let mut map = ResMap::new();
//! map.insert(cm).unwrap();
//! assert_eq!(map.len(), 1);
//! ```

pub mod codec;
pub mod error;
pub mod gvk;
pub mod hash;
pub mod path;
pub mod resid;
pub mod resmap;
pub mod resource;

pub use error::{Error, Result};
pub use gvk::Gvk;
pub use resid::ResId;
pub use resmap::ResMap;
pub use resource::Resource;
