//! `bagcheck-core`: shared types for BAG duplicate checking.
//!
//! Dataset objects as the engine sees them (identity, tags, flags, an opaque
//! geometry handle), the tag vocabulary, derived address views and the edit
//! tuples the engine proposes. Nothing here mutates a dataset.

pub mod address;
pub mod edit;
pub mod object;
pub mod tags;

pub use address::Address;
pub use edit::{EditBatch, TagEdit};
pub use object::{classify, Category, GeoObject, Geometry, ObjectId, ParseObjectIdError, PrimitiveKind};
pub use tags::normalize_ref;
