//! Shape transforms
//!
//! Reshapes a decoded table before it is rendered. The endpoint that issued
//! the request picks the [`TransformMode`](crate::types::TransformMode).

mod pivot;

pub use pivot::{apply_transform, entity_pivot, NAME_COLUMN, VALUE_COLUMN};
