//! Shared models

mod elem_type;
mod flags;
mod reference_id;
mod type_repr;

pub use elem_type::{ElemType, RetentionPolicy};
pub use flags::JvmFlags;
pub use reference_id::ReferenceId;
pub use type_repr::{PrimitiveType, TypeRepr, OBJECT_CLASS_NAME};
