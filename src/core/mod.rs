pub mod error;
pub mod types;
pub mod value;

pub use error::{CollectionError, Result, ValidationError};
pub use types::{Attributes, CollectionId, DEFAULT_ID_ATTRIBUTE, TempId};
pub use value::Value;
