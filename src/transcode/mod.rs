//! Tree-free conversion between KeyValues text and object notation.

mod from_json;
mod to_json;

pub use self::from_json::{json_to_key_values, json_to_key_values_with_options};
pub use self::to_json::{json_from_key_values, key_values_to_json};
pub use crate::text::string::strip_disambiguation_prefix;
