mod cors;
mod json;

pub use self::cors::{cors_layer, options_no_content};
pub use self::json::JsonBody;
