pub mod graphviz;
pub mod json_compact;

pub use graphviz::GraphvizFormatter;
pub use json_compact::JsonCompactFormatter;
