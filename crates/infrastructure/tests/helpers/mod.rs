pub mod mock_line_source;

pub use log_lines::*;
pub use mock_line_source::{MockLineFeed, MockLineSource};
