pub mod log;
pub mod rope;
pub mod section;

pub use section::{FOOD_LOG_HEADING, Heading, all_lines, extract_section, extract_section_str};
