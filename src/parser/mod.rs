// Page text interpretation: price text parsing and anti-bot page detection.

pub mod block_detector;
pub mod price_parser;

pub use block_detector::is_blocked;
pub use price_parser::parse_price;
