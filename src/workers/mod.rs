pub mod exclusions;
pub mod range_scraper;

pub use exclusions::ExclusionFilter;
pub use range_scraper::{RangeScraper, RunStats};
