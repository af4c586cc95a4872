pub mod feed_csv;
pub mod site;

pub use feed_csv::{parse_climate_csv, parse_probe_csv, parse_timestamp};
pub use site::{FeedSource, SiteClient};
