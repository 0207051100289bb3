pub mod page_extractor;
pub mod sitemap;

pub use page_extractor::PageSignalExtractor;
pub use sitemap::{parse_sitemap, SitemapDocument};
