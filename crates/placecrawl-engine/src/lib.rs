pub mod category;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod payload;
mod text;
pub mod types;
pub mod url;

pub use category::{classify, PlaceCategory};
pub use engine::{CrawlEngine, CrawlOutput, EngineConfig, LlmEngine, RunConfig};
pub use error::CrawlError;
pub use normalize::to_place_result;
pub use orchestrator::{CrawlerSettings, PlaceCrawler};
pub use payload::parse_extracted;
pub use types::{ExtractedPlace, PlaceResult};
pub use url::normalize_url;
