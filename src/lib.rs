pub mod audio;
pub mod config;
pub mod episode;
pub mod error;
pub mod extract;
pub mod feed;
pub mod http;
pub mod pipeline;
pub mod progress;

// Re-export main types for convenience
pub use audio::{AudioIdentifierTriple, AudioResolution, OrgId, RunContext, resolve_audio};
pub use config::{ExtractionMode, Programme, RunConfig, default_programmes};
pub use episode::{CanonicalEpisode, EmbeddedRecord, RawEpisodeRecord, StructuralRecord};
pub use error::{ConfigError, EmbeddedDataError, FeedError, FetchError, ProgrammeError, RunError};
pub use feed::{FeedEmitter, ProgrammeFeed, RssEmitter, feed_file_name, write_feed};
pub use http::{HttpClient, HttpSettings, ReqwestClient};
pub use pipeline::{RunSummary, WrittenFeed, publish_feed, run, scrape_programme};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
