mod emit;
mod write;

pub use emit::{FeedEmitter, ProgrammeFeed, RssEmitter};
pub use write::{feed_file_name, write_feed};
