mod date;
mod normalize;
mod order;
mod record;

pub use date::{date_from_url, parse_publish_date};
pub use normalize::{NormalizeOptions, dedup_key, normalize_episodes, strip_markup};
pub use order::order_episodes;
pub use record::{CanonicalEpisode, EmbeddedRecord, RawEpisodeRecord, StructuralRecord};
