mod embedded;
mod identifiers;
mod structural;
mod tree;

pub use embedded::{balanced_json_slice, locate_embedded_data, locate_json_ld, locate_page_data};
pub use identifiers::{discover_org_id, discover_show_id, find_clip_id, is_uuid};
pub use structural::{extract_episode_links, page_heading, page_image};
pub use tree::{collect_episode_records, description_text, episode_url_from_slug};
