// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use crate::error::FeedError;

/// File name for a programme's feed: `{slug with '-' as '_'}_feed.xml`
pub fn feed_file_name(slug: &str) -> String {
    let stem = sanitize_filename::sanitize(slug.trim()).replace('-', "_");
    format!("{stem}_feed.xml")
}

/// Write a feed document into `output_dir`, creating the directory if needed
pub fn write_feed(output_dir: &Path, slug: &str, document: &str) -> Result<PathBuf, FeedError> {
    std::fs::create_dir_all(output_dir).map_err(|e| FeedError::CreateDirectoryFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let path = output_dir.join(feed_file_name(slug));
    std::fs::write(&path, document).map_err(|e| FeedError::WriteFailed {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}
