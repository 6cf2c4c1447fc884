// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::http::HttpSettings;

pub const DEFAULT_BASE_URL: &str = "https://www.fbi.radio";
pub const DEFAULT_SITE_NAME: &str = "FBi Radio";
pub const DEFAULT_PROGRAMMES_PATH: &str = "programs";

/// A radio programme to build a feed for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Programme {
    /// URL slug of the programme page
    pub slug: String,
    /// Display title used for the feed
    #[serde(default)]
    pub title: String,
    /// Omny Studio show identifier, discovered from the page when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_id: Option<String>,
    /// Artwork override for programmes whose page artwork is unreliable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Programme {
    pub fn new(slug: &str, title: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            show_id: None,
            image_url: None,
        }
    }

    pub fn with_show_id(mut self, show_id: &str) -> Self {
        self.show_id = Some(show_id.to_string());
        self
    }

    pub fn with_image_url(mut self, image_url: &str) -> Self {
        self.image_url = Some(image_url.to_string());
        self
    }
}

/// Which extraction paths run for a programme page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Structural extraction only runs when embedded data yields no episodes
    #[default]
    Fallback,
    /// Both paths run and their records are merged
    Supplement,
}

/// Settings for a complete run over all configured programmes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub base_url: String,
    pub site_name: String,
    /// Path segment under which programme pages live
    pub programmes_path: String,
    /// Omny Studio organisation id; skips discovery when set
    pub org_id: Option<String>,
    pub extraction: ExtractionMode,
    pub strip_description_markup: bool,
    pub http: HttpSettings,
    pub output_dir: PathBuf,
    pub programmes: Vec<Programme>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            programmes_path: DEFAULT_PROGRAMMES_PATH.to_string(),
            org_id: None,
            extraction: ExtractionMode::default(),
            strip_description_markup: false,
            http: HttpSettings::default(),
            output_dir: PathBuf::from("."),
            programmes: default_programmes(),
        }
    }
}

/// The programmes known to work out of the box
pub fn default_programmes() -> Vec<Programme> {
    vec![
        Programme::new("jack-off", "Jack Off")
            .with_show_id("85ea9d91-cb57-46c4-a9c6-abe601048b69"),
        Programme::new("loose-joints", "Loose Joints")
            .with_show_id("e8d27dbf-88c7-4901-9560-b37b0064b8ec"),
        Programme::new("wildcard-with-stuart-coupe", "Wildcard With Stuart Coupe")
            .with_show_id("cec7fc63-681b-4126-a98c-b37d00232daa"),
        Programme::new("sunset-with-tangela", "Sunset with Tangela")
            .with_show_id("018aa123-6990-463e-8983-b37f0095b36a")
            .with_image_url(
                "https://media.fbi.radio/images/sunset%20with%20tangela-800x450.jpg",
            ),
        Programme::new("utility-fog", "Utility Fog")
            .with_show_id("1e142c09-9e63-4d2e-8ce7-a00df26cf834")
            .with_image_url(
                "https://media.fbi.radio/images/utility%20fog%20with%20peter%20hollo-800x450.jpg",
            ),
    ]
}

impl RunConfig {
    /// Load a config file; fields missing from the file keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Check the configuration, returning the parsed site base URL
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let base = Url::parse(&self.base_url)?;

        if self.programmes.is_empty() {
            return Err(ConfigError::NoProgrammes);
        }

        let mut seen = HashSet::new();
        for programme in &self.programmes {
            if programme.slug.trim().is_empty() {
                return Err(ConfigError::EmptySlug);
            }
            if !seen.insert(programme.slug.as_str()) {
                return Err(ConfigError::DuplicateSlug(programme.slug.clone()));
            }
        }

        Ok(base)
    }

    /// Restrict the run to the given slugs, keeping configured order
    pub fn select_programmes(&mut self, slugs: &[String]) -> Result<(), ConfigError> {
        if slugs.is_empty() {
            return Ok(());
        }

        if let Some(unknown) = slugs
            .iter()
            .find(|slug| !self.programmes.iter().any(|p| &p.slug == *slug))
        {
            return Err(ConfigError::UnknownProgramme(unknown.clone()));
        }

        self.programmes.retain(|p| slugs.contains(&p.slug));
        Ok(())
    }

    /// URL of a programme's page
    pub fn programme_url(&self, programme: &Programme) -> Result<Url, url::ParseError> {
        let base = Url::parse(&self.base_url)?;
        base.join(&format!(
            "{}/{}",
            self.programmes_path.trim_matches('/'),
            programme.slug
        ))
    }
}
