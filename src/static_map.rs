//! Static map preview URLs
//!
//! The image itself is rendered by the map provider; this module only
//! builds the URL a front end embeds.

use crate::config::MapsConfig;

/// Builds static map URLs with markers at both ends and a straight path
/// between them.
#[derive(Clone)]
pub struct StaticMapBuilder {
    base_url: String,
    size: String,
    api_key: String,
}

impl StaticMapBuilder {
    pub fn new(config: &MapsConfig, api_key: impl Into<String>) -> Self {
        Self {
            base_url: config.static_map_url.clone(),
            size: config.static_map_size.clone(),
            api_key: api_key.into(),
        }
    }

    #[must_use]
    pub fn url(&self, source: &str, destination: &str) -> String {
        let source = urlencoding::encode(source);
        let destination = urlencoding::encode(destination);
        format!(
            "{}?size={}&markers={}&markers={}&path={}%7C{}&key={}",
            self.base_url,
            urlencoding::encode(&self.size),
            source,
            destination,
            source,
            destination,
            urlencoding::encode(&self.api_key)
        )
    }
}
