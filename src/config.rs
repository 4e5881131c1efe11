use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// Reuse computed links while a document version is unchanged
    pub enable_caching: bool,
    /// How many documents the link cache keeps
    pub link_cache_capacity: usize,
    /// How many pending navigation targets survive at once
    pub navigation_capacity: usize,
    pub debug_logging: bool,
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/razornav/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.razornav",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("enable_caching", true)?
            .set_default("link_cache_capacity", 50)?
            .set_default("navigation_capacity", 256)?
            .set_default("debug_logging", false)?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enable_caching: true,
            link_cache_capacity: 50,
            navigation_capacity: 256,
            debug_logging: false,
        }
    }
}
