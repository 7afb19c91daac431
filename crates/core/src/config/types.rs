use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub plan: PlanConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

/// Where to look for candidate files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Folders enumerated into the directory snapshot (download/search folders).
    #[serde(default)]
    pub search_locations: Vec<PathBuf>,
    /// Follow symbolic links while enumerating.
    #[serde(default)]
    pub follow_links: bool,
    /// Maximum recursion depth below each search location.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            search_locations: Vec::new(),
            follow_links: false,
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    32
}

/// File matching and missing-check behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    /// Extensions (without dot) considered to be episode media.
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    /// Files with "sample" in their name below this size are ignored.
    #[serde(default = "default_sample_threshold")]
    pub sample_max_bytes: u64,
    /// Files smaller than this are treated as placeholders and ignored.
    #[serde(default = "default_min_file_size")]
    pub min_file_bytes: u64,
    /// Allow shows that opt in to match on a bare sequential number.
    #[serde(default = "default_true")]
    pub sequential_matching: bool,
    /// Allow shows that opt in to get merge rules synthesized from multi-episode files.
    #[serde(default = "default_true")]
    pub auto_merge: bool,
    /// Report episodes that have not aired yet as missing.
    #[serde(default)]
    pub include_unaired: bool,
    /// Report episodes without an air date as missing.
    #[serde(default)]
    pub include_undated: bool,
    /// Rename library files whose name differs from the canonical one.
    #[serde(default = "default_true")]
    pub rename_check: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            video_extensions: default_video_extensions(),
            sample_max_bytes: default_sample_threshold(),
            min_file_bytes: default_min_file_size(),
            sequential_matching: true,
            auto_merge: true,
            include_unaired: false,
            include_undated: false,
            rename_check: true,
        }
    }
}

fn default_video_extensions() -> Vec<String> {
    vec![
        "mkv", "mp4", "avi", "m4v", "mov", "wmv", "mpg", "mpeg", "ts", "m2ts", "webm",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_sample_threshold() -> u64 {
    50 * 1024 * 1024 // 50 MB
}

fn default_min_file_size() -> u64 {
    1
}

fn default_true() -> bool {
    true
}

/// Canonical naming of library folders and files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Episode filename template (without extension).
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
    /// Season folder template.
    #[serde(default = "default_season_folder_template")]
    pub season_folder_template: String,
    /// Folder name used for season 0.
    #[serde(default = "default_specials_folder")]
    pub specials_folder: String,
    /// Longest target path (in characters) the planner will produce.
    #[serde(default = "default_max_path_length")]
    pub max_path_length: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            filename_template: default_filename_template(),
            season_folder_template: default_season_folder_template(),
            specials_folder: default_specials_folder(),
            max_path_length: default_max_path_length(),
        }
    }
}

fn default_filename_template() -> String {
    "{ShowName} - S{Season:2}E{Episode}[-E{Episode2}]".to_string()
}

fn default_season_folder_template() -> String {
    "Season {Season:2}".to_string()
}

fn default_specials_folder() -> String {
    "Specials".to_string()
}

fn default_max_path_length() -> usize {
    260
}

/// A single extension substitution applied to companion files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtensionSubstitution {
    /// Extension to replace, without dot (e.g. "txt").
    pub from: String,
    /// Replacement extension, without dot (e.g. "sub").
    pub to: String,
}

/// Plan canonicalization settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanConfig {
    /// Never move originals out of search folders; every operation is a copy.
    #[serde(default)]
    pub preserve_originals: bool,
    /// Carry companion files (subtitles, thumbnails) along with matched files.
    #[serde(default = "default_true")]
    pub keep_together: bool,
    /// Companion extensions (without dot) that are never carried along.
    #[serde(default = "default_keep_together_exclude")]
    pub keep_together_exclude: Vec<String>,
    /// Optional extension substitution for companions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_together_substitution: Option<ExtensionSubstitution>,
    /// Sibling extensions deleted after their video is moved out of a search folder.
    #[serde(default)]
    pub tidy_extensions: Vec<String>,
    /// Remove source directories once everything has been moved out.
    #[serde(default)]
    pub delete_empty_directories: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            preserve_originals: false,
            keep_together: true,
            keep_together_exclude: default_keep_together_exclude(),
            keep_together_substitution: None,
            tidy_extensions: Vec::new(),
            delete_empty_directories: false,
        }
    }
}

fn default_keep_together_exclude() -> Vec<String> {
    vec!["nfo".to_string()]
}

/// Auxiliary artifact strategies. Each flag enables one download identifier.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtifactConfig {
    /// Show and season posters as `folder.jpg`.
    #[serde(default)]
    pub folder_jpg: bool,
    /// Show fanart as `fanart.jpg`.
    #[serde(default)]
    pub fanart_jpg: bool,
    /// Episode thumbnails as `<video>-thumb.jpg`.
    #[serde(default)]
    pub episode_thumbnails: bool,
    /// Kodi `tvshow.nfo` and per-episode `.nfo` files.
    #[serde(default)]
    pub kodi_nfo: bool,
    /// Mede8er `series.xml` and per-episode `.xml` sidecars.
    #[serde(default)]
    pub mede8er_xml: bool,
    /// pyTivo per-episode `.txt` metadata.
    #[serde(default)]
    pub pytivo_meta: bool,
    /// Set episode file modification times to their air date.
    #[serde(default)]
    pub correct_file_dates: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.scan.search_locations.is_empty());
        assert_eq!(config.scan.max_depth, 32);
        assert!(config.matching.video_extensions.contains(&"mkv".to_string()));
        assert_eq!(config.matching.sample_max_bytes, 50 * 1024 * 1024);
        assert!(config.matching.auto_merge);
        assert!(!config.plan.preserve_originals);
        assert!(config.plan.keep_together);
        assert_eq!(config.naming.max_path_length, 260);
        assert!(!config.artifacts.kodi_nfo);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[scan]
search_locations = ["/downloads", "/incoming"]
follow_links = true

[matching]
video_extensions = ["mkv"]
sequential_matching = false

[naming]
filename_template = "{ShowName} {Season}x{Episode}"
specials_folder = "Season 0"

[plan]
preserve_originals = true
keep_together_exclude = []
tidy_extensions = ["nfo", "sfv"]

[plan.keep_together_substitution]
from = "txt"
to = "sub"

[artifacts]
folder_jpg = true
kodi_nfo = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scan.search_locations.len(), 2);
        assert!(config.scan.follow_links);
        assert_eq!(config.matching.video_extensions, vec!["mkv".to_string()]);
        assert!(!config.matching.sequential_matching);
        assert_eq!(config.naming.specials_folder, "Season 0");
        assert!(config.plan.preserve_originals);
        assert!(config.plan.keep_together_exclude.is_empty());
        assert_eq!(
            config.plan.keep_together_substitution,
            Some(ExtensionSubstitution {
                from: "txt".to_string(),
                to: "sub".to_string()
            })
        );
        assert!(config.artifacts.folder_jpg);
        assert!(config.artifacts.kodi_nfo);
        assert!(!config.artifacts.fanart_jpg);
    }

    #[test]
    fn test_serialize_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(
            parsed.naming.filename_template,
            config.naming.filename_template
        );
    }
}
