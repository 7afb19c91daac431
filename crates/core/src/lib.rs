pub mod action;
pub mod catalog;
pub mod config;
pub mod control;
pub mod episode;
pub mod identifiers;
pub mod matcher;
pub mod metrics;
pub mod naming;
pub mod scan;
pub mod snapshot;
pub mod testing;

pub use action::{Action, ActionKind, ActionPlan, ArtifactCategory, FileOpKind, FileOperation};
pub use catalog::{CatalogError, CatalogShow, MemoryCatalog, RawEpisode, SeriesId, ShowCatalog};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError,
};
pub use control::{CancelFlag, Cancelled, ScanControl, ScanPhase, ScanProgress};
pub use episode::{Library, LibraryError, ProcessedEpisode, SeasonRule, Show, ShowConfig};
pub use identifiers::{DownloadIdentifier, DownloadIdentifierChain};
pub use scan::{ScanError, ScanReport, ScanStats, ScanWarning, Scanner};
pub use snapshot::{build_snapshot, DirectoryCacheItem, DirectorySnapshot, SnapshotError};
