//! Download identifiers: pluggable strategies that propose auxiliary
//! artifacts (artwork, metadata sidecars, file date fixes) for the library.
//!
//! Strategies are chained in a fixed order. Each keeps its own record of
//! paths queued during a pass so the same artifact is proposed at most once
//! per scan; a new pass starts clean.

mod artwork;
mod chain;
mod metadata;
mod timestamp;
mod traits;

pub use artwork::{EpisodeThumbnail, FanartJpg, FolderJpg};
pub use chain::{ArtifactEnv, ArtifactPass, DownloadIdentifierChain};
pub use metadata::{KodiNfo, Mede8erXml, PyTivoMeta};
pub use timestamp::TimestampFixer;
pub use traits::{DownloadIdentifier, EpisodeFile, IdentifierContext};
