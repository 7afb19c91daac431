//! Ordered chain of download identifiers with per-pass deduplication.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::artwork::{EpisodeThumbnail, FanartJpg, FolderJpg};
use super::metadata::{KodiNfo, Mede8erXml, PyTivoMeta};
use super::timestamp::TimestampFixer;
use super::traits::{DownloadIdentifier, EpisodeFile, IdentifierContext};
use crate::action::{Action, ArtifactCategory, FileOperation};
use crate::catalog::ShowCatalog;
use crate::config::ArtifactConfig;
use crate::episode::Show;
use crate::snapshot::DirectorySnapshot;

/// What every hook may consult.
#[derive(Clone, Copy)]
pub struct ArtifactEnv<'a> {
    pub catalog: &'a dyn ShowCatalog,
    /// Snapshot of the show folders, for existence checks.
    pub library: &'a DirectorySnapshot,
}

/// State of one pass over the chain.
///
/// Each strategy has its own set of queued paths; starting a new pass
/// discards them.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPass {
    queued: Vec<HashSet<PathBuf>>,
    force: bool,
    only: Option<ArtifactCategory>,
}

impl ArtifactPass {
    /// True for forced refresh passes.
    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// Number of paths queued across all strategies.
    pub fn queued(&self) -> usize {
        self.queued.iter().map(HashSet::len).sum()
    }
}

/// Ordered list of enabled download identifiers.
#[derive(Default)]
pub struct DownloadIdentifierChain {
    identifiers: Vec<Box<dyn DownloadIdentifier>>,
}

impl DownloadIdentifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a strategy.
    pub fn with(mut self, identifier: impl DownloadIdentifier + 'static) -> Self {
        self.identifiers.push(Box::new(identifier));
        self
    }

    /// Builds the chain from configuration, in a fixed order.
    pub fn from_config(config: &ArtifactConfig) -> Self {
        let mut chain = Self::new();
        if config.folder_jpg {
            chain = chain.with(FolderJpg);
        }
        if config.fanart_jpg {
            chain = chain.with(FanartJpg);
        }
        if config.episode_thumbnails {
            chain = chain.with(EpisodeThumbnail);
        }
        if config.kodi_nfo {
            chain = chain.with(KodiNfo);
        }
        if config.mede8er_xml {
            chain = chain.with(Mede8erXml);
        }
        if config.pytivo_meta {
            chain = chain.with(PyTivoMeta);
        }
        if config.correct_file_dates {
            chain = chain.with(TimestampFixer);
        }
        debug!(identifiers = ?chain.names(), "Download identifier chain built");
        chain
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.identifiers.iter().map(|i| i.name()).collect()
    }

    /// Starts a regular scan pass.
    pub fn begin_pass(&self) -> ArtifactPass {
        ArtifactPass {
            queued: vec![HashSet::new(); self.identifiers.len()],
            force: false,
            only: None,
        }
    }

    /// Starts a forced refresh pass, optionally limited to one category.
    pub fn begin_forced_pass(&self, only: Option<ArtifactCategory>) -> ArtifactPass {
        ArtifactPass {
            force: true,
            only,
            ..self.begin_pass()
        }
    }

    fn dispatch<F>(&self, pass: &mut ArtifactPass, env: ArtifactEnv<'_>, hook: F) -> Vec<Action>
    where
        F: Fn(&dyn DownloadIdentifier, &mut IdentifierContext<'_>) -> Vec<Action>,
    {
        if pass.queued.len() < self.identifiers.len() {
            pass.queued.resize_with(self.identifiers.len(), HashSet::new);
        }

        let mut actions = Vec::new();
        for (identifier, queued) in self.identifiers.iter().zip(pass.queued.iter_mut()) {
            if pass.only.is_some_and(|only| only != identifier.category()) {
                continue;
            }
            let mut ctx = IdentifierContext::new(env.catalog, env.library, queued, pass.force);
            let proposed = hook(identifier.as_ref(), &mut ctx);
            if !proposed.is_empty() {
                trace!(identifier = identifier.name(), count = proposed.len(), "Artifacts proposed");
            }
            actions.extend(proposed);
        }
        actions
    }

    pub fn on_show(&self, pass: &mut ArtifactPass, env: ArtifactEnv<'_>, show: &Show) -> Vec<Action> {
        self.dispatch(pass, env, |identifier, ctx| identifier.on_show(ctx, show))
    }

    pub fn on_season(
        &self,
        pass: &mut ArtifactPass,
        env: ArtifactEnv<'_>,
        show: &Show,
        season: u32,
        folder: &Path,
    ) -> Vec<Action> {
        self.dispatch(pass, env, |identifier, ctx| {
            identifier.on_season(ctx, show, season, folder)
        })
    }

    pub fn on_episode(
        &self,
        pass: &mut ArtifactPass,
        env: ArtifactEnv<'_>,
        file: &EpisodeFile<'_>,
    ) -> Vec<Action> {
        self.dispatch(pass, env, |identifier, ctx| identifier.on_episode(ctx, file))
    }

    pub fn on_operation_completed(
        &self,
        pass: &mut ArtifactPass,
        env: ArtifactEnv<'_>,
        operation: &FileOperation,
    ) -> Vec<Action> {
        self.dispatch(pass, env, |identifier, ctx| {
            identifier.on_operation_completed(ctx, operation)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, ArtifactKind, FileOpKind};
    use crate::catalog::{CatalogShow, MemoryCatalog, RawEpisode, ShowArtwork};
    use crate::episode::ShowConfig;
    use crate::snapshot::DirectoryCacheItem;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn catalog() -> MemoryCatalog {
        let show = CatalogShow::new(3, "Foo").with_episode(
            RawEpisode::new(3, 31, 1, 1).with_air_date(NaiveDate::from_ymd_opt(2020, 5, 1).unwrap()),
        );
        let artwork = ShowArtwork {
            poster: Some("http://img/poster.jpg".to_string()),
            fanart: Some("http://img/fanart.jpg".to_string()),
            season_posters: BTreeMap::from([(1, "http://img/s1.jpg".to_string())]),
            episode_images: BTreeMap::from([(31, "http://img/e31.jpg".to_string())]),
            ..ShowArtwork::default()
        };
        let mut catalog = MemoryCatalog::new();
        catalog.insert_with_artwork(show, artwork);
        catalog
    }

    fn show(config: ShowConfig, catalog: &MemoryCatalog) -> Show {
        Show::new(config, catalog.get_show(3).unwrap())
    }

    fn targets(actions: &[Action]) -> Vec<String> {
        actions
            .iter()
            .map(|a| a.produces().display().to_string())
            .collect()
    }

    fn all_enabled() -> ArtifactConfig {
        ArtifactConfig {
            folder_jpg: true,
            fanart_jpg: true,
            episode_thumbnails: true,
            kodi_nfo: true,
            mede8er_xml: true,
            pytivo_meta: true,
            correct_file_dates: true,
        }
    }

    #[test]
    fn test_from_config_only_enabled() {
        assert!(DownloadIdentifierChain::from_config(&ArtifactConfig::default()).is_empty());
        let chain = DownloadIdentifierChain::from_config(&ArtifactConfig {
            kodi_nfo: true,
            correct_file_dates: true,
            ..ArtifactConfig::default()
        });
        assert_eq!(chain.names(), vec!["kodi_nfo", "timestamp_fixer"]);
        assert_eq!(DownloadIdentifierChain::from_config(&all_enabled()).len(), 7);
    }

    #[test]
    fn test_show_hooks_skip_existing_artifacts() {
        let catalog = catalog();
        let show = show(ShowConfig::new(3, "/lib/Foo"), &catalog);
        let library = DirectorySnapshot::from_items(vec![DirectoryCacheItem::new(
            "/lib/Foo/fanart.jpg",
            10,
            None,
        )]);
        let env = ArtifactEnv {
            catalog: &catalog,
            library: &library,
        };
        let chain = DownloadIdentifierChain::from_config(&all_enabled());
        let mut pass = chain.begin_pass();

        let actions = chain.on_show(&mut pass, env, &show);
        assert_eq!(
            targets(&actions),
            vec!["/lib/Foo/folder.jpg", "/lib/Foo/tvshow.nfo", "/lib/Foo/series.xml"]
        );
    }

    #[test]
    fn test_same_path_proposed_once_per_pass() {
        let catalog = catalog();
        let mut config = ShowConfig::new(3, "/lib/Foo");
        config.season_folders.insert(1, PathBuf::from(""));
        let show = show(config, &catalog);
        let library = DirectorySnapshot::default();
        let env = ArtifactEnv {
            catalog: &catalog,
            library: &library,
        };
        let chain = DownloadIdentifierChain::new().with(FolderJpg);
        let mut pass = chain.begin_pass();

        let first = chain.on_show(&mut pass, env, &show);
        let second = chain.on_season(&mut pass, env, &show, 1, &show.folder().join(""));
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());

        let mut fresh = chain.begin_pass();
        assert_eq!(chain.on_show(&mut fresh, env, &show).len(), 1);
    }

    #[test]
    fn test_episode_hooks() {
        let catalog = catalog();
        let show = show(ShowConfig::new(3, "/lib/Foo"), &catalog);
        let library = DirectorySnapshot::default();
        let env = ArtifactEnv {
            catalog: &catalog,
            library: &library,
        };
        let chain = DownloadIdentifierChain::from_config(&all_enabled());
        let mut pass = chain.begin_pass();
        let video = PathBuf::from("/lib/Foo/Season 01/Foo - S01E01.mkv");
        let file = EpisodeFile {
            show: &show,
            episode: &show.episodes(1)[0],
            video: &video,
            modified: None,
        };

        let actions = chain.on_episode(&mut pass, env, &file);
        assert_eq!(
            targets(&actions),
            vec![
                "/lib/Foo/Season 01/Foo - S01E01-thumb.jpg",
                "/lib/Foo/Season 01/Foo - S01E01.nfo",
                "/lib/Foo/Season 01/Foo - S01E01.xml",
                "/lib/Foo/Season 01/Foo - S01E01.mkv.txt",
                "/lib/Foo/Season 01/Foo - S01E01.mkv",
            ]
        );
        match &actions[4].kind {
            ActionKind::TimestampCorrection(t) => {
                assert_eq!(t.time, Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap());
            }
            other => panic!("expected timestamp correction, got {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_skipped_when_already_correct() {
        let catalog = catalog();
        let show = show(ShowConfig::new(3, "/lib/Foo"), &catalog);
        let library = DirectorySnapshot::default();
        let env = ArtifactEnv {
            catalog: &catalog,
            library: &library,
        };
        let chain = DownloadIdentifierChain::new().with(TimestampFixer);
        let video = PathBuf::from("/lib/Foo/Season 01/a.mkv");
        let file = EpisodeFile {
            show: &show,
            episode: &show.episodes(1)[0],
            video: &video,
            modified: Some(Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap()),
        };

        let mut pass = chain.begin_pass();
        assert!(chain.on_episode(&mut pass, env, &file).is_empty());

        let mut forced = chain.begin_forced_pass(None);
        assert_eq!(chain.on_episode(&mut forced, env, &file).len(), 1);
    }

    #[test]
    fn test_forced_pass_filters_category_and_ignores_existing() {
        let catalog = catalog();
        let show = show(ShowConfig::new(3, "/lib/Foo"), &catalog);
        let library = DirectorySnapshot::from_items(vec![
            DirectoryCacheItem::new("/lib/Foo/folder.jpg", 10, None),
            DirectoryCacheItem::new("/lib/Foo/tvshow.nfo", 10, None),
        ]);
        let env = ArtifactEnv {
            catalog: &catalog,
            library: &library,
        };
        let chain = DownloadIdentifierChain::new().with(FolderJpg).with(KodiNfo);

        let mut pass = chain.begin_forced_pass(Some(ArtifactCategory::Image));
        let actions = chain.on_show(&mut pass, env, &show);
        assert_eq!(targets(&actions), vec!["/lib/Foo/folder.jpg"]);
        assert!(pass.is_forced());
    }

    #[test]
    fn test_operation_completed_queues_nfo_once() {
        let catalog = catalog();
        let show = show(ShowConfig::new(3, "/lib/Foo"), &catalog);
        let library = DirectorySnapshot::default();
        let env = ArtifactEnv {
            catalog: &catalog,
            library: &library,
        };
        let chain = DownloadIdentifierChain::new().with(KodiNfo);
        let mut pass = chain.begin_pass();

        let mut op = FileOperation::new(FileOpKind::Move, "/dl/x.mkv", "/lib/Foo/Season 01/x.mkv");
        op.episode = Some(crate::action::EpisodeRef::new(&show, &show.episodes(1)[0]));

        let first = chain.on_operation_completed(&mut pass, env, &op);
        assert_eq!(first.len(), 1);
        match &first[0].kind {
            ActionKind::DownloadArtifact(a) => assert_eq!(a.kind, ArtifactKind::KodiEpisodeNfo),
            other => panic!("expected artifact, got {:?}", other),
        }
        assert!(chain.on_operation_completed(&mut pass, env, &op).is_empty());
        assert_eq!(pass.queued(), 1);
    }
}
