use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cli::Cli;
use crate::compose::ResponseOptions;
use crate::config::Config;
use crate::corpus::CorpusSource;
use crate::engine::build_snapshot;
use crate::error::{KtError, Result};
use crate::search::{IndexSnapshot, SnapshotStore};

pub struct AppContext {
    pub kt_root: PathBuf,
    pub config: Config,
    pub response: ResponseOptions,
    pub source: CorpusSource,
    pub robot_mode: bool,
    pub verbosity: u8,
    store: Arc<SnapshotStore>,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let kt_root = Self::find_kt_root()?;
        let mut config = Config::load(cli.config.as_deref(), &kt_root)?;

        if !cli.corpus.is_empty() {
            config.corpus.paths = cli
                .corpus
                .iter()
                .map(|p| p.display().to_string())
                .collect();
        }
        if let Some(separator) = &cli.separator {
            config.corpus.separator.clone_from(separator);
        }
        config.validate()?;

        let response = config.response_options()?;
        let source = config.corpus_source();
        debug!(root = %kt_root.display(), source = %source.describe(), "resolved context");

        let snapshot = Self::build(&config, &source)?;
        Ok(Self {
            kt_root,
            response,
            source,
            robot_mode: cli.robot,
            verbosity: cli.verbose,
            store: Arc::new(SnapshotStore::new(snapshot)),
            config,
        })
    }

    fn build(config: &Config, source: &CorpusSource) -> Result<IndexSnapshot> {
        build_snapshot(
            source,
            &config.corpus.separator,
            &config.corpus.extensions,
            &config.index_options(),
        )
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Rebuild from the configured source on a background thread and publish.
    pub fn rebuild(&self) -> Result<u64> {
        let config = self.config.clone();
        let source = self.source.clone();
        let handle = self
            .store
            .spawn_rebuild(move || Self::build(&config, &source))?;
        crate::search::join_rebuild(handle)
    }

    fn find_kt_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("KT_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".kt") {
            return Ok(found);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| KtError::MissingConfig("data directory not found".to_string()))?;
        Ok(data_dir.join("kt"))
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
