//! The wizard behind the CLI commands: upload, select, analyze, present.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio_util::sync::CancellationToken;
use wrapped_core::{
    expand_slides, FlowError, JobStatus, PollSettings, Selection, SlideCursor, UploadResponse,
    VirtualSlide,
};
use wrapped_engine::{
    ApiGateway, CompletedJob, KeyValueStore, PollRunner, ProgressSink, ResultCache, SessionStore,
    UploadRequest,
};
use wrapped_logging::{wrapped_info, wrapped_warn};

use super::cli::SelectArgs;

pub(crate) const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub(crate) enum UploadError {
    #[error("Only .txt files are allowed")]
    NotText,
    #[error("File size exceeds 20MB limit")]
    TooLarge,
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Checks the local preconditions the backend assumes.
pub(crate) fn check_upload(path: &Path, size: u64) -> Result<(), UploadError> {
    let is_text = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "txt");
    if !is_text {
        return Err(UploadError::NotText);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    Ok(())
}

/// The expanded slides of a cached result plus the reader's position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Deck {
    pub(crate) slides: Vec<VirtualSlide>,
    pub(crate) cursor: SlideCursor,
}

impl Deck {
    pub(crate) fn current(&self) -> Option<&VirtualSlide> {
        self.slides.get(self.cursor.index())
    }
}

pub(crate) struct Wizard {
    api: Arc<dyn ApiGateway>,
    session: SessionStore,
    cache: ResultCache,
    poll: PollSettings,
}

impl Wizard {
    pub(crate) fn new(
        api: Arc<dyn ApiGateway>,
        store: Arc<dyn KeyValueStore>,
        poll: PollSettings,
    ) -> Self {
        Self::with_cache(api, store.clone(), ResultCache::new(store), poll)
    }

    pub(crate) fn with_cache(
        api: Arc<dyn ApiGateway>,
        store: Arc<dyn KeyValueStore>,
        cache: ResultCache,
        poll: PollSettings,
    ) -> Self {
        Self {
            api,
            session: SessionStore::new(store),
            cache,
            poll,
        }
    }

    /// Uploads a chat export and starts a new session with everyone selected.
    pub(crate) async fn upload(&self, path: &Path, year: i32) -> anyhow::Result<UploadResponse> {
        let size = fs::metadata(path)
            .map_err(|source| UploadError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        check_upload(path, size)?;
        let contents = fs::read(path).map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let response = self
            .api
            .upload(UploadRequest::from_path(path, contents, year))
            .await
            .map_err(FlowError::from)?;
        if response.status != JobStatus::AwaitingSelection {
            bail!(FlowError::UnexpectedStatus(response.status));
        }

        // A new upload replaces whatever the previous session left behind.
        self.cache.clear();
        self.session.clear_slide_index()?;
        self.session.set_job_id(&response.job_id)?;
        self.session
            .set_selection(&Selection::from_names(response.participants.iter().cloned()))?;
        wrapped_info!(
            "uploaded job {} with {} participants",
            response.job_id,
            response.participants.len()
        );
        Ok(response)
    }

    /// Applies `edits` to the stored selection and saves it.
    pub(crate) fn select(&self, edits: &SelectArgs) -> anyhow::Result<Selection> {
        let mut selection = self
            .session
            .selection()
            .context("no participants yet; upload a chat first")?;

        if edits.all {
            selection.set_all(true);
        }
        if edits.none {
            selection.set_all(false);
        }
        if edits.toggle_all {
            selection.toggle_all();
        }
        for name in &edits.toggle {
            if !selection.toggle(name) {
                bail!("no participant named `{name}`");
            }
        }

        self.session.set_selection(&selection)?;
        Ok(selection)
    }

    /// Runs the analysis for the stored job and selection until results are
    /// cached.
    pub(crate) async fn analyze(
        &self,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<CompletedJob, FlowError> {
        let job_id = self.session.job_id().unwrap_or_default();
        let selected = self
            .session
            .selection()
            .map(|selection| selection.selected())
            .unwrap_or_default();

        let runner = PollRunner::new(self.api.clone(), self.cache.clone(), self.poll);
        let completed = runner.run(job_id, selected, cancel, sink).await?;
        if let Err(err) = self.session.clear_slide_index() {
            wrapped_warn!("could not reset slide position: {}", err);
        }
        Ok(completed)
    }

    /// Cache-first entry: a valid cached result is presented without any
    /// request; otherwise uploads, narrows the selection and analyzes.
    pub(crate) async fn run(
        &self,
        path: &Path,
        year: i32,
        members: &[String],
        fresh: bool,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> anyhow::Result<Deck> {
        if fresh {
            self.reset()?;
        } else if let Some(deck) = self.deck() {
            wrapped_info!("presenting cached results");
            return Ok(deck);
        }

        self.upload(path, year).await?;
        if !members.is_empty() {
            let mut selection = self.session.selection().unwrap_or_default();
            selection.set_all(false);
            for name in members {
                if !selection.set_selected(name, true) {
                    bail!("no participant named `{name}`");
                }
            }
            self.session.set_selection(&selection)?;
        }

        self.analyze(cancel, sink).await?;
        self.deck()
            .context("results were not stored; run `wrapped analyze` again")
    }

    /// The presentable deck, or `None` when no valid cached result exists.
    pub(crate) fn deck(&self) -> Option<Deck> {
        let entry = self.cache.load_valid()?;
        let slides = expand_slides(&entry.stats.slides, entry.metadata.as_ref());
        let cursor = match self.session.slide_index() {
            Some(saved) => SlideCursor::restore(saved, slides.len()),
            None => SlideCursor::new(slides.len()),
        };
        Some(Deck { slides, cursor })
    }

    pub(crate) fn next(&self) -> anyhow::Result<Deck> {
        self.step(SlideCursor::next)
    }

    pub(crate) fn prev(&self) -> anyhow::Result<Deck> {
        self.step(SlideCursor::prev)
    }

    fn step(&self, advance: fn(&mut SlideCursor) -> bool) -> anyhow::Result<Deck> {
        let mut deck = self.require_deck()?;
        if advance(&mut deck.cursor) {
            self.session.set_slide_index(deck.cursor.index())?;
        }
        Ok(deck)
    }

    pub(crate) fn require_deck(&self) -> anyhow::Result<Deck> {
        self.deck()
            .context("no results to show; run `wrapped analyze` first")
    }

    /// Leaves the deck; results stay cached.
    pub(crate) fn close(&self) -> anyhow::Result<()> {
        self.session.clear_slide_index()?;
        Ok(())
    }

    /// Drops cached results and the session so the next run starts over.
    pub(crate) fn reset(&self) -> anyhow::Result<()> {
        self.cache.clear();
        self.session.clear_slide_index()?;
        Ok(())
    }

    pub(crate) fn selection(&self) -> Option<Selection> {
        self.session.selection()
    }
}
