//! Wrapped core: wire model, the job poller state machine and the pure slide
//! transforms that feed the presentation.
mod cursor;
mod effect;
mod error;
mod expand;
mod job;
mod msg;
mod selection;
mod slide;
mod state;
mod summary;
mod update;
mod view_model;

pub use cursor::SlideCursor;
pub use effect::Effect;
pub use error::{FlowError, ValidationError};
pub use expand::{expand_slides, VirtualSlide, PAGE_SIZE};
pub use job::{
    AnalyzeRequest, AnalyzeResponse, JobId, JobStatus, Metadata, Stats, StatsResponse,
    StatusResponse, UploadResponse,
};
pub use msg::Msg;
pub use selection::{Participant, Selection};
pub use slide::{
    ActivityData, BusiestDay, EmojisData, OverviewData, RankEntry, RankingData, RoastEntry,
    RoastsData, SignatureEntry, SignatureWordsData, SlideKind, SlideRecord, StreakData, WordsData,
};
pub use state::{Phase, PollSettings, PollerState, POLL_INTERVAL};
pub use summary::{extract_summary, SummaryData, FALLBACK_GROUP_NAME};
pub use update::update;
pub use view_model::PollerView;
