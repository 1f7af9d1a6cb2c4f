use crate::job::Metadata;
use crate::slide::{
    ActivityData, BusiestDay, EmojisData, OverviewData, RankEntry, RankingData, RoastsData,
    SlideKind, SlideRecord, WordsData,
};

/// Group name used when the metadata carries none.
pub const FALLBACK_GROUP_NAME: &str = "your group chat";

const SUMMARY_WORDS: usize = 3;

/// Flat aggregate shown on the summary slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryData {
    pub group_name: String,
    pub total_messages: u64,
    pub active_days: u64,
    pub longest_streak: u64,
    pub top_chatter: Option<RankEntry>,
    pub peak_hour: u32,
    pub busiest_day: Option<BusiestDay>,
    pub top_emoji: String,
    pub top_words: Vec<String>,
    pub topics: Vec<String>,
    pub brain_rot_score: i64,
    pub group_roast: String,
}

impl SummaryData {
    fn empty(group_name: String) -> Self {
        Self {
            group_name,
            total_messages: 0,
            active_days: 0,
            longest_streak: 0,
            top_chatter: None,
            peak_hour: 0,
            busiest_day: None,
            top_emoji: String::new(),
            top_words: Vec::new(),
            topics: Vec::new(),
            brain_rot_score: 0,
            group_roast: String::new(),
        }
    }
}

/// Reduces the slide list into one summary record.
///
/// Single pass in input order; when a tag repeats, the later slide's values
/// replace the earlier ones.
pub fn extract_summary(slides: &[SlideRecord], metadata: Option<&Metadata>) -> SummaryData {
    let group_name = metadata
        .and_then(|meta| meta.get("group_name"))
        .and_then(|name| name.as_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_GROUP_NAME)
        .to_string();

    let mut summary = SummaryData::empty(group_name);
    for slide in slides {
        match slide.kind() {
            SlideKind::Overview => {
                let overview: OverviewData = slide.view();
                summary.total_messages = overview.total_messages;
                summary.active_days = overview.streak.total_active_days;
                summary.longest_streak = overview.streak.longest_streak;
            }
            SlideKind::Ranking => {
                let ranking: RankingData = slide.view();
                summary.top_chatter = ranking.rankings.into_iter().next();
            }
            SlideKind::Emojis => {
                let emojis: EmojisData = slide.view();
                summary.top_emoji = emojis
                    .group_top_emojis
                    .into_iter()
                    .next()
                    .map(|(emoji, _)| emoji)
                    .unwrap_or_default();
            }
            SlideKind::Activity => {
                let activity: ActivityData = slide.view();
                summary.peak_hour = activity.peak_hour.unwrap_or(0);
                summary.busiest_day = activity.busiest_day;
            }
            SlideKind::Words => {
                let words: WordsData = slide.view();
                summary.top_words = words
                    .top_words
                    .into_iter()
                    .take(SUMMARY_WORDS)
                    .map(|(word, _)| word)
                    .collect();
                summary.topics = words.topics;
            }
            SlideKind::AiRoasts => {
                let roasts: RoastsData = slide.view();
                summary.brain_rot_score = roasts.brainrot_score;
                summary.group_roast = roasts.group_roast;
            }
            SlideKind::SignatureWords
            | SlideKind::ConvoDynamics
            | SlideKind::ChatGraph
            | SlideKind::FunStats
            | SlideKind::Other(_) => {}
        }
    }
    summary
}
