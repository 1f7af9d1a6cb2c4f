use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use wrapped_logging::wrapped_debug;

/// One backend-computed statistic. `tag` decides how `data` is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideRecord {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl SlideRecord {
    pub fn new(tag: impl Into<String>, title: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            tag: tag.into(),
            title: title.into(),
            data,
        }
    }

    pub fn kind(&self) -> SlideKind {
        SlideKind::from_tag(&self.tag)
    }

    /// Reads `data` as a typed view; a payload that does not fit yields the
    /// view's defaults.
    pub fn view<T: DeserializeOwned + Default>(&self) -> T {
        match serde_json::from_value(Value::Object(self.data.clone())) {
            Ok(view) => view,
            Err(err) => {
                wrapped_debug!("slide `{}` payload did not fit its view: {}", self.tag, err);
                T::default()
            }
        }
    }
}

/// Closed set of slide kinds the client knows how to treat specially.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlideKind {
    Overview,
    Ranking,
    Emojis,
    Activity,
    Words,
    SignatureWords,
    ConvoDynamics,
    ChatGraph,
    FunStats,
    AiRoasts,
    /// Any tag this client does not know; rendered as a regular slide.
    Other(String),
}

impl SlideKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "overview" => SlideKind::Overview,
            "ranking" => SlideKind::Ranking,
            "emojis" => SlideKind::Emojis,
            "activity" => SlideKind::Activity,
            "words" => SlideKind::Words,
            "signature_words" => SlideKind::SignatureWords,
            "convo_dynamics" => SlideKind::ConvoDynamics,
            "chat_graph" => SlideKind::ChatGraph,
            "fun_stats" => SlideKind::FunStats,
            "ai_roasts" => SlideKind::AiRoasts,
            other => SlideKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct StreakData {
    pub longest_streak: u64,
    pub current_streak: u64,
    pub total_active_days: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct OverviewData {
    pub year: Option<i32>,
    pub total_participants: u64,
    pub total_messages: u64,
    pub streak: StreakData,
    pub total_images: u64,
    pub total_videos: u64,
    pub total_gifs: u64,
    pub total_stickers: u64,
    pub total_audio: u64,
    pub total_documents: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankEntry {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RankingData {
    pub rankings: Vec<RankEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EmojisData {
    pub group_top_emojis: Vec<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusiestDay {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ActivityData {
    pub busiest_day: Option<BusiestDay>,
    pub peak_hour: Option<u32>,
    pub peak_hour_formatted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WordsData {
    pub top_words: Vec<(String, u64)>,
    #[serde(deserialize_with = "topic_words")]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    pub name: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SignatureWordsData {
    pub per_person: Map<String, Value>,
}

impl SignatureWordsData {
    /// People with at least one recorded word, in backend order.
    pub fn entries(&self) -> Vec<SignatureEntry> {
        self.per_person
            .iter()
            .filter_map(|(name, words)| {
                let words: Vec<String> = words
                    .as_array()?
                    .iter()
                    .filter_map(|word| word.as_str().map(ToOwned::to_owned))
                    .collect();
                (!words.is_empty()).then(|| SignatureEntry {
                    name: name.clone(),
                    words,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoastEntry {
    pub name: String,
    pub roast: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RoastsData {
    pub brainrot_score: i64,
    #[serde(deserialize_with = "joined_text")]
    pub group_roast: String,
    pub individual_roasts: Map<String, Value>,
}

impl RoastsData {
    /// Per-person roasts in insertion order.
    pub fn entries(&self) -> Vec<RoastEntry> {
        self.individual_roasts
            .iter()
            .map(|(name, roast)| RoastEntry {
                name: name.clone(),
                roast: text_of(roast),
            })
            .collect()
    }
}

/// Roast text arrives either as a string or as a list of lines.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(lines) => lines
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

fn joined_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(&value))
}

/// Topics are `[word, is_proper_noun]` pairs or bare words.
fn topic_words<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(word) => Some(word.clone()),
            Value::Array(pair) => pair.first().and_then(Value::as_str).map(ToOwned::to_owned),
            _ => None,
        })
        .collect())
}
