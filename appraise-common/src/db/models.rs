//! Database models
//!
//! One task/item/result triple per task family, plus error classification
//! results attached to ranking items. Closed label sets are enums; values
//! outside them are rejected when parsed.

use crate::task_id::TaskId;
use crate::{Error, Result};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a task short name
pub const SHORTNAME_MAX_LEN: usize = 50;

/// Task family discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFamily {
    Ranking,
    Editing,
    Lucy,
    Quality,
}

impl TaskFamily {
    pub const ALL: [TaskFamily; 4] = [
        TaskFamily::Ranking,
        TaskFamily::Editing,
        TaskFamily::Lucy,
        TaskFamily::Quality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFamily::Ranking => "ranking",
            TaskFamily::Editing => "editing",
            TaskFamily::Lucy => "lucy",
            TaskFamily::Quality => "quality",
        }
    }

    /// Table holding this family's items
    pub(crate) fn items_table(&self) -> &'static str {
        match self {
            TaskFamily::Ranking => "ranking_items",
            TaskFamily::Editing => "editing_items",
            TaskFamily::Lucy => "lucy_items",
            TaskFamily::Quality => "quality_items",
        }
    }
}

impl fmt::Display for TaskFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ranking" => Ok(TaskFamily::Ranking),
            "editing" => Ok(TaskFamily::Editing),
            "lucy" => Ok(TaskFamily::Lucy),
            "quality" => Ok(TaskFamily::Quality),
            other => Err(Error::unknown_label("task family", other)),
        }
    }
}

/// Annotator account (authentication lives elsewhere)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// A named batch of items of one family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub family: TaskFamily,
    pub shortname: String,
    pub description: String,
    pub task_id: TaskId,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}-task id=\"{}\" name=\"{}\">",
            self.family, self.id, self.shortname
        )
    }
}

/// Task creation request
///
/// Leave `task_id` unset to have the store mint a fresh identifier.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub family: TaskFamily,
    pub shortname: String,
    pub description: String,
    pub task_id: Option<TaskId>,
}

impl NewTask {
    pub fn new(family: TaskFamily, shortname: impl Into<String>) -> Self {
        Self {
            family,
            shortname: shortname.into(),
            description: String::new(),
            task_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn task_id(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }
}

/// Validate a task short name against the column limit
pub fn validate_shortname(shortname: &str) -> Result<()> {
    if shortname.trim().is_empty() {
        return Err(Error::InvalidInput("task short name must not be empty".to_string()));
    }
    if shortname.chars().count() > SHORTNAME_MAX_LEN {
        return Err(Error::InvalidInput(format!(
            "task short name exceeds {} characters: {:?}",
            SHORTNAME_MAX_LEN, shortname
        )));
    }
    Ok(())
}

/// Candidate system letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SystemSlot {
    A,
    B,
    C,
    D,
}

impl SystemSlot {
    pub const ALL: [SystemSlot; 4] = [SystemSlot::A, SystemSlot::B, SystemSlot::C, SystemSlot::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemSlot::A => "A",
            SystemSlot::B => "B",
            SystemSlot::C => "C",
            SystemSlot::D => "D",
        }
    }
}

impl fmt::Display for SystemSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemSlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(SystemSlot::A),
            "B" => Ok(SystemSlot::B),
            "C" => Ok(SystemSlot::C),
            "D" => Ok(SystemSlot::D),
            other => Err(Error::unknown_label("system", other)),
        }
    }
}

/// Rank position 1 (best) to 4 (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rank(u8);

impl Rank {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rank(value))
        } else {
            Err(Error::unknown_label("rank", value.to_string()))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rank {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Rank::new(value)
    }
}

impl TryFrom<i64> for Rank {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| Error::unknown_label("rank", value.to_string()))
            .and_then(Rank::new)
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

/// Pairwise comparison label for Lucy tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LucyRanking {
    #[serde(rename = "W++")]
    MuchWorse,
    #[serde(rename = "W+")]
    Worse,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "B+")]
    Better,
    #[serde(rename = "B++")]
    MuchBetter,
}

impl LucyRanking {
    /// Labels in distribution order
    pub const ALL: [LucyRanking; 5] = [
        LucyRanking::MuchWorse,
        LucyRanking::Worse,
        LucyRanking::Equal,
        LucyRanking::Better,
        LucyRanking::MuchBetter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LucyRanking::MuchWorse => "W++",
            LucyRanking::Worse => "W+",
            LucyRanking::Equal => "==",
            LucyRanking::Better => "B+",
            LucyRanking::MuchBetter => "B++",
        }
    }
}

impl fmt::Display for LucyRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LucyRanking {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LucyRanking::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| Error::unknown_label("lucy ranking", s))
    }
}

/// "Quality acceptable?" judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityLabel {
    #[serde(rename = "A")]
    Acceptable,
    #[serde(rename = "C")]
    CanBeFixed,
    #[serde(rename = "N")]
    NoneOfBoth,
}

impl QualityLabel {
    pub const ALL: [QualityLabel; 3] = [
        QualityLabel::Acceptable,
        QualityLabel::CanBeFixed,
        QualityLabel::NoneOfBoth,
    ];

    /// Stored single-letter code
    pub fn code(&self) -> &'static str {
        match self {
            QualityLabel::Acceptable => "A",
            QualityLabel::CanBeFixed => "C",
            QualityLabel::NoneOfBoth => "N",
        }
    }

    /// Human-readable label
    pub fn description(&self) -> &'static str {
        match self {
            QualityLabel::Acceptable => "Acceptable",
            QualityLabel::CanBeFixed => "Can easily be fixed",
            QualityLabel::NoneOfBoth => "None of both",
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for QualityLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QualityLabel::ALL
            .into_iter()
            .find(|label| label.code() == s)
            .ok_or_else(|| Error::unknown_label("quality", s))
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Source text plus four system outputs to be ranked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingItem {
    pub id: i64,
    pub task: i64,
    pub source: String,
    pub system_a: String,
    pub system_b: String,
    pub system_c: String,
    pub system_d: String,
    pub edited: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewRankingItem {
    pub source: String,
    pub system_a: String,
    pub system_b: String,
    pub system_c: String,
    pub system_d: String,
}

/// Source text plus three system outputs to be post-edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingItem {
    pub id: i64,
    pub task: i64,
    pub source: String,
    pub system_a: String,
    pub system_b: String,
    pub system_c: String,
    pub edited: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewEditingItem {
    pub source: String,
    pub system_a: String,
    pub system_b: String,
    pub system_c: String,
}

/// Source, reference and two Lucy variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LucyItem {
    pub id: i64,
    pub task: i64,
    pub source: String,
    pub reference: String,
    pub system_a: String,
    pub system_b: String,
    pub edited: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewLucyItem {
    pub source: String,
    pub reference: String,
    pub system_a: String,
    pub system_b: String,
}

/// Source text, one translation and optional context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityItem {
    pub id: i64,
    pub task: i64,
    pub source: String,
    pub translation: String,
    pub context: String,
    pub edited: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewQualityItem {
    pub source: String,
    pub translation: String,
    pub context: String,
}

macro_rules! item_display {
    ($ty:ty, $tag:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!("<", $tag, " id=\"{}\" task=\"{}\">"), self.id, self.task)
            }
        }
    };
}

item_display!(RankingItem, "ranking-item");
item_display!(EditingItem, "editing-item");
item_display!(LucyItem, "lucy-item");
item_display!(QualityItem, "quality-item");

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One annotator's ranking of the four systems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingResult {
    pub id: i64,
    pub item: i64,
    pub user: i64,
    pub rank_a: Rank,
    pub rank_b: Rank,
    pub rank_c: Rank,
    pub rank_d: Rank,
}

impl RankingResult {
    pub fn rank(&self, slot: SystemSlot) -> Rank {
        match slot {
            SystemSlot::A => self.rank_a,
            SystemSlot::B => self.rank_b,
            SystemSlot::C => self.rank_c,
            SystemSlot::D => self.rank_d,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRankingResult {
    pub item: i64,
    pub user: i64,
    pub rank_a: Rank,
    pub rank_b: Rank,
    pub rank_c: Rank,
    pub rank_d: Rank,
}

/// Error categories flagged for one system output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCategories {
    pub missing_content_words: bool,
    pub content_words_wrong: bool,
    pub wrong_functional_words: bool,
    pub incorrect_word_forms: bool,
    pub incorrect_word_order: bool,
    pub incorrect_punctuation: bool,
    pub other_error: bool,
}

impl ErrorCategories {
    pub fn any(&self) -> bool {
        self.missing_content_words
            || self.content_words_wrong
            || self.wrong_functional_words
            || self.incorrect_word_forms
            || self.incorrect_word_order
            || self.incorrect_punctuation
            || self.other_error
    }
}

/// Error classification of one system output of a ranking item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub id: i64,
    /// Parent ranking item
    pub item: i64,
    pub user: i64,
    pub system: SystemSlot,
    pub errors: ErrorCategories,
    pub comments: String,
}

#[derive(Debug, Clone)]
pub struct NewClassificationResult {
    pub item: i64,
    pub user: i64,
    pub system: SystemSlot,
    pub errors: ErrorCategories,
    pub comments: String,
}

/// Post-edited translation of one system output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingResult {
    pub id: i64,
    pub item: i64,
    pub user: i64,
    pub system: SystemSlot,
    pub postedited: String,
}

#[derive(Debug, Clone)]
pub struct NewEditingResult {
    pub item: i64,
    pub user: i64,
    pub system: SystemSlot,
    pub postedited: String,
}

/// Editing items carry systems A to C only
pub fn validate_editing_system(system: SystemSlot) -> Result<SystemSlot> {
    match system {
        SystemSlot::D => Err(Error::unknown_label("editing system", system.as_str())),
        other => Ok(other),
    }
}

/// One annotator's Lucy comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LucyResult {
    pub id: i64,
    pub item: i64,
    pub user: i64,
    pub ranking: LucyRanking,
}

#[derive(Debug, Clone)]
pub struct NewLucyResult {
    pub item: i64,
    pub user: i64,
    pub ranking: LucyRanking,
}

/// One annotator's quality assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityResult {
    pub id: i64,
    pub item: i64,
    pub user: i64,
    pub quality: QualityLabel,
    /// Time taken, as a time-of-day style value
    pub duration: Option<NaiveTime>,
}

impl QualityResult {
    /// Duration converted to seconds, sub-second fraction included
    pub fn duration_in_seconds(&self) -> Option<f64> {
        self.duration.map(time_to_seconds)
    }
}

#[derive(Debug, Clone)]
pub struct NewQualityResult {
    pub item: i64,
    pub user: i64,
    pub quality: QualityLabel,
    pub duration: Option<NaiveTime>,
}

/// Hours, minutes, seconds and fraction as total seconds
pub fn time_to_seconds(t: NaiveTime) -> f64 {
    f64::from(t.hour()) * 3600.0
        + f64::from(t.minute()) * 60.0
        + f64::from(t.second())
        + f64::from(t.nanosecond()) / 1_000_000_000.0
}

macro_rules! result_display {
    ($ty:ty, $tag:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!("<", $tag, " id=\"{}\" item=\"{}\" user=\"{}\">"),
                    self.id, self.item, self.user
                )
            }
        }
    };
}

result_display!(RankingResult, "ranking-result");
result_display!(ClassificationResult, "classification-result");
result_display!(EditingResult, "editing-result");
result_display!(LucyResult, "lucy-result");
result_display!(QualityResult, "quality-result");
