//! Display filtering and ordering for shaped lists.
//!
//! Predicates combine with AND. A predicate a list has no field for is
//! skipped, as is any parameter that fails to parse; neither fails the list.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::error::InvalidFilter;

/// Engagement or attendance band used by the analytics and roster filters.
///
/// The band `[80, 90)` belongs to neither threshold and only shows under
/// "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    High,
    NeedsAttention,
}

impl Threshold {
    pub const HIGH_FLOOR: f64 = 90.0;
    pub const ATTENTION_CEILING: f64 = 80.0;

    pub fn admits(self, value: f64) -> bool {
        match self {
            Threshold::High => value >= Self::HIGH_FLOOR,
            Threshold::NeedsAttention => value < Self::ATTENTION_CEILING,
        }
    }

    /// `Ok(None)` is the "all" band.
    fn parse(value: &str) -> Result<Option<Self>, ()> {
        match value {
            "all" => Ok(None),
            "high" | "high-engagement" | "high-performance" => Ok(Some(Threshold::High)),
            "needs-attention" => Ok(Some(Threshold::NeedsAttention)),
            _ => Err(()),
        }
    }
}

/// Sentinel value selecting notes with no folder.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderFilter {
    Uncategorized,
    Folder(Uuid),
}

impl FolderFilter {
    fn admits(self, folder_id: Option<Uuid>) -> bool {
        match self {
            FolderFilter::Uncategorized => folder_id.is_none(),
            FolderFilter::Folder(id) => folder_id == Some(id),
        }
    }
}

/// Inclusive on both ends; an open end is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Grade,
    Attendance,
    Engagement,
    Recent,
    Role,
    Joined,
    Date,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Grade => "grade",
            SortKey::Attendance => "attendance",
            SortKey::Engagement => "engagement",
            SortKey::Recent => "recent",
            SortKey::Role => "role",
            SortKey::Joined => "joined",
            SortKey::Date => "date",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(SortKey::Name),
            "grade" => Some(SortKey::Grade),
            "attendance" => Some(SortKey::Attendance),
            "engagement" => Some(SortKey::Engagement),
            "recent" => Some(SortKey::Recent),
            "role" => Some(SortKey::Role),
            "joined" => Some(SortKey::Joined),
            "date" => Some(SortKey::Date),
            _ => None,
        }
    }

    fn descending(self) -> bool {
        matches!(
            self,
            SortKey::Grade
                | SortKey::Attendance
                | SortKey::Engagement
                | SortKey::Recent
                | SortKey::Joined
        )
    }
}

/// Letter grade ordinal used by the grade sort. Anything unlisted, `-`
/// included, ranks lowest.
pub fn grade_rank(grade: &str) -> u8 {
    match grade {
        "A+" => 5,
        "A" => 4,
        "B+" => 3,
        "B" => 2,
        "C" => 1,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
    Rank(u8),
    /// `None` orders below every timestamp.
    Time(Option<NaiveDateTime>),
    Day(NaiveDate),
}

fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
        (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
        (SortValue::Rank(a), SortValue::Rank(b)) => a.cmp(b),
        (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
        (SortValue::Day(a), SortValue::Day(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// What a list exposes to the filter pipeline. Each accessor returning
/// `None` means the list has no such field.
pub trait Filterable {
    const SORT_KEYS: &'static [SortKey];

    fn status(&self) -> Option<&str> {
        None
    }

    fn category(&self) -> Option<&str> {
        None
    }

    /// Fields the free-text query is matched against.
    fn search_fields(&self) -> Vec<&str>;

    fn folder(&self) -> Option<Option<Uuid>> {
        None
    }

    fn favorite(&self) -> Option<bool> {
        None
    }

    fn subjects(&self) -> Option<&[String]> {
        None
    }

    fn date(&self) -> Option<NaiveDate> {
        None
    }

    /// The value threshold filters apply to.
    fn metric(&self) -> Option<f64> {
        None
    }

    fn sort_value(&self, key: SortKey) -> Option<SortValue<'_>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub status: Option<String>,
    pub category: Option<String>,
    pub query: Option<String>,
    pub folder: Option<FolderFilter>,
    pub favorites_only: bool,
    pub subject: Option<String>,
    pub dates: Option<DateRange>,
    pub threshold: Option<Threshold>,
    pub sort: Option<SortKey>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        *self == FilterSet::default()
    }

    /// Builds a filter set from raw `key=value` parameters.
    ///
    /// Parameters that cannot be used come back alongside the set and are
    /// otherwise ignored; `all` (or an empty value) clears a predicate.
    pub fn from_params<'a, I>(params: I) -> (Self, Vec<InvalidFilter>)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filters = FilterSet::default();
        let mut invalid = Vec::new();
        let mut range = DateRange::default();

        for (key, value) in params {
            let value = value.trim();
            let bad_value = || InvalidFilter::BadValue {
                key: key.to_string(),
                value: value.to_string(),
            };
            match key {
                "status" => filters.status = non_wildcard(value),
                "category" | "type" => filters.category = non_wildcard(value),
                "q" | "query" | "search" => {
                    filters.query = (!value.is_empty()).then(|| value.to_string())
                }
                "subject" | "class" => filters.subject = non_wildcard(value),
                "folder" => match value {
                    "" | "all" => filters.folder = None,
                    UNCATEGORIZED => filters.folder = Some(FolderFilter::Uncategorized),
                    other => match Uuid::parse_str(other) {
                        Ok(id) => filters.folder = Some(FolderFilter::Folder(id)),
                        Err(_) => invalid.push(bad_value()),
                    },
                },
                "favorites" | "starred" => match value {
                    "true" | "1" | "yes" => filters.favorites_only = true,
                    "false" | "0" | "no" => filters.favorites_only = false,
                    _ => invalid.push(bad_value()),
                },
                "from" => match parse_day(value) {
                    Some(day) => range.from = Some(day),
                    None => invalid.push(bad_value()),
                },
                "to" => match parse_day(value) {
                    Some(day) => range.to = Some(day),
                    None => invalid.push(bad_value()),
                },
                "threshold" | "filter" => match Threshold::parse(value) {
                    Ok(threshold) => filters.threshold = threshold,
                    Err(()) => invalid.push(bad_value()),
                },
                "sort" => match SortKey::parse(value) {
                    Some(sort) => filters.sort = Some(sort),
                    None => invalid.push(InvalidFilter::UnsupportedSort(value.to_string())),
                },
                other => invalid.push(InvalidFilter::UnknownKey(other.to_string())),
            }
        }

        match (range.from, range.to) {
            (Some(from), Some(to)) if from > to => invalid.push(InvalidFilter::InvertedRange {
                from: from.to_string(),
                to: to.to_string(),
            }),
            (None, None) => {}
            _ => filters.dates = Some(range),
        }

        for problem in &invalid {
            warn!(%problem, "ignoring filter parameter");
        }
        (filters, invalid)
    }

    /// Parts of this set that rows of type `T` cannot honor. Only the sort
    /// is reported; a predicate on a field `T` lacks is simply skipped.
    pub fn unsupported_by<T: Filterable>(&self) -> Vec<InvalidFilter> {
        match self.sort {
            Some(key) if !T::SORT_KEYS.contains(&key) => {
                vec![InvalidFilter::UnsupportedSort(key.as_str().to_string())]
            }
            _ => Vec::new(),
        }
    }
}

fn non_wildcard(value: &str) -> Option<String> {
    match value {
        "" | "all" => None,
        other => Some(other.to_string()),
    }
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn admits<T: Filterable>(item: &T, filters: &FilterSet, needle: Option<&str>) -> bool {
    if let (Some(wanted), Some(status)) = (filters.status.as_deref(), item.status()) {
        if wanted != status {
            return false;
        }
    }
    if let (Some(wanted), Some(category)) = (filters.category.as_deref(), item.category()) {
        if wanted != category {
            return false;
        }
    }
    if let Some(needle) = needle {
        let hit = item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle));
        if !hit {
            return false;
        }
    }
    if let (Some(folder), Some(folder_id)) = (filters.folder, item.folder()) {
        if !folder.admits(folder_id) {
            return false;
        }
    }
    if filters.favorites_only && item.favorite() == Some(false) {
        return false;
    }
    if let (Some(subject), Some(subjects)) = (filters.subject.as_deref(), item.subjects()) {
        if !subjects.iter().any(|s| s == subject) {
            return false;
        }
    }
    if let (Some(range), Some(date)) = (filters.dates, item.date()) {
        if !range.contains(date) {
            return false;
        }
    }
    if let (Some(threshold), Some(value)) = (filters.threshold, item.metric()) {
        if !threshold.admits(value) {
            return false;
        }
    }
    true
}

/// Stable sort by `key`. Returns `false`, leaving `items` untouched, when the
/// list cannot be ordered by that key.
pub fn sort_items<T: Filterable>(items: &mut [T], key: SortKey) -> bool {
    if !T::SORT_KEYS.contains(&key) {
        return false;
    }
    items.sort_by(|a, b| match (a.sort_value(key), b.sort_value(key)) {
        (Some(a), Some(b)) if key.descending() => compare_values(&b, &a),
        (Some(a), Some(b)) => compare_values(&a, &b),
        _ => Ordering::Equal,
    });
    true
}

/// Applies every predicate in `filters`, then the requested sort.
pub fn apply_filters<T>(items: &[T], filters: &FilterSet) -> Vec<T>
where
    T: Filterable + Clone,
{
    if filters.is_empty() {
        return items.to_vec();
    }
    let needle = filters
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut out: Vec<T> = items
        .iter()
        .filter(|item| admits(*item, filters, needle.as_deref()))
        .cloned()
        .collect();

    if let Some(key) = filters.sort {
        if !sort_items(&mut out, key) {
            warn!(sort = key.as_str(), "ignoring unsupported sort key");
        }
    }
    out
}
