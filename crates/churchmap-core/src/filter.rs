use crate::errors::MapError;
use crate::model::{Bounds, Feature};
use crate::util::contains_lower;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Suggestion text that selects every value of a field.
pub const MATCH_ALL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Title,
    City,
    Country,
    Jurisdiction,
    Type,
    Rite,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Title,
        FilterField::City,
        FilterField::Country,
        FilterField::Jurisdiction,
        FilterField::Type,
        FilterField::Rite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Title => "title",
            FilterField::City => "city",
            FilterField::Country => "country",
            FilterField::Jurisdiction => "jurisdiction",
            FilterField::Type => "type",
            FilterField::Rite => "rite",
        }
    }

    /// Id of the page input bound to this field.
    pub fn input_id(&self) -> &'static str {
        match self {
            FilterField::Title => "title-search",
            FilterField::City => "city-search",
            FilterField::Country => "country-search",
            FilterField::Jurisdiction => "jurisdiction-search",
            FilterField::Type => "type-search",
            FilterField::Rite => "rite-search",
        }
    }

    /// Value of this field on a feature; missing reads as "".
    pub fn value<'a>(&self, f: &'a Feature) -> &'a str {
        let p = &f.properties;
        let v = match self {
            FilterField::Title => &p.title,
            FilterField::City => &p.city,
            FilterField::Country => &p.country,
            FilterField::Jurisdiction => &p.jurisdiction,
            FilterField::Type => &p.kind,
            FilterField::Rite => &p.rite,
        };
        v.as_deref().unwrap_or("")
    }

    fn index(&self) -> usize {
        match self {
            FilterField::Title => 0,
            FilterField::City => 1,
            FilterField::Country => 2,
            FilterField::Jurisdiction => 3,
            FilterField::Type => 4,
            FilterField::Rite => 5,
        }
    }
}

impl FromStr for FilterField {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let key = key.strip_suffix("-search").unwrap_or(&key);
        FilterField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| MapError::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Predicate {
    #[default]
    Any,
    MatchAll,
    Contains(String),
}

impl Predicate {
    /// Trimming only decides whether the input is active; the needle keeps
    /// the text exactly as typed.
    pub fn parse(raw: &str) -> Self {
        let t = raw.trim();
        if t.is_empty() {
            Predicate::Any
        } else if t.eq_ignore_ascii_case(MATCH_ALL) {
            Predicate::MatchAll
        } else {
            Predicate::Contains(raw.to_lowercase())
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Predicate::Contains(_))
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Predicate::Any | Predicate::MatchAll => true,
            Predicate::Contains(needle) => contains_lower(value, needle),
        }
    }
}

/// The six field predicates of a session, plus the raw text each came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    predicates: [Predicate; 6],
    raw: [String; 6],
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FilterField, raw: &str) -> Self {
        self.set(field, raw);
        self
    }

    pub fn set(&mut self, field: FilterField, raw: &str) {
        let i = field.index();
        self.raw[i] = raw.to_string();
        self.predicates[i] = Predicate::parse(raw);
    }

    pub fn get(&self, field: FilterField) -> &Predicate {
        &self.predicates[field.index()]
    }

    pub fn raw(&self, field: FilterField) -> &str {
        &self.raw[field.index()]
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.predicates.iter().any(Predicate::is_active)
    }

    pub fn matches(&self, f: &Feature) -> bool {
        FilterField::ALL
            .iter()
            .all(|field| self.get(*field).matches(field.value(f)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Filtered,
    Viewport,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Filtered => "filtered",
            FilterMode::Viewport => "viewport",
        }
    }
}

#[derive(Debug)]
pub struct FilterOutcome<'a> {
    pub mode: FilterMode,
    pub features: Vec<&'a Feature>,
}

/// Narrows `features` to what should be shown.
///
/// With any predicate active the result is the ordered subsequence matching
/// all of them. Otherwise it is the subsequence inside `viewport`, and empty
/// when there is no viewport to bound by.
pub fn apply<'a>(
    features: &'a [Feature],
    state: &FilterState,
    viewport: Option<&Bounds>,
) -> FilterOutcome<'a> {
    if state.is_active() {
        FilterOutcome {
            mode: FilterMode::Filtered,
            features: features.iter().filter(|f| state.matches(f)).collect(),
        }
    } else {
        let features = match viewport {
            Some(b) => features.iter().filter(|f| b.contains(f.lat_lng())).collect(),
            None => Vec::new(),
        };
        FilterOutcome {
            mode: FilterMode::Viewport,
            features,
        }
    }
}
