use crate::filter::{FilterField, MATCH_ALL};
use crate::model::Feature;
use serde::Serialize;
use std::collections::HashSet;

pub const SUGGEST_LIMIT_DESKTOP: usize = 100;
pub const SUGGEST_LIMIT_MOBILE: usize = 50;

/// An insertion-ordered set of distinct, non-empty strings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValueSet {
    values: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl ValueSet {
    pub fn insert(&mut self, v: &str) {
        if v.is_empty() || self.seen.contains(v) {
            return;
        }
        self.seen.insert(v.to_string());
        self.values.push(v.to_string());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, v: &str) -> bool {
        self.seen.contains(v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

/// Distinct values per filter field, used for autocomplete only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UniqueValues {
    pub titles: ValueSet,
    pub cities: ValueSet,
    pub countries: ValueSet,
    pub jurisdictions: ValueSet,
    pub types: ValueSet,
    pub rites: ValueSet,
}

/// Coarse type bucket offered next to the raw type values.
pub fn type_category(kind: &str) -> Option<&'static str> {
    let k = kind.to_lowercase();
    if k.contains("basilica") || k.contains("cathedral") {
        Some("Basilica or Cathedral")
    } else if k.contains("parish") || k.contains("church") || k.contains("shrine") {
        Some("Church or Shrine")
    } else if k.contains("monument") {
        Some("Historic Church or Monument")
    } else {
        None
    }
}

impl UniqueValues {
    pub fn build<'a, I>(features: I) -> Self
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        let mut u = UniqueValues::default();
        for f in features {
            u.titles.insert(FilterField::Title.value(f));
            u.cities.insert(FilterField::City.value(f));
            u.countries.insert(FilterField::Country.value(f));
            u.jurisdictions.insert(FilterField::Jurisdiction.value(f));
            u.rites.insert(FilterField::Rite.value(f));
            let kind = FilterField::Type.value(f);
            if !kind.is_empty() {
                u.types.insert(kind);
                if let Some(cat) = type_category(kind) {
                    u.types.insert(cat);
                }
            }
        }
        u
    }

    pub fn for_field(&self, field: FilterField) -> &ValueSet {
        match field {
            FilterField::Title => &self.titles,
            FilterField::City => &self.cities,
            FilterField::Country => &self.countries,
            FilterField::Jurisdiction => &self.jurisdictions,
            FilterField::Type => &self.types,
            FilterField::Rite => &self.rites,
        }
    }

    /// Autocomplete list for `field`: `All` first, then up to `limit` values
    /// containing `query` (or simply the first `limit` when `query` is empty).
    pub fn suggest(&self, field: FilterField, query: &str, limit: usize) -> Vec<String> {
        let q = query.to_lowercase();
        let mut out = Vec::with_capacity(limit + 1);
        out.push(MATCH_ALL.to_string());
        out.extend(
            self.for_field(field)
                .iter()
                .filter(|v| q.is_empty() || v.to_lowercase().contains(&q))
                .take(limit)
                .map(str::to_string),
        );
        out
    }
}
