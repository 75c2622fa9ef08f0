use crate::model::{Feature, FeatureId};
use crate::util::contains_lower;
use serde::Serialize;

/// Rows beyond this are not rendered.
pub const RENDER_CAP: usize = 500;
pub const UNNAMED: &str = "Unnamed Church";
pub const EMPTY_STATE: &str = "No churches found";
const DETAIL_SEP: &str = " • ";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: FeatureId,
    pub title: String,
    pub details: String,
    /// Index among rendered rows, used to scroll the panel.
    pub position: usize,
    pub hidden: bool,
    pub highlighted: bool,
}

impl ListRow {
    fn from_feature(f: &Feature, position: usize) -> Option<Self> {
        let id = f.id()?;
        let p = &f.properties;
        let title = p
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(UNNAMED)
            .to_string();
        let details = [&p.kind, &p.jurisdiction, &p.city, &p.country]
            .iter()
            .filter_map(|v| v.as_deref())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(DETAIL_SEP);
        Some(Self {
            id,
            title,
            details,
            position,
            hidden: false,
            highlighted: false,
        })
    }

    fn matches(&self, query: &str) -> bool {
        contains_lower(&self.title, query) || contains_lower(&self.details, query)
    }
}

/// The list panel: rendered rows, local search and single-row highlight.
#[derive(Debug, Clone, Default)]
pub struct ListView {
    rows: Vec<ListRow>,
    note: Option<String>,
    empty: bool,
    search: String,
    highlighted: Option<FeatureId>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<'a, I>(&mut self, features: I)
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        self.rows.clear();
        self.note = None;
        self.highlighted = None;
        let mut total = 0usize;
        for f in features {
            total += 1;
            if total > RENDER_CAP {
                continue;
            }
            match ListRow::from_feature(f, self.rows.len()) {
                Some(row) => self.rows.push(row),
                None => tracing::warn!(
                    title = ?f.properties.title,
                    "skipping list row for feature without id"
                ),
            }
        }
        self.empty = total == 0;
        if total > RENDER_CAP {
            self.note = Some(format!(
                "Showing {} of {} churches. Apply filters to narrow results.",
                RENDER_CAP, total
            ));
        }
        self.refresh_search();
        tracing::debug!(rows = self.rows.len(), total, "list rendered");
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &ListRow> {
        self.rows.iter().filter(|r| !r.hidden)
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn empty_state(&self) -> Option<&'static str> {
        self.empty.then_some(EMPTY_STATE)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Narrows the rendered rows without touching the underlying result.
    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_lowercase();
        self.refresh_search();
    }

    fn refresh_search(&mut self) {
        let q = self.search.clone();
        for r in self.rows.iter_mut() {
            r.hidden = !r.matches(&q);
        }
    }

    /// Highlights exactly one row. Returns its position, or `None` when the
    /// id is not rendered (the previous highlight then stays).
    pub fn select(&mut self, id: FeatureId) -> Option<usize> {
        let pos = self.rows.iter().position(|r| r.id == id)?;
        for r in self.rows.iter_mut() {
            r.highlighted = r.id == id;
        }
        self.highlighted = Some(id);
        Some(pos)
    }

    pub fn highlighted(&self) -> Option<FeatureId> {
        self.highlighted
    }

    pub fn clear_search(&mut self) {
        self.set_search("");
    }
}
