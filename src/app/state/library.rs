use super::super::messages::SortColumn;
use crate::source::MagazineSummary;

/// Library screen model.
pub struct LibraryState {
    pub(in crate::app) loading: bool,
    pub(in crate::app) error: Option<String>,
    pub(in crate::app) entries: Vec<MagazineSummary>,
    pub(in crate::app) filter: String,
    pub(in crate::app) sort_column: SortColumn,
    pub(in crate::app) sort_desc: bool,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            entries: Vec::new(),
            filter: String::new(),
            sort_column: SortColumn::PublishDate,
            sort_desc: true,
        }
    }
}

impl LibraryState {
    /// Clicking the active column flips direction; a new column starts at its
    /// natural order (titles A-Z, newest issues first).
    pub(in crate::app) fn sort_by(&mut self, column: SortColumn) {
        if self.sort_column == column {
            self.sort_desc = !self.sort_desc;
        } else {
            self.sort_column = column;
            self.sort_desc = matches!(column, SortColumn::PublishDate);
        }
    }

    pub(in crate::app) fn visible_entries(&self) -> Vec<&MagazineSummary> {
        let needle = self.filter.trim().to_lowercase();
        let mut visible: Vec<&MagazineSummary> = self
            .entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.title.to_lowercase().contains(&needle))
            .collect();
        visible.sort_by(|a, b| {
            let ordering = match self.sort_column {
                SortColumn::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                SortColumn::PublishDate => a.publish_date.cmp(&b.publish_date),
            };
            if self.sort_desc {
                ordering.reverse()
            } else {
                ordering
            }
        });
        visible
    }
}
