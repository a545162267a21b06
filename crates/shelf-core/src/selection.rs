use shelf_models::Entry;

/// Which entry, if any, is pulled off the shelf.
///
/// Holds only the id, so it survives a reload of the collection as long as
/// the entry is still in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected_id: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`, replacing any previous selection.
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected_id = Some(id.into());
    }

    pub fn deselect(&mut self) {
        self.selected_id = None;
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    /// The selected entry, or `None` when nothing is selected or the id is
    /// no longer part of `entries`.
    pub fn resolve<'a>(&self, entries: &'a [Entry]) -> Option<&'a Entry> {
        let id = self.selected_id.as_deref()?;
        entries.iter().find(|entry| entry.id == id)
    }

    /// Position of the selected entry in `entries`.
    pub fn index_in(&self, entries: &[Entry]) -> Option<usize> {
        let id = self.selected_id.as_deref()?;
        entries.iter().position(|entry| entry.id == id)
    }

    /// Select by position. Out-of-range indices leave the selection alone
    /// and return `false`.
    pub fn select_by_index(&mut self, entries: &[Entry], index: usize) -> bool {
        match entries.get(index) {
            Some(entry) => {
                self.selected_id = Some(entry.id.clone());
                true
            }
            None => false,
        }
    }
}
