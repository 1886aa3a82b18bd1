use std::collections::HashSet;

/// The set of video ids currently checked for a batch action.
///
/// Knows nothing about the playlist itself; the session keeps it a subset of
/// the loaded videos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Select every id, or deselect everything when all are already selected.
    pub fn select_all<I, S>(&mut self, item_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let all: Vec<String> = item_ids.into_iter().map(Into::into).collect();
        if self.ids.len() == all.len() {
            self.ids.clear();
        } else {
            self.ids = all.into_iter().collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = Selection::default();
        selection.toggle("v1");
        assert!(selection.has("v1"));
        assert_eq!(selection.len(), 1);

        selection.toggle("v1");
        assert!(!selection.has("v1"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_from_partial_selects_everything() {
        let mut selection = Selection::default();
        selection.toggle("v2");
        selection.select_all(["v1", "v2", "v3"]);

        assert_eq!(selection.len(), 3);
        assert!(["v1", "v2", "v3"].iter().all(|id| selection.has(id)));
    }

    #[test]
    fn test_select_all_when_full_clears() {
        let mut selection = Selection::default();
        selection.toggle("v1");
        selection.toggle("v2");
        selection.select_all(["v1", "v2"]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_twice_is_a_toggle() {
        let mut selection = Selection::default();
        selection.select_all(["v1", "v2"]);
        assert_eq!(selection.len(), 2);
        selection.select_all(["v1", "v2"]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_on_empty_list_stays_empty() {
        let mut selection = Selection::default();
        selection.select_all(Vec::<String>::new());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut selection = Selection::default();
        selection.select_all(["v1", "v2"]);
        selection.clear();
        assert_eq!(selection.len(), 0);
        assert!(!selection.has("v1"));
    }
}
