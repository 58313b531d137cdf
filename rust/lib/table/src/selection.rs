use crate::row::RowId;

/// Selected row identities, in the order they were selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<RowId>,
}

/// State of the "select all" header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderCheck {
    Unchecked,
    Indeterminate,
    Checked,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one identity. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &RowId) -> bool {
        if let Some(pos) = self.ids.iter().position(|x| x == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.clone());
            true
        }
    }

    /// "Select all" over the rows currently on the page.
    ///
    /// When every row on the page is already selected, the whole selection
    /// is cleared. Otherwise the selection becomes exactly the page's ids.
    /// Returns whether anything is selected after.
    pub fn toggle_all(&mut self, page_ids: &[RowId]) -> bool {
        if self.covers(page_ids) {
            self.ids.clear();
            return false;
        }
        self.ids.clear();
        for id in page_ids {
            if !self.ids.contains(id) {
                self.ids.push(id.clone());
            }
        }
        !self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Whether the page is non-empty and every id on it is selected.
    pub fn covers(&self, page_ids: &[RowId]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.contains(id))
    }

    /// Header checkbox for the page, from how many of its rows are selected.
    pub fn header_check(&self, page_ids: &[RowId]) -> HeaderCheck {
        let selected = page_ids.iter().filter(|id| self.contains(id)).count();
        if selected == 0 {
            HeaderCheck::Unchecked
        } else if selected == page_ids.len() {
            HeaderCheck::Checked
        } else {
            HeaderCheck::Indeterminate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: std::ops::Range<i64>) -> Vec<RowId> {
        ids.map(RowId::Int).collect()
    }

    #[test]
    fn toggle_flips_membership() {
        let mut sel = Selection::new();
        assert!(sel.toggle(&RowId::Int(1)));
        assert!(sel.toggle(&RowId::from("svc-auth")));
        assert!(!sel.toggle(&RowId::Int(1)));
        assert_eq!(sel.ids(), &[RowId::from("svc-auth")]);
    }

    #[test]
    fn toggle_all_selects_page_then_clears() {
        let mut sel = Selection::new();
        let first_page = page(1..21);

        assert!(sel.toggle_all(&first_page));
        assert_eq!(sel.len(), 20);
        assert_eq!(sel.header_check(&first_page), HeaderCheck::Checked);

        assert!(!sel.toggle_all(&first_page));
        assert!(sel.is_empty());
        assert_eq!(sel.header_check(&first_page), HeaderCheck::Unchecked);
    }

    #[test]
    fn partial_selection_is_indeterminate_and_select_all_completes_it() {
        let mut sel = Selection::new();
        sel.toggle(&RowId::Int(3));
        assert_eq!(sel.header_check(&page(1..6)), HeaderCheck::Indeterminate);

        sel.toggle_all(&page(1..6));
        assert_eq!(sel.len(), 5);
        assert!(sel.contains(&RowId::Int(3)));
    }

    #[test]
    fn select_all_replaces_ids_from_other_pages() {
        let mut sel = Selection::new();
        sel.toggle(&RowId::Int(1));
        sel.toggle_all(&page(21..41));
        assert!(!sel.contains(&RowId::Int(1)));
        assert_eq!(sel.len(), 20);
    }

    #[test]
    fn empty_page() {
        let mut sel = Selection::new();
        assert!(!sel.toggle_all(&[]));
        assert_eq!(sel.header_check(&[]), HeaderCheck::Unchecked);
    }

    #[test]
    fn equal_sized_selection_elsewhere_does_not_clear() {
        let mut sel = Selection::new();
        sel.toggle_all(&page(1..21));
        let second = page(21..41);
        assert_eq!(sel.header_check(&second), HeaderCheck::Unchecked);

        assert!(sel.toggle_all(&second));
        assert_eq!(sel.ids(), second.as_slice());
        assert_eq!(sel.header_check(&second), HeaderCheck::Checked);
    }

    #[test]
    fn header_counts_only_rows_on_the_page() {
        let mut sel = Selection::new();
        sel.toggle(&RowId::Int(1));
        sel.toggle(&RowId::Int(2));
        sel.toggle(&RowId::Int(30));
        assert_eq!(sel.header_check(&page(1..3)), HeaderCheck::Checked);
        assert_eq!(sel.header_check(&page(1..6)), HeaderCheck::Indeterminate);
        assert_eq!(sel.header_check(&page(41..46)), HeaderCheck::Unchecked);
    }
}
