use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::column::Column;
use crate::export::{
    export_filename, to_csv, to_json, Downloader, ExportError, ExportFile, ExportFormat,
    ExportOptions, ExportScope,
};
use crate::page::{page_range, PageInfo};
use crate::row::{RowId, TableRow};
use crate::selection::{HeaderCheck, Selection};
use crate::sort::{next_sort, sorted_indices, SortDirection, SortSpec};
use crate::visibility::{ColumnVisibility, VisibilityOptions};

pub type SortListener = Arc<dyn Fn(&SortSpec) + Send + Sync>;
pub type SelectionListener<R> = Arc<dyn Fn(&[R], &[RowId]) + Send + Sync>;

/// Construction options for a [`DataTable`].
pub struct TableOptions<R> {
    /// Rows per page; 0 shows everything on one page.
    pub page_size: usize,
    pub initial_sort: Option<SortSpec>,
    pub enable_selection: bool,
    pub empty_text: String,
    pub export: Option<ExportOptions<R>>,
    pub visibility: Option<VisibilityOptions>,
    pub on_sort_change: Option<SortListener>,
    pub on_selection_change: Option<SelectionListener<R>>,
}

impl<R> Default for TableOptions<R> {
    fn default() -> Self {
        Self {
            page_size: 0,
            initial_sort: None,
            enable_selection: false,
            empty_text: "暂无数据".to_string(),
            export: None,
            visibility: None,
            on_sort_change: None,
            on_selection_change: None,
        }
    }
}

impl<R> TableOptions<R> {
    pub fn page_size(mut self, n: usize) -> Self {
        self.page_size = n;
        self
    }

    pub fn initial_sort(mut self, spec: SortSpec) -> Self {
        self.initial_sort = Some(spec);
        self
    }

    pub fn selectable(mut self) -> Self {
        self.enable_selection = true;
        self
    }

    pub fn empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    pub fn export(mut self, opts: ExportOptions<R>) -> Self {
        self.export = Some(opts);
        self
    }

    pub fn visibility(mut self, opts: VisibilityOptions) -> Self {
        self.visibility = Some(opts);
        self
    }

    pub fn on_sort_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&SortSpec) + Send + Sync + 'static,
    {
        self.on_sort_change = Some(Arc::new(f));
        self
    }

    pub fn on_selection_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&[R], &[RowId]) + Send + Sync + 'static,
    {
        self.on_selection_change = Some(Arc::new(f));
        self
    }
}

/// One header cell of the rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub key: String,
    pub name: String,
    pub sortable: bool,
    /// Current direction when this column drives the sort.
    pub sorted: Option<SortDirection>,
}

/// One body row of the rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: Option<RowId>,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// Everything a presentation layer needs to draw the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    /// Set instead of rows when there is nothing to show.
    pub empty: Option<String>,
    pub page: PageInfo,
    pub selection: Option<HeaderCheck>,
    pub selected_count: usize,
    pub export_formats: Vec<ExportFormat>,
}

/// Client-side table engine: sorting, paging, selection, column visibility
/// and export over a set of rows.
///
/// Derived state follows the input in a fixed order: visible columns, then
/// sorted order, then the current page, then the selection. Replacing the
/// rows starts a new dataset generation, which resets the page to 1 and
/// clears the selection. Sorting and paging leave the selection alone.
pub struct DataTable<R> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    generation: u64,
    sort: Option<SortSpec>,
    order: Vec<usize>,
    page: usize,
    selection: Selection,
    visibility: ColumnVisibility,
    options: TableOptions<R>,
}

impl<R: TableRow + Clone> DataTable<R> {
    pub fn new(columns: Vec<Column<R>>, mut options: TableOptions<R>) -> Self {
        let keys = columns.iter().map(|c| c.key.clone()).collect();
        let visibility = ColumnVisibility::new(keys, options.visibility.take());
        let sort = options.initial_sort.clone();
        Self {
            columns,
            rows: Vec::new(),
            generation: 0,
            sort,
            order: Vec::new(),
            page: 1,
            selection: Selection::new(),
            visibility,
            options,
        }
    }

    // ====================================================================
    // Data
    // ====================================================================

    /// Replace the dataset.
    pub fn set_data(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.generation += 1;
        self.page = 1;
        self.selection.clear();
        self.resort();
        debug!(
            "DataTable: dataset generation {} with {} rows",
            self.generation,
            self.rows.len()
        );
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    // ====================================================================
    // Columns
    // ====================================================================

    pub fn visible_columns(&self) -> Vec<&Column<R>> {
        self.columns
            .iter()
            .filter(|c| self.visibility.is_visible(&c.key))
            .collect()
    }

    pub fn visible_keys(&self) -> &[String] {
        self.visibility.visible_keys()
    }

    pub fn toggle_column(&mut self, key: &str) {
        self.visibility.toggle(key);
    }

    pub fn show_all_columns(&mut self) {
        self.visibility.show_all();
    }

    pub fn hide_all_columns(&mut self) {
        self.visibility.hide_all();
    }

    // ====================================================================
    // Sorting
    // ====================================================================

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Header click. Non-sortable or unknown columns are ignored; returns
    /// whether the sort changed.
    pub fn toggle_sort(&mut self, key: &str) -> bool {
        let sortable = self.columns.iter().any(|c| c.key == key && c.sortable);
        if !sortable {
            return false;
        }
        let next = next_sort(self.sort.as_ref(), key);
        if let Some(listener) = &self.options.on_sort_change {
            listener(&next);
        }
        self.sort = Some(next);
        self.resort();
        true
    }

    pub fn sorted_rows(&self) -> Vec<&R> {
        self.order.iter().map(|&i| &self.rows[i]).collect()
    }

    fn resort(&mut self) {
        self.order = sorted_indices(&self.rows, &self.columns, self.sort.as_ref());
    }

    // ====================================================================
    // Paging
    // ====================================================================

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(self.page, self.rows.len(), self.options.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.page_info().page
    }

    pub fn total_pages(&self) -> usize {
        self.page_info().total_pages
    }

    /// Go to a page. Out-of-range requests land on the nearest valid page.
    pub fn set_page(&mut self, page: usize) {
        self.page = PageInfo::new(page, self.rows.len(), self.options.page_size).page;
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page() + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page().saturating_sub(1));
    }

    pub fn paged_rows(&self) -> Vec<&R> {
        let range = page_range(self.order.len(), self.options.page_size, self.page);
        self.order[range].iter().map(|&i| &self.rows[i]).collect()
    }

    fn paged_ids(&self) -> Vec<RowId> {
        self.paged_rows().iter().filter_map(|r| r.row_id()).collect()
    }

    // ====================================================================
    // Selection
    // ====================================================================

    pub fn selection_enabled(&self) -> bool {
        self.options.enable_selection
    }

    pub fn selected_ids(&self) -> &[RowId] {
        self.selection.ids()
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.contains(id)
    }

    /// Flip one row. Rows without an identity cannot be selected.
    pub fn toggle_row(&mut self, id: &RowId) {
        if !self.options.enable_selection {
            return;
        }
        self.selection.toggle(id);
        let rows: Vec<R> = self
            .paged_rows()
            .into_iter()
            .filter(|r| r.row_id().is_some_and(|rid| self.selection.contains(&rid)))
            .cloned()
            .collect();
        self.notify_selection(&rows);
    }

    /// "Select all" for the current page; clears everything when the page
    /// is already fully selected.
    pub fn toggle_select_all(&mut self) {
        if !self.options.enable_selection {
            return;
        }
        let ids = self.paged_ids();
        let rows: Vec<R> = if self.selection.toggle_all(&ids) {
            self.paged_rows().into_iter().cloned().collect()
        } else {
            Vec::new()
        };
        self.notify_selection(&rows);
    }

    pub fn header_check(&self) -> HeaderCheck {
        self.selection.header_check(&self.paged_ids())
    }

    fn notify_selection(&self, rows: &[R]) {
        if let Some(listener) = &self.options.on_selection_change {
            listener(rows, self.selection.ids());
        }
    }

    // ====================================================================
    // Export
    // ====================================================================

    /// Build an export file. `None` when export is disabled or the format
    /// is not offered.
    pub fn export(&self, format: ExportFormat) -> Result<Option<ExportFile>, ExportError> {
        self.export_at(format, Utc::now())
    }

    pub fn export_at(
        &self,
        format: ExportFormat,
        at: DateTime<Utc>,
    ) -> Result<Option<ExportFile>, ExportError> {
        let Some(opts) = self.options.export.as_ref().filter(|o| o.enabled) else {
            return Ok(None);
        };
        if !opts.formats.contains(&format) {
            debug!("DataTable: export format {:?} not offered", format);
            return Ok(None);
        }

        let base = match opts.scope {
            ExportScope::All => self.sorted_rows(),
            ExportScope::Page => self.paged_rows(),
        };
        let pool: Vec<&R> = if self.options.enable_selection && !self.selection.is_empty() {
            base.into_iter()
                .filter(|r| r.row_id().is_some_and(|id| self.selection.contains(&id)))
                .collect()
        } else {
            base
        };
        let mapped: Vec<R> = match &opts.map_row {
            Some(map) => pool.iter().map(|r| map(*r)).collect(),
            None => pool.iter().map(|r| (*r).clone()).collect(),
        };
        let rows: Vec<&R> = mapped.iter().collect();

        let columns: Vec<&Column<R>> = self
            .columns
            .iter()
            .filter(|c| opts.columns_filter.as_ref().map_or(true, |f| f(*c)))
            .filter(|c| {
                !(opts.respect_visibility && self.visibility.is_configured())
                    || self.visibility.is_visible(&c.key)
            })
            .collect();

        let content = match format {
            ExportFormat::Csv => to_csv(&rows, &columns),
            ExportFormat::Json => to_json(&rows, &columns)?,
        };
        Ok(Some(ExportFile {
            filename: export_filename(opts.filename_prefix.as_deref(), at, format),
            mime: format.mime(),
            content,
        }))
    }

    /// Export and hand the file to a downloader. Returns the delivered
    /// location, or `None` when nothing was exported.
    pub fn export_to(
        &self,
        format: ExportFormat,
        downloader: &dyn Downloader,
    ) -> Result<Option<String>, ExportError> {
        match self.export(format)? {
            Some(file) => downloader.offer(&file).map(Some),
            None => Ok(None),
        }
    }

    // ====================================================================
    // View
    // ====================================================================

    /// Render the current state.
    ///
    /// Cell renderers run unguarded; a panicking renderer unwinds out of
    /// this call so an enclosing error boundary can take over.
    pub fn view(&self) -> TableView {
        let columns = self.visible_columns();
        let headers = columns
            .iter()
            .map(|c| HeaderView {
                key: c.key.clone(),
                name: c.name.clone(),
                sortable: c.sortable,
                sorted: self
                    .sort
                    .as_ref()
                    .filter(|s| c.sortable && s.key == c.key)
                    .map(|s| s.direction),
            })
            .collect();

        let paged = self.paged_rows();
        let rows: Vec<RowView> = paged
            .iter()
            .map(|r| {
                let id = r.row_id();
                RowView {
                    selected: self.options.enable_selection
                        && id.as_ref().is_some_and(|i| self.selection.contains(i)),
                    id,
                    cells: columns.iter().map(|c| c.display(*r)).collect(),
                }
            })
            .collect();
        let empty = rows.is_empty().then(|| self.options.empty_text.clone());

        TableView {
            headers,
            rows,
            empty,
            page: self.page_info(),
            selection: self
                .options
                .enable_selection
                .then(|| self.selection.header_check(&self.paged_ids())),
            selected_count: self.selection.len(),
            export_formats: self
                .options
                .export
                .as_ref()
                .filter(|o| o.enabled)
                .map(|o| o.formats.clone())
                .unwrap_or_default(),
        }
    }
}

impl<R> fmt::Debug for DataTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("generation", &self.generation)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .finish()
    }
}
