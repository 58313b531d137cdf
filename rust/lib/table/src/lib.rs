//! Headless table engine.
//!
//! A [`DataTable`] owns the rows, the column schema and all derived state
//! (sort order, current page, selection, visible columns). Presentation
//! layers read a [`TableView`] and feed user actions back as method calls.
//!
//! ```ignore
//! let mut table = DataTable::new(columns, TableOptions::default().page_size(20));
//! table.set_data(rows);
//! table.toggle_sort("createdAt");
//! let view = table.view();
//! ```

pub mod column;
pub mod engine;
pub mod export;
pub mod page;
pub mod row;
pub mod selection;
pub mod sort;
pub mod visibility;

pub use column::{CellError, Column, ExportFn, RenderFn};
pub use engine::{
    DataTable, HeaderView, RowView, SelectionListener, SortListener, TableOptions, TableView,
};
pub use export::{
    export_filename, DirDownloader, Downloader, ExportError, ExportFile, ExportFormat,
    ExportOptions, ExportScope, MemoryDownloader,
};
pub use page::PageInfo;
pub use row::{display_value, RowId, TableRow};
pub use selection::{HeaderCheck, Selection};
pub use sort::{SortDirection, SortSpec};
pub use visibility::{ColumnVisibility, VisibilityOptions, DEFAULT_STORAGE_KEY};
