// =============================================================================
// Bar Store
// =============================================================================
//
// The data-access seam. The service core only ever sees `&dyn BarStore`,
// handed in explicitly per call; there is no global connection or session.
// Implementations must return bars ascending by date with inclusive bounds.

pub mod csv_loader;
pub mod memory;

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{Bar, DateRange};

pub use csv_loader::{load_csv_dir, LoadReport};
pub use memory::MemoryBarStore;

pub trait BarStore: Send + Sync {
    /// Bars for `symbol` with `from <= date <= to`, ascending.
    ///
    /// Fails with `SymbolNotFound` when the symbol has no bars at all. An
    /// empty vector means the symbol exists but nothing falls in range.
    fn get_bars(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<Bar>>;

    /// Date of the most recent bar for `symbol`.
    fn latest_bar_date(&self, symbol: &str) -> Result<NaiveDate>;

    /// Most recent bar dated on or before `date`.
    fn latest_bar_on_or_before(&self, symbol: &str, date: NaiveDate) -> Option<Bar>;

    /// Most recent bar strictly before `date`.
    fn previous_bar(&self, symbol: &str, date: NaiveDate) -> Option<Bar>;

    /// All known symbols, sorted.
    fn symbols(&self) -> Vec<String>;

    /// Display name for `symbol`, if one is known.
    fn name(&self, symbol: &str) -> Option<String>;

    /// First and last bar date for one symbol, or across the whole store.
    fn date_range(&self, symbol: Option<&str>) -> Option<DateRange>;
}
