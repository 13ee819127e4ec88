// =============================================================================
// In-memory bar store
// =============================================================================
//
// One `BTreeMap<date, Bar>` per symbol, which gives uniqueness per
// (symbol, date) and ascending order for free. Built once at startup and
// shared read-only behind an `Arc`.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use super::BarStore;
use crate::error::{Result, ServiceError};
use crate::types::{Bar, DateRange};

#[derive(Debug, Default, Clone)]
pub struct MemoryBarStore {
    series: HashMap<String, BTreeMap<NaiveDate, Bar>>,
    names: HashMap<String, String>,
}

impl MemoryBarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert bars for `symbol` (upper-cased). A bar for an existing date
    /// replaces the old one. Inserting nothing does not register the symbol.
    pub fn insert_bars(&mut self, symbol: &str, bars: impl IntoIterator<Item = Bar>) {
        let mut bars = bars.into_iter().peekable();
        if bars.peek().is_none() {
            return;
        }
        let entry = self.series.entry(symbol.to_uppercase()).or_default();
        for bar in bars {
            entry.insert(bar.date, bar);
        }
    }

    pub fn set_name(&mut self, symbol: &str, name: impl Into<String>) {
        self.names.insert(symbol.to_uppercase(), name.into());
    }

    pub fn symbol_count(&self) -> usize {
        self.series.len()
    }

    pub fn bar_count(&self) -> usize {
        self.series.values().map(BTreeMap::len).sum()
    }

    fn bars_for(&self, symbol: &str) -> Option<&BTreeMap<NaiveDate, Bar>> {
        self.series.get(&symbol.to_uppercase())
    }
}

impl BarStore for MemoryBarStore {
    fn get_bars(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<Bar>> {
        let bars = self
            .bars_for(symbol)
            .ok_or_else(|| ServiceError::SymbolNotFound(symbol.to_uppercase()))?;
        if from > to {
            return Ok(Vec::new());
        }
        Ok(bars.range(from..=to).map(|(_, bar)| bar.clone()).collect())
    }

    fn latest_bar_date(&self, symbol: &str) -> Result<NaiveDate> {
        self.bars_for(symbol)
            .and_then(|bars| bars.keys().next_back().copied())
            .ok_or_else(|| ServiceError::SymbolNotFound(symbol.to_uppercase()))
    }

    fn latest_bar_on_or_before(&self, symbol: &str, date: NaiveDate) -> Option<Bar> {
        self.bars_for(symbol)?
            .range(..=date)
            .next_back()
            .map(|(_, bar)| bar.clone())
    }

    fn previous_bar(&self, symbol: &str, date: NaiveDate) -> Option<Bar> {
        self.bars_for(symbol)?
            .range(..date)
            .next_back()
            .map(|(_, bar)| bar.clone())
    }

    fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.series.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    fn name(&self, symbol: &str) -> Option<String> {
        let symbol = symbol.to_uppercase();
        if let Some(name) = self.names.get(&symbol) {
            return Some(name.clone());
        }
        self.series.contains_key(&symbol).then_some(symbol)
    }

    fn date_range(&self, symbol: Option<&str>) -> Option<DateRange> {
        let ranges = match symbol {
            Some(symbol) => vec![self.bars_for(symbol)?],
            None => self.series.values().collect(),
        };
        let start_date = ranges.iter().filter_map(|b| b.keys().next()).min().copied()?;
        let end_date = ranges.iter().filter_map(|b| b.keys().next_back()).max().copied()?;
        Some(DateRange {
            start_date,
            end_date,
        })
    }
}
