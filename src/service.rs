// =============================================================================
// Indicator Service — request pipeline
// =============================================================================
//
// symbol + simulated date + timeframe + params
//   -> Timeframe Resolver (window start)
//   -> BarStore          (bars in [start, simulated_date])
//   -> Series Extractor  (closes / volumes)
//   -> Indicator Engine
//   -> Result Assembler  (defined points only)
//
// Every function takes the bar store explicitly. Nothing here holds state
// between calls, so identical inputs against an unchanged store give
// identical output, and requests (and watchlist symbols) can run in parallel.
// =============================================================================

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::assembler::{
    assemble, assemble_combined, assemble_macd, CombinedPoint, IndicatorPoint, MacdPoint,
};
use crate::config::RequestLimits;
use crate::error::{Result, ServiceError};
use crate::indicators::{
    calculate_ema, calculate_macd, calculate_obv, calculate_rsi, calculate_sma,
    calculate_volatility, calculate_vpt,
};
use crate::overlay::{scale_onto_price_axis, OverlayRange};
use crate::series::extract;
use crate::store::BarStore;
use crate::timeframe::{resolve, Timeframe};
use crate::types::{
    parse_simulated_date, price_change, Bar, DataCoverage, PriceHistory, StockDetail, StockInfo,
    WatchlistItem,
};

pub const DEFAULT_TIMEFRAME: &str = "1Y";
pub const DEFAULT_EMA_PERIOD: usize = 20;
pub const DEFAULT_SMA_PERIOD: usize = 20;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_VOLATILITY_PERIOD: usize = 20;
pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

// =============================================================================
// Request / response types
// =============================================================================

/// Which calculator to run, with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "indicator", rename_all = "snake_case")]
pub enum IndicatorParams {
    Ema {
        period: usize,
    },
    Sma {
        period: usize,
    },
    Rsi {
        period: usize,
    },
    Volatility {
        period: usize,
    },
    Obv,
    Vpt,
    Macd {
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    },
}

impl IndicatorParams {
    fn periods(&self) -> Vec<(&'static str, usize)> {
        match *self {
            Self::Ema { period }
            | Self::Sma { period }
            | Self::Rsi { period }
            | Self::Volatility { period } => vec![("period", period)],
            Self::Obv | Self::Vpt => Vec::new(),
            Self::Macd {
                fast_period,
                slow_period,
                signal_period,
            } => vec![
                ("fast_period", fast_period),
                ("slow_period", slow_period),
                ("signal_period", signal_period),
            ],
        }
    }

    /// Every period must be in `1..=limits.max_period`.
    pub fn validate(&self, limits: &RequestLimits) -> Result<()> {
        for (name, value) in self.periods() {
            if value == 0 || value > limits.max_period {
                return Err(ServiceError::InvalidParameter(format!(
                    "{name} must be between 1 and {}, got {value}",
                    limits.max_period
                )));
            }
        }
        Ok(())
    }

    fn overlay_range(&self) -> OverlayRange {
        match self {
            Self::Rsi { .. } => OverlayRange::Fixed { lo: 0.0, hi: 100.0 },
            _ => OverlayRange::Observed,
        }
    }
}

/// Assembled points; MACD has its own composite shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorData {
    Points(Vec<IndicatorPoint>),
    Macd(Vec<MacdPoint>),
}

impl IndicatorData {
    pub fn len(&self) -> usize {
        match self {
            Self::Points(p) => p.len(),
            Self::Macd(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorRequest {
    pub symbol: String,
    /// Raw `YYYY-MM-DD`; `None` means "latest bar".
    pub simulated_date: Option<String>,
    pub timeframe: String,
    pub params: IndicatorParams,
    /// Also map values onto the price axis.
    pub scaled: bool,
}

impl IndicatorRequest {
    pub fn new(symbol: impl Into<String>, params: IndicatorParams) -> Self {
        Self {
            symbol: symbol.into(),
            simulated_date: None,
            timeframe: DEFAULT_TIMEFRAME.to_string(),
            params,
            scaled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorResponse {
    pub symbol: String,
    pub simulated_date: NaiveDate,
    pub timeframe: String,
    pub params: IndicatorParams,
    pub data: IndicatorData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedResponse {
    pub symbol: String,
    pub simulated_date: NaiveDate,
    pub timeframe: String,
    pub ema_period: usize,
    pub indicators: Vec<CombinedPoint>,
}

// =============================================================================
// Window loading
// =============================================================================

/// Bars for one request, already clamped to `date <= simulated_date`.
struct Window {
    symbol: String,
    simulated_date: NaiveDate,
    bars: Vec<Bar>,
}

fn resolve_simulated_date(
    store: &dyn BarStore,
    symbol: &str,
    simulated_date: Option<&str>,
) -> Result<NaiveDate> {
    match simulated_date {
        Some(raw) => parse_simulated_date(raw),
        None => store.latest_bar_date(symbol),
    }
}

fn load_window(
    store: &dyn BarStore,
    symbol: &str,
    simulated_date: Option<&str>,
    timeframe: &str,
) -> Result<Window> {
    let symbol = symbol.trim().to_uppercase();
    let simulated_date = resolve_simulated_date(store, &symbol, simulated_date)?;
    let start = resolve(simulated_date, timeframe);

    let bars = store.get_bars(&symbol, start, simulated_date)?;
    if bars.is_empty() {
        return Err(ServiceError::NoDataInWindow {
            symbol,
            timeframe: timeframe.to_string(),
        });
    }

    Ok(Window {
        symbol,
        simulated_date,
        bars,
    })
}

// =============================================================================
// Operations
// =============================================================================

/// Run one calculator for one symbol as of the simulated date.
pub fn compute(
    store: &dyn BarStore,
    request: &IndicatorRequest,
    limits: &RequestLimits,
) -> Result<IndicatorResponse> {
    request.params.validate(limits)?;

    let window = load_window(
        store,
        &request.symbol,
        request.simulated_date.as_deref(),
        &request.timeframe,
    )?;
    let series = extract(&window.bars)?;
    let closes = &series.closes;
    let dates = &series.dates;

    let mut data = match request.params {
        IndicatorParams::Ema { period } => {
            IndicatorData::Points(assemble(dates, &calculate_ema(closes, period)))
        }
        IndicatorParams::Sma { period } => {
            IndicatorData::Points(assemble(dates, &calculate_sma(closes, period)))
        }
        IndicatorParams::Rsi { period } => {
            IndicatorData::Points(assemble(dates, &calculate_rsi(closes, period)))
        }
        IndicatorParams::Volatility { period } => {
            IndicatorData::Points(assemble(dates, &calculate_volatility(closes, period)))
        }
        IndicatorParams::Obv => {
            IndicatorData::Points(assemble(dates, &calculate_obv(closes, &series.volumes)))
        }
        IndicatorParams::Vpt => {
            IndicatorData::Points(assemble(dates, &calculate_vpt(closes, &series.volumes)))
        }
        IndicatorParams::Macd {
            fast_period,
            slow_period,
            signal_period,
        } => IndicatorData::Macd(assemble_macd(
            dates,
            &calculate_macd(closes, fast_period, slow_period, signal_period),
        )),
    };

    if request.scaled {
        if let IndicatorData::Points(points) = &mut data {
            scale_onto_price_axis(points, closes, request.params.overlay_range());
        }
    }

    debug!(
        symbol = %window.symbol,
        simulated_date = %window.simulated_date,
        timeframe = %request.timeframe,
        params = ?request.params,
        bars = series.len(),
        points = data.len(),
        "indicator computed"
    );

    Ok(IndicatorResponse {
        symbol: window.symbol,
        simulated_date: window.simulated_date,
        timeframe: request.timeframe.clone(),
        params: request.params,
        data,
    })
}

/// EMA plus the default MACD for every date in the window that has any
/// defined value.
pub fn combined(
    store: &dyn BarStore,
    symbol: &str,
    simulated_date: Option<&str>,
    timeframe: &str,
    ema_period: usize,
    limits: &RequestLimits,
) -> Result<CombinedResponse> {
    IndicatorParams::Ema { period: ema_period }.validate(limits)?;

    let window = load_window(store, symbol, simulated_date, timeframe)?;
    let series = extract(&window.bars)?;

    let ema = calculate_ema(&series.closes, ema_period);
    let macd = calculate_macd(
        &series.closes,
        DEFAULT_MACD_FAST,
        DEFAULT_MACD_SLOW,
        DEFAULT_MACD_SIGNAL,
    );

    Ok(CombinedResponse {
        symbol: window.symbol,
        simulated_date: window.simulated_date,
        timeframe: timeframe.to_string(),
        ema_period,
        indicators: assemble_combined(&series.dates, &ema, &macd),
    })
}

/// Raw OHLC bars in the window.
pub fn price_history(
    store: &dyn BarStore,
    symbol: &str,
    simulated_date: Option<&str>,
    timeframe: &str,
) -> Result<PriceHistory> {
    let window = load_window(store, symbol, simulated_date, timeframe)?;
    Ok(PriceHistory {
        symbol: window.symbol,
        simulated_date: window.simulated_date,
        timeframe: timeframe.to_string(),
        data: window.bars,
    })
}

/// Price, daily change and 52-week range as of the simulated date.
pub fn stock_details(
    store: &dyn BarStore,
    symbol: &str,
    simulated_date: Option<&str>,
) -> Result<StockDetail> {
    let symbol = symbol.trim().to_uppercase();
    let as_of = resolve_simulated_date(store, &symbol, simulated_date)?;

    let current = match store.latest_bar_on_or_before(&symbol, as_of) {
        Some(bar) => bar,
        None => {
            // Distinguish "never heard of it" from "nothing that early".
            store.latest_bar_date(&symbol)?;
            return Err(ServiceError::NoDataOnOrBefore {
                symbol,
                date: as_of,
            });
        }
    };

    let previous = store.previous_bar(&symbol, current.date);
    let (change, change_percent) = price_change(current.close, previous.map(|b| b.close));

    let year = store.get_bars(&symbol, Timeframe::Year1.start_date(as_of), as_of)?;
    let high_52w = year.iter().map(|b| b.high).max().unwrap_or(current.high);
    let low_52w = year.iter().map(|b| b.low).min().unwrap_or(current.low);

    Ok(StockDetail {
        name: store.name(&symbol).unwrap_or_else(|| symbol.clone()),
        symbol,
        as_of: current.date,
        current_price: current.close,
        change,
        change_percent,
        volume: current.volume,
        high_52w,
        low_52w,
    })
}

/// Split a comma-separated symbol list, trimming and upper-casing.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Latest quote per symbol as of `simulated_date` (or each symbol's latest
/// bar). Symbols are computed in parallel; symbols with no data are skipped
/// and the input order is kept.
pub fn watchlist(
    store: &dyn BarStore,
    symbols: &[String],
    simulated_date: Option<&str>,
    limits: &RequestLimits,
) -> Result<Vec<WatchlistItem>> {
    if symbols.is_empty() {
        return Err(ServiceError::InvalidParameter("No symbols provided".into()));
    }
    if symbols.len() > limits.max_watchlist_symbols {
        return Err(ServiceError::InvalidParameter(format!(
            "at most {} symbols per watchlist, got {}",
            limits.max_watchlist_symbols,
            symbols.len()
        )));
    }
    let simulated_date = simulated_date.map(parse_simulated_date).transpose()?;

    let items: Vec<WatchlistItem> = symbols
        .par_iter()
        .filter_map(|symbol| watchlist_item(store, symbol, simulated_date))
        .collect();

    debug!(requested = symbols.len(), returned = items.len(), "watchlist built");
    Ok(items)
}

fn watchlist_item(
    store: &dyn BarStore,
    symbol: &str,
    simulated_date: Option<NaiveDate>,
) -> Option<WatchlistItem> {
    let symbol = symbol.trim().to_uppercase();
    let as_of = match simulated_date {
        Some(date) => date,
        None => store.latest_bar_date(&symbol).ok()?,
    };
    let Some(current) = store.latest_bar_on_or_before(&symbol, as_of) else {
        debug!(symbol = %symbol, as_of = %as_of, "watchlist symbol skipped, no data");
        return None;
    };
    let previous = store.previous_bar(&symbol, current.date);
    let (net_change, change_percent) = price_change(current.close, previous.map(|b| b.close));

    Some(WatchlistItem {
        name: store.name(&symbol).unwrap_or_else(|| symbol.clone()),
        symbol,
        as_of: current.date,
        last_price: current.close,
        net_change,
        change_percent,
        volume: current.volume,
    })
}

pub fn list_symbols(store: &dyn BarStore) -> Vec<StockInfo> {
    store
        .symbols()
        .into_iter()
        .map(|symbol| StockInfo {
            name: store.name(&symbol).unwrap_or_else(|| symbol.clone()),
            symbol,
        })
        .collect()
}

pub fn symbol_count(store: &dyn BarStore) -> usize {
    store.symbols().len()
}

/// Data coverage for one symbol, or for the whole store. An empty store
/// reports open ends rather than an error.
pub fn date_range(store: &dyn BarStore, symbol: Option<&str>) -> Result<DataCoverage> {
    match symbol.map(|s| s.trim().to_uppercase()) {
        Some(symbol) => store
            .date_range(Some(&symbol))
            .map(|range| DataCoverage::from(Some(range)))
            .ok_or(ServiceError::SymbolNotFound(symbol)),
        None => Ok(DataCoverage::from(store.date_range(None))),
    }
}
