//! CSV file data adapter.
//!
//! One file per symbol at `<base_path>/<symbol>.csv` with a header row that
//! contains at least `date` and `close` columns (any order, any case; other
//! columns are ignored). Empty or `NaN` closes are kept as NaN so the
//! strategy can reject them.

use crate::domain::bar::Bar;
use crate::domain::config::parse_date;
use crate::domain::error::{BreadfreeError, Result};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| BreadfreeError::Data {
                reason: format!("missing {} column", name),
            })
    }

    fn parse_close(raw: &str, line: u64) -> Result<f64> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return Ok(f64::NAN);
        }
        raw.parse().map_err(|e| BreadfreeError::Data {
            reason: format!("invalid close value '{}' on line {}: {}", raw, line, e),
        })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| BreadfreeError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| BreadfreeError::Data {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let date_col = Self::column(&headers, "date")?;
        let close_col = Self::column(&headers, "close")?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BreadfreeError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = record.get(date_col).unwrap_or("");
            let date = parse_date(date_str).ok_or_else(|| BreadfreeError::Data {
                reason: format!("invalid date '{}' on line {}", date_str, line),
            })?;
            if date < start_date || date > end_date {
                continue;
            }

            let close = Self::parse_close(record.get(close_col).unwrap_or(""), line)?;
            bars.push(Bar::new(date, close));
        }

        bars.sort_by_key(|b| b.date);
        tracing::debug!(symbol, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }
}
