use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Half-open date range `[start, end)` covered by an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let day = at.date();
        day >= self.start && day < self.end
    }

    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }

    /// First day of every calendar month that starts inside the window.
    pub fn month_starts(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        let mut current = self.start;
        while current < self.end {
            months.push(current);
            let first_of_month = current.with_day(1).unwrap_or(current);
            match first_of_month.checked_add_months(Months::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        months
    }

    /// The start date stepped forward a month at a time while it stays
    /// inside the window. The day of month is kept, clamped to the length
    /// of shorter months.
    pub fn monthly_steps(&self) -> Vec<NaiveDate> {
        let mut steps = Vec::new();
        for offset in 0.. {
            match self.start.checked_add_months(Months::new(offset)) {
                Some(step) if step < self.end => steps.push(step),
                _ => break,
            }
        }
        steps
    }

    pub fn month_count(&self) -> usize {
        self.month_starts().len()
    }

    pub fn start_label(&self) -> String {
        self.start.format("%B %Y").to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format("%B %Y").to_string()
    }
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
        }
    }
}
