//! # Cash Ledger
//!
//! Dated income and expense entries with day, month and year roll-ups.
//!
//! ## Aggregation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cash Ledger Views                                  │
//! │                                                                         │
//! │  entries ──► daily_summary()  (every day present + today, newest first)│
//! │                   │                                                     │
//! │                   ├──► monthly_summary(month?, year?)  by (year, month)│
//! │                   └──► yearly_summary()                by year         │
//! │                                                                         │
//! │  entries ──► details_for_day(date)       one day, placeholder hidden   │
//! │  entries ──► filter_by_period(from, to)  inclusive range               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Opening Balance
//! A day with no movements is marked by a zero-value income entry described
//! as [`OPENING_BALANCE_DESCRIPTION`]. [`CashLedger::open_day`] records it for
//! today; the first real entry of that day removes it again.
//!
//! ## Sign Convention
//! Amounts are stored as magnitudes. Expenses subtract in every aggregate.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::SharedClock;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CashEntry, CashKind, OPENING_BALANCE_DESCRIPTION};
use crate::validation::{validate_cash_amount, validate_description};

// =============================================================================
// Summary Types
// =============================================================================

/// Income, expense and net for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub income: Money,
    pub expense: Money,
    /// `income - expense`
    pub net: Money,
}

/// Calendar month used as a grouping key. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: i32,
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    income: Money,
    expense: Money,
}

impl Totals {
    fn record(&mut self, kind: CashKind, amount: Money) {
        match kind {
            CashKind::Income => self.income += amount,
            CashKind::Expense => self.expense += amount,
        }
    }

    fn net(&self) -> Money {
        self.income - self.expense
    }
}

// =============================================================================
// Cash Ledger
// =============================================================================

/// Append-only income/expense log.
///
/// ## Invariants
/// - Every stored amount is non-negative
/// - Expenses are only ever recorded for the day the clock reports as today
/// - An opening-balance placeholder never shares its day with a real entry
#[derive(Debug, Clone)]
pub struct CashLedger {
    entries: Vec<CashEntry>,
    clock: SharedClock,
}

impl CashLedger {
    /// Creates an empty ledger.
    pub fn new(clock: SharedClock) -> Self {
        CashLedger {
            entries: Vec::new(),
            clock,
        }
    }

    /// Rebuilds a ledger from stored entries.
    ///
    /// Placeholders left on days that also hold real entries are dropped.
    pub fn from_entries(entries: Vec<CashEntry>, clock: SharedClock) -> Self {
        let mut ledger = CashLedger { entries, clock };
        ledger.prune_placeholders(None);
        ledger
    }

    #[inline]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Records income. `date` defaults to today and may lie in the past.
    ///
    /// The absolute value of `amount` is stored.
    pub fn add_income(
        &mut self,
        description: &str,
        amount: Money,
        date: Option<NaiveDate>,
    ) -> CoreResult<&CashEntry> {
        let date = date.unwrap_or_else(|| self.today());
        self.record(CashKind::Income, description, amount, date)
    }

    /// Records an expense. `date` defaults to today.
    ///
    /// ## Errors
    /// - `ExpenseNotToday` if `date` is any other day
    pub fn add_expense(
        &mut self,
        description: &str,
        amount: Money,
        date: Option<NaiveDate>,
    ) -> CoreResult<&CashEntry> {
        let today = self.today();
        let date = date.unwrap_or(today);
        if !self.can_add_expense(date) {
            return Err(CoreError::ExpenseNotToday { date, today });
        }
        self.record(CashKind::Expense, description, amount, date)
    }

    fn record(
        &mut self,
        kind: CashKind,
        description: &str,
        amount: Money,
        date: NaiveDate,
    ) -> CoreResult<&CashEntry> {
        validate_description(description)?;
        validate_cash_amount(amount)?;

        let entry = CashEntry {
            date,
            kind,
            description: description.to_string(),
            amount: amount.abs(),
        };
        info!(
            date = %date,
            kind = %kind,
            amount = %entry.amount,
            "Cash entry recorded"
        );

        self.entries.push(entry);
        self.prune_placeholders(Some(date));

        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Records the opening-balance placeholder for today if the day is empty.
    ///
    /// Returns `true` when a placeholder was added.
    pub fn open_day(&mut self) -> bool {
        let today = self.today();
        if self.entries.iter().any(|e| e.date == today) {
            return false;
        }

        debug!(date = %today, "{} recorded", OPENING_BALANCE_DESCRIPTION);
        self.entries.push(CashEntry::opening_balance(today));
        true
    }

    /// Drops placeholders on days (or on `only`) that hold real entries.
    fn prune_placeholders(&mut self, only: Option<NaiveDate>) {
        let busy: Vec<NaiveDate> = self
            .entries
            .iter()
            .filter(|e| !e.is_opening_balance())
            .filter(|e| only.map_or(true, |d| e.date == d))
            .map(|e| e.date)
            .collect();

        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.is_opening_balance() && busy.contains(&e.date)));

        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!(pruned, "Opening balance placeholders pruned");
        }
    }

    /// Checks if an expense may be dated `date`.
    pub fn can_add_expense(&self, date: NaiveDate) -> bool {
        date == self.today()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Entries of one day: income first, then expenses, each by description.
    ///
    /// The placeholder is only returned when it is alone on its day.
    pub fn details_for_day(&self, date: NaiveDate) -> Vec<&CashEntry> {
        let mut day: Vec<&CashEntry> = self.entries.iter().filter(|e| e.date == date).collect();
        if day.iter().any(|e| !e.is_opening_balance()) {
            day.retain(|e| !e.is_opening_balance());
        }

        day.sort_by(|a, b| {
            kind_rank(a.kind)
                .cmp(&kind_rank(b.kind))
                .then_with(|| a.description.cmp(&b.description))
        });
        day
    }

    /// Net movement of one day.
    pub fn total_for_day(&self, date: NaiveDate) -> Money {
        self.entries
            .iter()
            .filter(|e| e.date == date)
            .map(CashEntry::signed_amount)
            .sum()
    }

    /// One row per day with entries, plus today, newest first.
    ///
    /// Today is always present, zero-filled when it has no entries.
    pub fn daily_summary(&self) -> Vec<DailySummary> {
        let mut days: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
        days.insert(self.today(), Totals::default());

        for entry in &self.entries {
            days.entry(entry.date)
                .or_default()
                .record(entry.kind, entry.amount);
        }

        days.into_iter()
            .rev()
            .map(|(date, t)| DailySummary {
                date,
                income: t.income,
                expense: t.expense,
                net: t.net(),
            })
            .collect()
    }

    /// Daily summary rolled up by month, newest month first.
    ///
    /// `month` and `year` restrict the result when supplied.
    pub fn monthly_summary(&self, month: Option<u32>, year: Option<i32>) -> Vec<MonthlySummary> {
        let mut months: BTreeMap<MonthKey, Totals> = BTreeMap::new();

        for day in self.daily_summary() {
            let key = MonthKey::of(day.date);
            if month.map_or(false, |m| key.month != m) || year.map_or(false, |y| key.year != y) {
                continue;
            }
            let totals = months.entry(key).or_default();
            totals.income += day.income;
            totals.expense += day.expense;
        }

        months
            .into_iter()
            .rev()
            .map(|(month, t)| MonthlySummary {
                month,
                income: t.income,
                expense: t.expense,
                net: t.net(),
            })
            .collect()
    }

    /// Daily summary rolled up by year, newest first.
    pub fn yearly_summary(&self) -> Vec<YearlySummary> {
        let mut years: BTreeMap<i32, Totals> = BTreeMap::new();

        for day in self.daily_summary() {
            let totals = years.entry(day.date.year()).or_default();
            totals.income += day.income;
            totals.expense += day.expense;
        }

        years
            .into_iter()
            .rev()
            .map(|(year, t)| YearlySummary {
                year,
                income: t.income,
                expense: t.expense,
                net: t.net(),
            })
            .collect()
    }

    /// Entries dated within `[start, end]`, newest day first.
    ///
    /// Either bound may be omitted. Within a day, income precedes expenses
    /// and entries otherwise keep their recorded order.
    pub fn filter_by_period(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<&CashEntry> {
        let mut found: Vec<&CashEntry> = self
            .entries
            .iter()
            .filter(|e| start.map_or(true, |s| e.date >= s))
            .filter(|e| end.map_or(true, |t| e.date <= t))
            .collect();

        found.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| kind_rank(a.kind).cmp(&kind_rank(b.kind)))
        });
        found
    }

    pub fn entries(&self) -> &[CashEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn kind_rank(kind: CashKind) -> u8 {
    match kind {
        CashKind::Income => 0,
        CashKind::Expense => 1,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
