//! Month and category roll-ups over ledger entries.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{Decimal, Expense, Income, LedgerEntry, Month};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub month: Month,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    /// `None` means all time.
    pub month: Option<Month>,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    pub income_by_category: Vec<CategoryTotal>,
    pub expenses_by_category: Vec<CategoryTotal>,
}

pub fn sum_amounts<'a, E>(entries: impl IntoIterator<Item = &'a E>) -> Decimal
where
    E: LedgerEntry + 'a,
{
    entries.into_iter().map(|e| e.amount()).sum()
}

/// Entries dated within `month`.
pub fn filter_month<'a, E>(entries: &'a [E], month: &Month) -> Vec<&'a E>
where
    E: LedgerEntry,
{
    entries.iter().filter(|e| month.contains(e.date())).collect()
}

/// Totals per category, largest first; ties ordered by category name.
pub fn by_category<'a, E>(entries: impl IntoIterator<Item = &'a E>) -> Vec<CategoryTotal>
where
    E: LedgerEntry + 'a,
{
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for entry in entries {
        let slot = totals.entry(entry.category()).or_default();
        *slot = *slot + entry.amount();
    }

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    out
}

/// Twelve buckets, January through December of `year`.
pub fn monthly_series(income: &[Income], expenses: &[Expense], year: i32) -> Vec<MonthlyBucket> {
    Month::all_in_year(year)
        .into_iter()
        .map(|month| {
            let income = sum_amounts(filter_month(income, &month));
            let expenses = sum_amounts(filter_month(expenses, &month));
            MonthlyBucket {
                month,
                income,
                expenses,
                net: income - expenses,
            }
        })
        .collect()
}

impl FinanceSummary {
    pub fn build(month: Option<Month>, income: &[Income], expenses: &[Expense]) -> Self {
        let (income, expenses): (Vec<&Income>, Vec<&Expense>) = match &month {
            Some(m) => (filter_month(income, m), filter_month(expenses, m)),
            None => (income.iter().collect(), expenses.iter().collect()),
        };

        let total_income = sum_amounts(income.iter().copied());
        let total_expenses = sum_amounts(expenses.iter().copied());

        FinanceSummary {
            month,
            total_income,
            total_expenses,
            net: total_income - total_expenses,
            income_count: income.len(),
            expense_count: expenses.len(),
            income_by_category: by_category(income.iter().copied()),
            expenses_by_category: by_category(expenses.iter().copied()),
        }
    }

    pub fn empty(month: Option<Month>) -> Self {
        Self::build(month, &[], &[])
    }
}
