//! Fee overview
//!
//! Derived values for the fees screen: what is still pending, how much is
//! outstanding, which fee is due next and the total of the fees a parent has
//! ticked for payment. Amounts are in USD; format them with
//! [`CurrencyState`](crate::currency::CurrencyState).

use portal_client::types::{FeeItem, FeeStatement, FeeStatus};
use std::collections::BTreeSet;

/// Label used when nothing is pending
pub const NO_DUE_DATE: &str = "N/A";

/// Fees that are not paid yet, in statement order
pub fn pending_fees(fees: &[FeeItem]) -> Vec<&FeeItem> {
    fees.iter().filter(|fee| fee.status != FeeStatus::Paid).collect()
}

/// Sum of all unpaid fees
pub fn total_outstanding(fees: &[FeeItem]) -> f64 {
    pending_fees(fees).iter().map(|fee| fee.amount_usd).sum()
}

/// The fee to pay next
///
/// The first overdue fee wins, then the first fee due soon, then the first
/// pending fee of any status.
pub fn next_due(fees: &[FeeItem]) -> Option<&FeeItem> {
    fees.iter()
        .find(|fee| fee.status == FeeStatus::Overdue)
        .or_else(|| fees.iter().find(|fee| fee.status == FeeStatus::DueSoon))
        .or_else(|| fees.iter().find(|fee| fee.status != FeeStatus::Paid))
}

/// Due date of [`next_due`] as "Oct 15", or [`NO_DUE_DATE`]
pub fn next_due_label(fees: &[FeeItem]) -> String {
    next_due(fees)
        .map(|fee| fee.due_date.format("%b %d").to_string())
        .unwrap_or_else(|| NO_DUE_DATE.to_string())
}

/// Fees ticked for payment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeSelection {
    ids: BTreeSet<String>,
}

impl FeeSelection {
    /// Empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick or untick a fee; returns whether it is now selected
    pub fn toggle(&mut self, fee_id: &str) -> bool {
        if self.ids.remove(fee_id) {
            false
        } else {
            self.ids.insert(fee_id.to_string());
            true
        }
    }

    /// Whether a fee is ticked
    pub fn is_selected(&self, fee_id: &str) -> bool {
        self.ids.contains(fee_id)
    }

    /// Tick every pending fee
    pub fn select_all_pending(&mut self, fees: &[FeeItem]) {
        self.ids = pending_fees(fees).into_iter().map(|fee| fee.id.clone()).collect();
    }

    /// Untick everything
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of ticked fees
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is ticked
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sum of the ticked fees that are still pending
    pub fn total(&self, fees: &[FeeItem]) -> f64 {
        pending_fees(fees)
            .into_iter()
            .filter(|fee| self.ids.contains(&fee.id))
            .map(|fee| fee.amount_usd)
            .sum()
    }
}

/// A child's fee statement with the parent's current selection
#[derive(Debug, Clone, Default)]
pub struct FeeOverview {
    statement: FeeStatement,
    selection: FeeSelection,
}

impl FeeOverview {
    /// Wrap a statement; the selection starts empty
    pub fn new(statement: FeeStatement) -> Self {
        Self {
            statement,
            selection: FeeSelection::new(),
        }
    }

    /// Underlying statement
    pub fn statement(&self) -> &FeeStatement {
        &self.statement
    }

    /// Unpaid fees
    pub fn pending(&self) -> Vec<&FeeItem> {
        pending_fees(&self.statement.fees)
    }

    /// Past payments
    pub fn history(&self) -> &[FeeItem] {
        &self.statement.history
    }

    /// Total still owed
    pub fn total_outstanding(&self) -> f64 {
        total_outstanding(&self.statement.fees)
    }

    /// Due date of the next fee to pay
    pub fn next_due_label(&self) -> String {
        next_due_label(&self.statement.fees)
    }

    /// Current selection
    pub fn selection(&self) -> &FeeSelection {
        &self.selection
    }

    /// Tick or untick a fee
    pub fn toggle(&mut self, fee_id: &str) -> bool {
        self.selection.toggle(fee_id)
    }

    /// Total of the ticked fees
    pub fn total_selected(&self) -> f64 {
        self.selection.total(&self.statement.fees)
    }
}
