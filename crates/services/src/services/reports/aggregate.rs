//! Groups fetched records by lifecycle status and totals them.
//!
//! Monetary accumulation is done in [`Decimal`] so many small additions
//! never drift; display formatting is a separate concern.

use db::models::task::{TaskStatus, TaskWithContext};
use rust_decimal::{Decimal, prelude::FromPrimitive};

/// The ordered status set an aggregation runs against. Immutable and
/// injected, so tests can swap in alternates; [`Taxonomy::default`] is the
/// canonical seven-stage lifecycle.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    statuses: Vec<TaskStatus>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            statuses: TaskStatus::CANONICAL.to_vec(),
        }
    }
}

impl Taxonomy {
    pub fn new(statuses: Vec<TaskStatus>) -> Self {
        Self { statuses }
    }

    pub fn statuses(&self) -> &[TaskStatus] {
        &self.statuses
    }

    /// Normalized lookup; `None` when the value is outside this taxonomy.
    pub fn resolve(&self, raw: &str) -> Option<TaskStatus> {
        TaskStatus::from_raw(raw).filter(|status| self.statuses.contains(status))
    }
}

/// NULL/absent monetary values count as zero.
pub fn money(value: Option<f64>) -> Decimal {
    value.and_then(Decimal::from_f64).unwrap_or_default()
}

/// Anything the status aggregator can group: a raw status string plus an
/// optional monetary value.
pub trait StatusRecord {
    fn raw_status(&self) -> &str;
    fn amount(&self) -> Option<f64>;
}

impl StatusRecord for TaskWithContext {
    fn raw_status(&self) -> &str {
        &self.task.status
    }

    fn amount(&self) -> Option<f64> {
        self.task.total_value
    }
}

#[derive(Debug)]
pub struct StatusGroup<'a, T> {
    pub status: TaskStatus,
    /// Members in fetch order.
    pub records: Vec<&'a T>,
    pub total: Decimal,
}

impl<T> StatusGroup<'_, T> {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Output of [`group_by_status`]: one group per taxonomy entry (in
/// taxonomy order, empty groups included) plus the ungrouped totals.
#[derive(Debug)]
pub struct StatusBreakdown<'a, T> {
    pub groups: Vec<StatusGroup<'a, T>>,
    /// Records whose status failed normalized lookup. Excluded from every
    /// group, still part of `record_count` and `grand_total`.
    pub unmatched: usize,
    pub record_count: usize,
    pub grand_total: Decimal,
}

pub fn group_by_status<'a, T: StatusRecord>(
    records: &'a [T],
    taxonomy: &Taxonomy,
) -> StatusBreakdown<'a, T> {
    let mut groups: Vec<StatusGroup<'a, T>> = taxonomy
        .statuses()
        .iter()
        .map(|status| StatusGroup {
            status: status.clone(),
            records: Vec::new(),
            total: Decimal::ZERO,
        })
        .collect();

    let mut unmatched = 0;
    let mut grand_total = Decimal::ZERO;
    for record in records {
        grand_total += money(record.amount());
        let bucket = taxonomy
            .resolve(record.raw_status())
            .and_then(|status| groups.iter_mut().find(|g| g.status == status));
        match bucket {
            Some(group) => {
                group.total += money(record.amount());
                group.records.push(record);
            }
            None => unmatched += 1,
        }
    }

    StatusBreakdown {
        groups,
        unmatched,
        record_count: records.len(),
        grand_total,
    }
}
