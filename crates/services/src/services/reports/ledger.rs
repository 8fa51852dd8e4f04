//! The combined financial ledger: tasks and support tickets projected
//! into one row shape so the totals and the listing always agree.

use chrono::{DateTime, NaiveDate, Utc};
use db::models::{support::SupportTicketWithClient, task::TaskWithContext};
use rust_decimal::Decimal;
use strum_macros::Display;

use super::aggregate::money;

#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum LedgerKind {
    #[strum(serialize = "Tarefa")]
    Task,
    #[strum(serialize = "Suporte")]
    Support,
}

/// Normalized projection of either entity; the ledger never touches the
/// entities themselves.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub kind: LedgerKind,
    pub id: i64,
    pub label: String,
    pub client_name: String,
    pub client_tax_id: String,
    pub date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub amount: Option<f64>,
}

pub fn task_row(task: &TaskWithContext) -> LedgerRow {
    let label = match task.service_authority.as_deref() {
        Some(authority) => format!("Tarefa {} - {} - {}", task.id, task.service_name, authority),
        None => format!("Tarefa {} - {}", task.id, task.service_name),
    };
    LedgerRow {
        kind: LedgerKind::Task,
        id: task.id,
        label,
        client_name: task.client_name.clone(),
        client_tax_id: task.client_tax_id.clone(),
        date: task.start_date,
        due_date: task.due_date,
        amount: task.total_value,
    }
}

pub fn support_row(ticket: &SupportTicketWithClient) -> LedgerRow {
    LedgerRow {
        kind: LedgerKind::Support,
        id: ticket.id,
        label: format!("Suporte - {}", ticket.description),
        client_name: ticket.client_name.clone(),
        client_tax_id: ticket.client_tax_id.clone(),
        date: ticket.support_date,
        due_date: None,
        amount: ticket.total_value,
    }
}

#[derive(Debug)]
pub struct Ledger {
    /// Task rows first, support rows after, each in fetch order.
    pub rows: Vec<LedgerRow>,
    pub task_total: Decimal,
    pub support_total: Decimal,
    pub include_support: bool,
}

impl Ledger {
    /// When `include_support` is off, support tickets contribute neither
    /// rows nor totals, whatever the caller fetched.
    pub fn build(
        tasks: &[TaskWithContext],
        tickets: &[SupportTicketWithClient],
        include_support: bool,
    ) -> Self {
        let mut rows: Vec<LedgerRow> = tasks.iter().map(task_row).collect();
        let task_total = tasks.iter().map(|t| money(t.total_value)).sum();

        let mut support_total = Decimal::ZERO;
        if include_support {
            rows.extend(tickets.iter().map(support_row));
            support_total = tickets.iter().map(|s| money(s.total_value)).sum();
        }

        Self {
            rows,
            task_total,
            support_total,
            include_support,
        }
    }

    pub fn grand_total(&self) -> Decimal {
        self.task_total + self.support_total
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use db::models::{
        support::SupportTicket,
        task::Task,
    };
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn task(id: i64, value: Option<f64>, authority: Option<&str>) -> TaskWithContext {
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
        TaskWithContext {
            task: Task {
                id,
                client_id: 1,
                service_type_id: 1,
                status: "Execucao".into(),
                start_date: now,
                due_date: None,
                total_value: value,
                notes: None,
                created_at: now,
                updated_at: now,
            },
            client_name: "Mercado Bom Preço".into(),
            client_tax_id: "11222333000144".into(),
            service_name: "Licença Sanitária".into(),
            service_authority: authority.map(Into::into),
        }
    }

    fn ticket(id: i64, value: Option<f64>) -> SupportTicketWithClient {
        let now = Utc.with_ymd_and_hms(2025, 5, 11, 9, 0, 0).unwrap();
        SupportTicketWithClient {
            ticket: SupportTicket {
                id,
                client_id: 1,
                description: "Acesso ao portal".into(),
                hourly_rate: 100.0,
                support_date: now,
                start_time: now,
                end_time: None,
                duration_hours: None,
                total_value: value,
                created_at: now,
            },
            client_name: "Mercado Bom Preço".into(),
            client_tax_id: "11222333000144".into(),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn labels_are_synthesized_per_entity() {
        let with_authority = task_row(&task(12, Some(10.0), Some("Vigilância Sanitária")));
        assert_eq!(
            with_authority.label,
            "Tarefa 12 - Licença Sanitária - Vigilância Sanitária"
        );

        let without_authority = task_row(&task(13, None, None));
        assert_eq!(without_authority.label, "Tarefa 13 - Licença Sanitária");

        let support = support_row(&ticket(4, Some(50.0)));
        assert_eq!(support.label, "Suporte - Acesso ao portal");
        assert_eq!(support.kind.to_string(), "Suporte");
    }

    #[test]
    fn toggle_excludes_support_from_rows_and_totals() {
        // 2 tasks (200, 300) + 2 tickets (40, 60), support excluded:
        // total is exactly 500 and only the task rows are listed.
        let tasks = [task(1, Some(200.0), None), task(2, Some(300.0), None)];
        let tickets = [ticket(1, Some(40.0)), ticket(2, Some(60.0))];

        let ledger = Ledger::build(&tasks, &tickets, false);
        assert_eq!(ledger.rows.len(), 2);
        assert!(ledger.rows.iter().all(|r| r.kind == LedgerKind::Task));
        assert_eq!(ledger.grand_total(), dec("500"));

        let ledger = Ledger::build(&tasks, &tickets, true);
        assert_eq!(ledger.rows.len(), 4);
        assert_eq!(ledger.grand_total(), dec("600"));
    }

    #[test]
    fn grand_total_matches_the_formula_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for round in 0..50 {
            let include_support = round % 2 == 0;
            let tasks: Vec<TaskWithContext> = (0..rng.gen_range(0..20))
                .map(|i| {
                    let cents: Option<i64> = if rng.gen_bool(0.2) {
                        None
                    } else {
                        Some(rng.gen_range(0..5_000_000))
                    };
                    task(i, cents.map(|c| c as f64 / 100.0), None)
                })
                .collect();
            let tickets: Vec<SupportTicketWithClient> = (0..rng.gen_range(0..20))
                .map(|i| {
                    let cents: Option<i64> = if rng.gen_bool(0.2) {
                        None
                    } else {
                        Some(rng.gen_range(0..5_000_000))
                    };
                    ticket(i, cents.map(|c| c as f64 / 100.0))
                })
                .collect();

            let ledger = Ledger::build(&tasks, &tickets, include_support);

            let expected_tasks: Decimal = tasks.iter().map(|t| money(t.total_value)).sum();
            let expected_support: Decimal = if include_support {
                tickets.iter().map(|s| money(s.total_value)).sum()
            } else {
                Decimal::ZERO
            };
            assert_eq!(ledger.grand_total(), expected_tasks + expected_support);
            assert_eq!(
                ledger.rows.len(),
                tasks.len() + if include_support { tickets.len() } else { 0 }
            );
        }
    }
}
