//! HTML presenters. Each builder receives fully-aggregated, display-ready
//! data and returns the complete document handed to the PDF renderer; page
//! orientation rides on the `@page` rule.

use std::fmt::Write;

use db::models::{support::SupportTicketWithClient, task::TaskWithContext};

use super::{
    ClientSection,
    aggregate::StatusBreakdown,
    filter::DateRange,
    format::{
        display_status, escape_html, format_brl, format_cnpj, format_date, format_hours,
        format_money, format_opt_date, format_opt_time, format_time,
    },
    ledger::{Ledger, LedgerKind},
};

const BASE_CSS: &str = r#"
      body { font-family: Arial, sans-serif; color: #111; background: #fff; }
      h1 { text-align: center; margin: 0 0 20px; color: #000; font-size: 20px; border-bottom: 3px solid #000; padding-bottom: 10px; }
      .meta { color: #666; font-size: 12px; margin-bottom: 20px; text-align: center; }
      .section { background: #fff; border: 2px solid #333; border-radius: 4px; padding: 16px; margin-bottom: 20px; page-break-inside: avoid; }
      .section-header { background: #e8e8e8; padding: 14px 16px; border-left: 4px solid #000; margin-bottom: 12px; border-radius: 2px; }
      .section-title { font-size: 16px; font-weight: bold; margin: 0; color: #000; text-transform: uppercase; letter-spacing: 0.5px; }
      .section-count { font-size: 11px; color: #666; margin-top: 4px; }
      .info { font-size: 11px; margin: 3px 0; color: #333; }
      table { width: 100%; border-collapse: collapse; margin-top: 8px; }
      th, td { border: 1px solid #999; padding: 8px 6px; font-size: 11px; }
      th { background: #d9d9d9; text-align: left; font-weight: 600; color: #000; }
      tbody tr:nth-child(even) { background: #f5f5f5; }
      .empty { color: #666; font-style: italic; font-size: 12px; padding: 12px; text-align: center; background: #f5f5f5; border: 1px dashed #999; }
      .summary { background: #e8e8e8; border: 2px solid #333; padding: 12px; margin: 16px 0; text-align: center; }
      .summary-item { display: inline-block; margin: 0 20px; font-weight: bold; font-size: 14px; }
      .total { font-weight: bold; font-size: 14px; margin-top: 16px; }
      .text-center { text-align: center; }
      .text-right { text-align: right; }
"#;

fn page(title: &str, landscape: bool, body: &str) -> String {
    let orientation = if landscape { "A4 landscape" } else { "A4 portrait" };
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>{title}</title>
    <style>
      @page {{ size: {orientation}; margin: 12mm; }}
{BASE_CSS}
    </style>
  </head>
  <body>
    <h1>{title}</h1>
{body}
  </body>
</html>"#
    )
}

/// Tasks grouped by lifecycle status, one section per taxonomy entry.
pub fn tasks(breakdown: &StatusBreakdown<TaskWithContext>) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        r#"    <div class="meta">Total de registros: {}</div>"#,
        breakdown.record_count
    );

    for group in &breakdown.groups {
        let _ = writeln!(
            body,
            r#"    <div class="section">
      <div class="section-header">
        <div class="section-title">{}</div>
        <div class="section-count">{} tarefa(s) — R$ {}</div>
      </div>"#,
            escape_html(Some(&display_status(&group.status.to_string()))),
            group.count(),
            format_brl(group.total),
        );

        if group.records.is_empty() {
            let _ = writeln!(
                body,
                r#"      <div class="empty">Nenhuma tarefa neste status</div>"#
            );
        } else {
            let _ = writeln!(
                body,
                r#"      <table>
        <thead>
          <tr><th>ID</th><th>Cliente</th><th>Serviço</th><th>Início</th><th>Prazo Final</th><th>Valor</th><th>Observações</th></tr>
        </thead>
        <tbody>"#
            );
            for task in &group.records {
                let _ = writeln!(
                    body,
                    r#"          <tr>
            <td class="text-center">{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td class="text-right">{}</td>
            <td>{}</td>
          </tr>"#,
                    task.id,
                    escape_html(Some(&task.client_name)),
                    escape_html(Some(&task.service_name)),
                    format_date(task.start_date),
                    format_opt_date(task.due_date),
                    format_money(task.total_value),
                    escape_html(task.notes.as_deref()),
                );
            }
            let _ = writeln!(body, "        </tbody>\n      </table>");
        }
        let _ = writeln!(body, "    </div>");
    }

    if breakdown.unmatched > 0 {
        let _ = writeln!(
            body,
            r#"    <div class="meta">{} registro(s) fora do fluxo de status</div>"#,
            breakdown.unmatched
        );
    }
    let _ = writeln!(
        body,
        r#"    <div class="total">Valor Total: R$ {}</div>"#,
        format_brl(breakdown.grand_total)
    );

    page("Relatório de Tarefas por Status", false, &body)
}

/// One section per client with contact lines and its task table.
pub fn clients(sections: &[ClientSection<'_>]) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        r#"    <div class="meta">Total de clientes: {}</div>"#,
        sections.len()
    );

    for section in sections {
        let client = section.client;
        let _ = writeln!(
            body,
            r#"    <div class="section">
      <div class="section-header">
        <div class="section-title">{}</div>
        <div class="info">CNPJ: {}</div>
        <div class="info">Telefone: {} — E-mail: {}</div>
      </div>"#,
            escape_html(Some(&client.name)),
            escape_html(Some(&format_cnpj(&client.tax_id))),
            escape_html(client.phone.as_deref()),
            escape_html(client.email.as_deref()),
        );

        if section.tasks.is_empty() {
            let _ = writeln!(
                body,
                r#"      <div class="empty">Nenhuma tarefa cadastrada</div>"#
            );
        } else {
            let _ = writeln!(
                body,
                r#"      <table>
        <thead>
          <tr><th>ID</th><th>Serviço</th><th>Status</th><th>Início</th><th>Prazo Final</th><th>Valor</th></tr>
        </thead>
        <tbody>"#
            );
            for task in &section.tasks {
                let _ = writeln!(
                    body,
                    r#"          <tr>
            <td class="text-center">{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td class="text-right">{}</td>
          </tr>"#,
                    task.id,
                    escape_html(Some(&task.service_name)),
                    escape_html(Some(&display_status(&task.status))),
                    format_date(task.start_date),
                    format_opt_date(task.due_date),
                    format_money(task.total_value),
                );
            }
            let _ = writeln!(body, "        </tbody>\n      </table>");
        }
        let _ = writeln!(body, "    </div>");
    }

    page("Relatório de Clientes", false, &body)
}

/// Flat support listing with the report total underneath.
pub fn support(tickets: &[SupportTicketWithClient], total: rust_decimal::Decimal) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        r#"    <div class="meta">Total de registros: {}</div>
    <table>
      <thead>
        <tr><th>ID</th><th>Cliente</th><th>Descrição</th><th>Data</th><th>Hora Início</th><th>Hora Fim</th><th>Tempo</th><th>Valor/Hora</th><th>Valor Total</th></tr>
      </thead>
      <tbody>"#,
        tickets.len()
    );
    for ticket in tickets {
        let _ = writeln!(
            body,
            r#"        <tr>
          <td class="text-center">{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td class="text-right">{}</td>
          <td class="text-right">{}</td>
        </tr>"#,
            ticket.id,
            escape_html(Some(&ticket.client_name)),
            escape_html(Some(&ticket.description)),
            format_date(ticket.support_date),
            format_time(ticket.start_time),
            format_opt_time(ticket.end_time),
            format_hours(ticket.duration_hours),
            format_money(Some(ticket.hourly_rate)),
            format_money(ticket.total_value),
        );
    }
    let _ = writeln!(
        body,
        r#"      </tbody>
    </table>
    <div class="total">Valor Total: R$ {}</div>"#,
        format_brl(total)
    );

    page("Relatório de Suportes", true, &body)
}

/// Combined financial ledger over the period, support rows highlighted.
pub fn financial(ledger: &Ledger, range: &DateRange) -> String {
    let mut body = String::new();

    let period = match (range.from, range.to) {
        (Some(from), Some(to)) => format!(
            "Período: {} a {}",
            format_opt_date(Some(from)),
            format_opt_date(Some(to))
        ),
        _ => format!("Registros: {}", ledger.rows.len()),
    };
    let _ = writeln!(body, r#"    <div class="meta">{period}</div>"#);

    let _ = writeln!(
        body,
        r#"    <div class="summary">
      <div class="summary-item">Total de Serviços: R$ {}</div>"#,
        format_brl(ledger.task_total)
    );
    if ledger.include_support {
        let _ = writeln!(
            body,
            r#"      <div class="summary-item">Total de Suportes: R$ {}</div>
      <div class="summary-item">Total Geral: R$ {}</div>"#,
            format_brl(ledger.support_total),
            format_brl(ledger.grand_total()),
        );
    }
    let _ = writeln!(body, "    </div>");

    let _ = writeln!(
        body,
        r#"    <table>
      <thead>
        <tr><th>ID</th><th>Data</th><th>Cliente</th><th>CNPJ</th><th>Descrição</th><th>Prazo Final</th><th>Valor</th></tr>
      </thead>
      <tbody>"#
    );
    for row in &ledger.rows {
        let (row_style, id_cell) = match row.kind {
            LedgerKind::Task => ("", row.id.to_string()),
            LedgerKind::Support => (r#" style="background: #fff8dc;""#, format!("SUP-{}", row.id)),
        };
        let _ = writeln!(
            body,
            r#"        <tr{row_style}>
          <td class="text-center">{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td>{}</td>
          <td class="text-right">{}</td>
        </tr>"#,
            id_cell,
            format_date(row.date),
            escape_html(Some(&row.client_name)),
            escape_html(Some(&format_cnpj(&row.client_tax_id))),
            escape_html(Some(&row.label)),
            format_opt_date(row.due_date),
            format_money(row.amount),
        );
    }
    let _ = writeln!(body, "      </tbody>\n    </table>");

    page("Relatório Financeiro", true, &body)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use db::models::task::Task;

    use super::{
        super::{aggregate::{Taxonomy, group_by_status}, ledger::Ledger},
        *,
    };

    fn sample_task(id: i64, status: &str, notes: Option<&str>) -> TaskWithContext {
        let now = Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap();
        TaskWithContext {
            task: Task {
                id,
                client_id: 1,
                service_type_id: 1,
                status: status.into(),
                start_date: now,
                due_date: None,
                total_value: Some(10.0),
                notes: notes.map(Into::into),
                created_at: now,
                updated_at: now,
            },
            client_name: "Auto Peças & Cia".into(),
            client_tax_id: "12345678000199".into(),
            service_name: "Registro <Especial>".into(),
            service_authority: None,
        }
    }

    #[test]
    fn tasks_document_escapes_markup_and_names_every_status() {
        let records = [sample_task(1, "Iniciado", Some("prioridade <alta>"))];
        let breakdown = group_by_status(&records, &Taxonomy::default());
        let html = tasks(&breakdown);

        assert!(html.contains("Relatório de Tarefas por Status"));
        assert!(html.contains("Auto Peças &amp; Cia"));
        assert!(html.contains("Registro &lt;Especial&gt;"));
        assert!(html.contains("prioridade &lt;alta&gt;"));
        // Every taxonomy section is present, populated or not.
        assert!(html.contains("Coleta de Informações"));
        assert!(html.contains("Nenhuma tarefa neste status"));
        assert!(!html.contains("<alta>"));
    }

    #[test]
    fn financial_document_hides_support_summary_when_toggled_off() {
        let tasks = [sample_task(1, "Execucao", None)];
        let ledger = Ledger::build(&tasks, &[], false);
        let html = financial(&ledger, &DateRange::default());
        assert!(html.contains("Total de Serviços"));
        assert!(!html.contains("Total de Suportes"));
        assert!(!html.contains("Total Geral"));
    }
}
