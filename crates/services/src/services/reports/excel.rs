//! Spreadsheet presenters. Builders produce logical sheets (name, header,
//! rows); [`to_bytes`] turns them into workbook bytes. The builders know
//! nothing about cell styling beyond the bold header row.

use db::models::{support::SupportTicketWithClient, task::TaskWithContext};
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::{
    ClientSection,
    aggregate::StatusBreakdown,
    format::{
        EMPTY, display_status, format_brl, format_cnpj, format_date, format_hours, format_money,
        format_opt_date, format_opt_time, format_time,
    },
    ledger::{Ledger, LedgerKind},
};

/// Excel worksheet names are capped at 31 characters.
const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

/// One logical worksheet: a header row plus data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.chars().take(MAX_SHEET_NAME).collect(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

fn text(value: impl Into<String>) -> Cell {
    Cell::Text(value.into())
}

/// One worksheet per taxonomy status, tasks listed inside.
pub fn tasks_sheets(breakdown: &StatusBreakdown<TaskWithContext>) -> Vec<Sheet> {
    breakdown
        .groups
        .iter()
        .map(|group| {
            let mut sheet = Sheet::new(
                &display_status(&group.status.to_string()),
                &[
                    "ID",
                    "Cliente",
                    "Serviço",
                    "Início",
                    "Prazo Final",
                    "Valor",
                    "Observações",
                ],
            );
            for task in &group.records {
                sheet.rows.push(vec![
                    Cell::Number(task.id as f64),
                    text(task.client_name.clone()),
                    text(task.service_name.clone()),
                    text(format_date(task.start_date)),
                    text(format_opt_date(task.due_date)),
                    text(format_money(task.total_value)),
                    text(task.notes.clone().unwrap_or_else(|| EMPTY.to_string())),
                ]);
            }
            if group.records.is_empty() {
                sheet.rows.push(vec![
                    Cell::Empty,
                    text("Nenhuma tarefa encontrada neste status"),
                ]);
            }
            sheet
        })
        .collect()
}

/// Single flattened sheet: one row per task, prefixed by its client.
pub fn clients_sheet(sections: &[ClientSection<'_>]) -> Vec<Sheet> {
    let mut sheet = Sheet::new(
        "Clientes",
        &[
            "Cliente",
            "CNPJ",
            "Tarefa",
            "Serviço",
            "Status",
            "Início",
            "Prazo Final",
            "Valor",
        ],
    );
    for section in sections {
        if section.tasks.is_empty() {
            sheet.rows.push(vec![
                text(section.client.name.clone()),
                text(format_cnpj(&section.client.tax_id)),
                text("Nenhuma tarefa cadastrada"),
            ]);
            continue;
        }
        for task in &section.tasks {
            sheet.rows.push(vec![
                text(section.client.name.clone()),
                text(format_cnpj(&section.client.tax_id)),
                Cell::Number(task.id as f64),
                text(task.service_name.clone()),
                text(display_status(&task.status)),
                text(format_date(task.start_date)),
                text(format_opt_date(task.due_date)),
                text(format_money(task.total_value)),
            ]);
        }
    }
    vec![sheet]
}

pub fn support_sheet(tickets: &[SupportTicketWithClient], total: Decimal) -> Vec<Sheet> {
    let mut sheet = Sheet::new(
        "Suportes",
        &[
            "ID",
            "Cliente",
            "Descrição",
            "Data",
            "Hora Início",
            "Hora Fim",
            "Tempo",
            "Valor/Hora",
            "Valor Total",
        ],
    );
    for ticket in tickets {
        sheet.rows.push(vec![
            Cell::Number(ticket.id as f64),
            text(ticket.client_name.clone()),
            text(ticket.description.clone()),
            text(format_date(ticket.support_date)),
            text(format_time(ticket.start_time)),
            text(format_opt_time(ticket.end_time)),
            text(format_hours(ticket.duration_hours)),
            text(format_money(Some(ticket.hourly_rate))),
            text(format_money(ticket.total_value)),
        ]);
    }
    sheet.rows.push(Vec::new());
    sheet.rows.push(vec![
        Cell::Empty,
        text("Valor Total"),
        text(format!("R$ {}", format_brl(total))),
    ]);
    vec![sheet]
}

/// The ledger as a single sheet; the toggle already shaped `ledger.rows`,
/// so listing and totals cannot disagree.
pub fn financial_sheet(ledger: &Ledger) -> Vec<Sheet> {
    let mut sheet = Sheet::new(
        "Financeiro",
        &[
            "ID",
            "Data",
            "Cliente",
            "CNPJ",
            "Descrição",
            "Prazo Final",
            "Valor",
        ],
    );
    for row in &ledger.rows {
        let id_cell = match row.kind {
            LedgerKind::Task => row.id.to_string(),
            LedgerKind::Support => format!("SUP-{}", row.id),
        };
        sheet.rows.push(vec![
            text(id_cell),
            text(format_date(row.date)),
            text(row.client_name.clone()),
            text(format_cnpj(&row.client_tax_id)),
            text(row.label.clone()),
            text(format_opt_date(row.due_date)),
            text(format_money(row.amount)),
        ]);
    }

    sheet.rows.push(Vec::new());
    sheet.rows.push(vec![
        Cell::Empty,
        text("Total de Serviços"),
        text(format!("R$ {}", format_brl(ledger.task_total))),
    ]);
    if ledger.include_support {
        sheet.rows.push(vec![
            Cell::Empty,
            text("Total de Suportes"),
            text(format!("R$ {}", format_brl(ledger.support_total))),
        ]);
        sheet.rows.push(vec![
            Cell::Empty,
            text("Total Geral"),
            text(format!("R$ {}", format_brl(ledger.grand_total()))),
        ]);
    }
    vec![sheet]
}

/// Materializes the logical sheets into a workbook. All-or-nothing: any
/// write error aborts the whole document.
pub fn to_bytes(sheets: &[Sheet]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        for (col, name) in sheet.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
        }
        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                let row_num = row_idx as u32 + 1;
                match cell {
                    Cell::Text(value) => {
                        worksheet.write_string(row_num, col as u16, value)?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(row_num, col as u16, *value)?;
                    }
                    Cell::Empty => {}
                }
            }
        }
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_bytes_are_a_zip_container() {
        let sheet = Sheet {
            name: "Teste".into(),
            columns: vec!["A".into(), "B".into()],
            rows: vec![vec![text("x"), Cell::Number(1.0)]],
        };
        let bytes = to_bytes(&[sheet]).unwrap();
        // XLSX is a ZIP archive: PK magic.
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn sheet_names_are_truncated_to_the_excel_limit() {
        let sheet = Sheet::new(
            "um nome de planilha absurdamente longo demais",
            &["A"],
        );
        assert!(sheet.name.chars().count() <= MAX_SHEET_NAME);
    }
}
