//! 照合レポートのExcel出力
//!
//! 目視確認用に「照合結果」「未照合」の2シートを書き出す。

use crate::error::{ReconcileError, Result};
use khovai_common::MatchReport;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

const MATCH_HEADERS: [&str; 5] = ["画像ID", "布地コード", "スコア", "信頼度", "照合方法"];
const UNMATCHED_HEADERS: [&str; 2] = ["未照合の布地コード", "未照合の画像ID"];

pub fn export_report_xlsx(report: &MatchReport, output_path: &Path) -> Result<()> {
    let mut workbook = build_workbook(report).map_err(excel_error)?;
    workbook.save(output_path).map_err(excel_error)?;
    tracing::info!(path = %output_path.display(), "Excel出力");
    Ok(())
}

fn build_workbook(report: &MatchReport) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let percent = Format::new().set_num_format("0%");

    let sheet = workbook.add_worksheet();
    sheet.set_name("照合結果")?;
    for (col, title) in MATCH_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    for (i, m) in report.matches.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &m.image_identifier)?;
        sheet.write_string(row, 1, &m.fabric_code)?;
        sheet.write_number_with_format(row, 2, m.score, &percent)?;
        sheet.write_string(row, 3, m.tier.to_string())?;
        sheet.write_string(row, 4, m.kind.to_string())?;
    }
    sheet.set_column_width(0, 32)?;
    sheet.set_column_width(1, 24)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("未照合")?;
    for (col, title) in UNMATCHED_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    for (i, code) in report.unmatched_fabric_codes.iter().enumerate() {
        sheet.write_string((i + 1) as u32, 0, code)?;
    }
    for (i, id) in report.unmatched_image_identifiers.iter().enumerate() {
        sheet.write_string((i + 1) as u32, 1, id)?;
    }
    sheet.set_column_width(0, 24)?;
    sheet.set_column_width(1, 32)?;

    Ok(workbook)
}

fn excel_error(e: XlsxError) -> ReconcileError {
    ReconcileError::ExcelGeneration(e.to_string())
}
