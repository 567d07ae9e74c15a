use crate::error::Result;
use crate::models::MappingResult;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 8] = [
    "status",
    "invoice_index",
    "value_record_index",
    "invoice_number",
    "value_record_number",
    "match_type",
    "confidence",
    "reason",
];

/// 匹配结果写为CSV: 先每个匹配一行，
/// 再每个未匹配发票/COVE一行
pub fn write_mapping_report<W: Write>(result: &MappingResult, writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(HEADER)?;

    for m in &result.mappings {
        writer.write_record([
            "mapped".to_string(),
            m.invoice_index.to_string(),
            m.value_record_index.to_string(),
            m.invoice.invoice_number.clone(),
            m.value_record.invoice_number.clone(),
            m.match_type.to_string(),
            format!("{:.4}", m.confidence),
            String::new(),
        ])?;
    }

    for u in &result.unmapped.invoices {
        writer.write_record([
            "unmapped_invoice".to_string(),
            u.index.to_string(),
            String::new(),
            u.invoice.invoice_number.clone(),
            String::new(),
            String::new(),
            String::new(),
            u.reason.clone(),
        ])?;
    }

    for u in &result.unmapped.value_records {
        writer.write_record([
            "unmapped_value_record".to_string(),
            String::new(),
            u.index.to_string(),
            String::new(),
            u.value_record.invoice_number.clone(),
            String::new(),
            String::new(),
            u.reason.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// 导出匹配结果到CSV文件
pub fn export_to_csv(result: &MappingResult, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    write_mapping_report(result, file)?;
    tracing::info!(
        "Mapping report written to {} ({} mappings)",
        output_path.display(),
        result.mappings.len()
    );
    Ok(())
}
