use super::{ExchangeError, ExchangeResult};
use crate::document::PlaceholderMap;
use crate::inputs::{EstimateInputs, numeric};
use crate::pricing::{Breakdown, SummaryLine};
use crate::rates::{Role, WorkType};
use crate::scope::ScopeItem;
use crate::validation;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

pub fn load_inputs_from_json<P: AsRef<Path>>(path: P) -> ExchangeResult<EstimateInputs> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let inputs: EstimateInputs = serde_json::from_reader(file)?;
    validation::validate_inputs(&inputs)?;
    tracing::info!(
        path = %path.display(),
        scope_items = inputs.scope_items.len(),
        subcontractors = inputs.subcontractors.len(),
        "imported estimate inputs"
    );
    Ok(inputs)
}

#[derive(Serialize, Deserialize)]
struct ScopeCsvRecord {
    id: i32,
    #[serde(default)]
    task: String,
    work_role: String,
    #[serde(default)]
    work_type: String,
    #[serde(default)]
    hours: String,
}

impl ScopeCsvRecord {
    fn into_scope_item(self) -> ExchangeResult<ScopeItem> {
        let work_role = self.work_role.parse::<Role>().map_err(|err| {
            ExchangeError::InvalidData(format!("scope item {}: {err}", self.id))
        })?;
        Ok(ScopeItem::new(
            self.id,
            self.task,
            work_role,
            WorkType::parse_lenient(&self.work_type),
            numeric(&self.hours),
        ))
    }
}

/// Reads `id,task,work_role,work_type,hours` rows. Hours are read like a
/// form field; unknown work types bill as normal.
pub fn load_scope_items_from_csv<P: AsRef<Path>>(path: P) -> ExchangeResult<Vec<ScopeItem>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut items = Vec::new();
    for record in reader.deserialize::<ScopeCsvRecord>() {
        let record = record?;
        items.push(record.into_scope_item()?);
    }

    if items.is_empty() {
        return Err(ExchangeError::InvalidData(
            "CSV file contained no scope items".into(),
        ));
    }

    validation::validate_scope_items(&items)?;
    tracing::info!(path = %path.display(), scope_items = items.len(), "imported scope items");
    Ok(items)
}

pub fn save_breakdown_to_json<P: AsRef<Path>>(breakdown: &Breakdown, path: P) -> ExchangeResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, breakdown)?;
    tracing::info!(path = %path.display(), "exported breakdown as json");
    Ok(())
}

#[derive(Serialize)]
struct SummaryCsvRecord {
    section: &'static str,
    line: &'static str,
    hours: String,
    cost: String,
    sell: String,
}

impl From<&SummaryLine> for SummaryCsvRecord {
    fn from(line: &SummaryLine) -> Self {
        Self {
            section: line.section,
            line: line.line,
            hours: format_amount(line.hours),
            cost: format_amount(line.cost),
            sell: format_amount(line.sell),
        }
    }
}

/// Writes the cost summary table, one row per summary line.
pub fn save_breakdown_to_csv<P: AsRef<Path>>(breakdown: &Breakdown, path: P) -> ExchangeResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for line in breakdown.summary_lines() {
        writer.serialize(SummaryCsvRecord::from(&line))?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), "exported breakdown as csv");
    Ok(())
}

pub fn save_placeholders_to_json<P: AsRef<Path>>(placeholders: &PlaceholderMap, path: P) -> ExchangeResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, placeholders)?;
    tracing::info!(path = %path.display(), keys = placeholders.len(), "exported proposal placeholders");
    Ok(())
}

fn format_amount(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_record_parses_hours_leniently() {
        let record = ScopeCsvRecord {
            id: 3,
            task: "Configure VLANs".into(),
            work_role: "Engineer II".into(),
            work_type: "Weekend".into(),
            hours: "4.5h".into(),
        };
        let item = record.into_scope_item().unwrap();
        assert_eq!(item.work_role, Role::EngineerIi);
        assert_eq!(item.work_type, WorkType::Normal);
        assert_eq!(item.hours, 4.5);
    }

    #[test]
    fn csv_record_rejects_unknown_role() {
        let record = ScopeCsvRecord {
            id: 9,
            task: "Rack".into(),
            work_role: "Wizard".into(),
            work_type: String::new(),
            hours: "1".into(),
        };
        assert!(matches!(
            record.into_scope_item(),
            Err(ExchangeError::InvalidData(msg)) if msg.contains("scope item 9")
        ));
    }
}
