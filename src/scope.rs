use crate::inputs::lenient_number;
use crate::rates::{Role, WorkType};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One scope-of-work task line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeItem {
    pub id: i32,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub work_role: Role,
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hours: f64,
}

impl ScopeItem {
    pub fn new(
        id: i32,
        task: impl Into<String>,
        work_role: Role,
        work_type: WorkType,
        hours: f64,
    ) -> Self {
        Self {
            id,
            task: task.into(),
            work_role,
            work_type,
            hours,
        }
    }

    /// Empty row as added by "add task".
    pub fn blank(id: i32) -> Self {
        Self::new(id, "", Role::default(), WorkType::default(), 0.0)
    }

    /// Lines that make it onto the proposal: named and with hours booked.
    pub fn is_active(&self) -> bool {
        !self.task.is_empty() && self.hours > 0.0
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(5);

        let id_data: [i32; 1] = [self.id];
        columns.push(Series::new(PlSmallStr::from_static("id"), id_data).into_column());

        let task_data: [&str; 1] = [self.task.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("task"), task_data).into_column());

        let role_data: [&str; 1] = [self.work_role.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("work_role"), role_data).into_column());

        let type_data: [&str; 1] = [self.work_type.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("work_type"), type_data).into_column());

        let hours_data: [f64; 1] = [self.hours];
        columns.push(Series::new(PlSmallStr::from_static("hours"), hours_data).into_column());

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let id = df.column("id")?.i32()?.get(row_idx).ok_or_else(|| {
            PolarsError::ComputeError("scope row missing id".into())
        })?;

        let task = df
            .column("task")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();

        let role_label = df.column("work_role")?.str()?.get(row_idx).unwrap_or("");
        let work_role = role_label
            .parse::<Role>()
            .map_err(|err| PolarsError::ComputeError(format!("scope row {id}: {err}").into()))?;

        let work_type = WorkType::parse_lenient(
            df.column("work_type")?.str()?.get(row_idx).unwrap_or(""),
        );

        let hours = df.column("hours")?.f64()?.get(row_idx).unwrap_or(0.0);

        Ok(Self {
            id,
            task,
            work_role,
            work_type,
            hours,
        })
    }
}
