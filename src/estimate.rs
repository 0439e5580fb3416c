use crate::document::{self, DocumentRequest, PlaceholderMap};
use crate::inputs::{EstimateInputs, ExpenseInputs, ManagementOverrides, Subcontractor};
use crate::money::{format_currency, format_percent};
use crate::pricing::{self, Breakdown};
use crate::project::ProjectInfo;
use crate::rates::{RateCatalog, Role, WorkType};
use crate::reference::{self, Contact};
use crate::scope::ScopeItem;
use crate::validation::{self, ValidationError};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use thiserror::Error;

/// Blank scope rows on a fresh form.
pub const DEFAULT_SCOPE_ROWS: usize = 8;
/// Blank subcontractor rows on a fresh form.
pub const DEFAULT_SUBCONTRACTOR_ROWS: usize = 3;

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("scope table error: {0}")]
    DataFrame(#[from] PolarsError),
    #[error("scope item {0} not found")]
    ScopeItemNotFound(i32),
    #[error("{list} has no entry at position {index}")]
    IndexOutOfRange { list: &'static str, index: usize },
    #[error("invalid estimate data: {0}")]
    Invalid(#[from] ValidationError),
}

/// The two editable boilerplate lists carried into the proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoilerplateList {
    Responsibilities,
    Assumptions,
}

impl BoilerplateList {
    pub fn label(&self) -> &'static str {
        match self {
            BoilerplateList::Responsibilities => "client responsibilities",
            BoilerplateList::Assumptions => "project assumptions",
        }
    }

    fn defaults(&self) -> Vec<String> {
        match self {
            BoilerplateList::Responsibilities => reference::default_responsibilities(),
            BoilerplateList::Assumptions => reference::default_assumptions(),
        }
    }
}

/// Headline figures shown after every edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecomputeSummary {
    pub total_hours: f64,
    pub grand_total: f64,
    pub final_total: f64,
    pub profit_margin: f64,
}

impl From<&Breakdown> for RecomputeSummary {
    fn from(breakdown: &Breakdown) -> Self {
        Self {
            total_hours: breakdown.total_hours,
            grand_total: breakdown.grand_total,
            final_total: breakdown.final_total,
            profit_margin: breakdown.profit_margin,
        }
    }
}

impl RecomputeSummary {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "Hours: {:.2} | Grand total: {} | Final: {} | Margin: {}",
            self.total_hours,
            format_currency(self.grand_total),
            format_currency(self.final_total),
            format_percent(self.profit_margin)
        )
    }
}

/// Live state of one estimating form.
///
/// Scope lines sit in a DataFrame keyed by `id` and are edited column-wise.
/// Nothing derived is stored here: [`Estimate::breakdown`] takes a fresh
/// snapshot and runs the pricing engine on it every time.
pub struct Estimate {
    scope: DataFrame,
    project: ProjectInfo,
    overrides: ManagementOverrides,
    expenses: ExpenseInputs,
    subcontractors: Vec<Subcontractor>,
    responsibilities: Vec<String>,
    assumptions: Vec<String>,
    catalog: RateCatalog,
}

impl Default for Estimate {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimate {
    /// Empty form: no scope lines, no subcontractors, default boilerplate.
    pub fn new() -> Self {
        Self::with_catalog(RateCatalog::builtin())
    }

    pub fn with_catalog(catalog: RateCatalog) -> Self {
        Self {
            scope: DataFrame::empty_with_schema(&Self::scope_schema()),
            project: ProjectInfo::default(),
            overrides: ManagementOverrides::default(),
            expenses: ExpenseInputs::default(),
            subcontractors: Vec::new(),
            responsibilities: reference::default_responsibilities(),
            assumptions: reference::default_assumptions(),
            catalog,
        }
    }

    /// Form as first opened: eight blank scope rows and three blank
    /// subcontractor rows.
    pub fn default_form(catalog: RateCatalog) -> Result<Self, EstimateError> {
        let mut estimate = Self::with_catalog(catalog);
        let blanks: Vec<ScopeItem> = (1..=DEFAULT_SCOPE_ROWS as i32).map(ScopeItem::blank).collect();
        estimate.scope = Self::frame_from_items(&blanks)?;
        estimate.subcontractors = vec![Subcontractor::default(); DEFAULT_SUBCONTRACTOR_ROWS];
        Ok(estimate)
    }

    pub fn from_inputs(inputs: EstimateInputs, catalog: RateCatalog) -> Result<Self, EstimateError> {
        let mut estimate = Self::with_catalog(catalog);
        estimate.load_inputs(inputs)?;
        Ok(estimate)
    }

    /// Replaces the priced inputs with `inputs`. Boilerplate lists and the
    /// catalog are kept. On error the form is left unchanged.
    pub fn load_inputs(&mut self, inputs: EstimateInputs) -> Result<(), EstimateError> {
        validation::validate_inputs(&inputs)?;
        let scope = Self::frame_from_items(&inputs.scope_items)?;
        self.scope = scope;
        self.project = inputs.project;
        self.overrides = inputs.overrides;
        self.expenses = inputs.expenses;
        self.subcontractors = inputs.subcontractors;
        Ok(())
    }

    /// Replaces every scope line. On error the form is left unchanged.
    pub fn replace_scope_items(&mut self, items: &[ScopeItem]) -> Result<(), EstimateError> {
        validation::validate_scope_items(items)?;
        self.scope = Self::frame_from_items(items)?;
        Ok(())
    }

    fn scope_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("task".into(), DataType::String),
            Field::new("work_role".into(), DataType::String),
            Field::new("work_type".into(), DataType::String),
            Field::new("hours".into(), DataType::Float64),
        ])
    }

    fn frame_from_items(items: &[ScopeItem]) -> PolarsResult<DataFrame> {
        let ids: Vec<i32> = items.iter().map(|item| item.id).collect();
        let tasks: Vec<&str> = items.iter().map(|item| item.task.as_str()).collect();
        let roles: Vec<&str> = items.iter().map(|item| item.work_role.as_str()).collect();
        let types: Vec<&str> = items.iter().map(|item| item.work_type.as_str()).collect();
        let hours: Vec<f64> = items.iter().map(|item| item.hours).collect();

        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("id"), ids).into_column(),
            Series::new(PlSmallStr::from_static("task"), tasks).into_column(),
            Series::new(PlSmallStr::from_static("work_role"), roles).into_column(),
            Series::new(PlSmallStr::from_static("work_type"), types).into_column(),
            Series::new(PlSmallStr::from_static("hours"), hours).into_column(),
        ])
    }

    pub fn scope_dataframe(&self) -> &DataFrame {
        &self.scope
    }

    pub fn scope_items(&self) -> Result<Vec<ScopeItem>, EstimateError> {
        let items = (0..self.scope.height())
            .map(|idx| ScopeItem::from_dataframe_row(&self.scope, idx))
            .collect::<PolarsResult<Vec<_>>>()?;
        Ok(items)
    }

    pub fn find_scope_item(&self, id: i32) -> Result<Option<ScopeItem>, EstimateError> {
        let position = self
            .scope
            .column("id")?
            .i32()?
            .into_iter()
            .position(|value| value == Some(id));
        match position {
            Some(idx) => Ok(Some(ScopeItem::from_dataframe_row(&self.scope, idx)?)),
            None => Ok(None),
        }
    }

    fn contains_id(&self, id: i32) -> Result<bool, PolarsError> {
        if self.scope.height() == 0 {
            return Ok(false);
        }
        Ok(self.scope.column("id")?.i32()?.into_iter().any(|v| v == Some(id)))
    }

    fn ensure_scope_item(&self, id: i32) -> Result<(), EstimateError> {
        if self.contains_id(id)? {
            Ok(())
        } else {
            Err(EstimateError::ScopeItemNotFound(id))
        }
    }

    /// One past the largest id in use, or 1 for an empty table.
    pub fn next_scope_id(&self) -> Result<i32, EstimateError> {
        let max = self.scope.column("id")?.i32()?.max();
        Ok(max.map_or(1, |id| id + 1))
    }

    /// Appends a blank line and returns its id.
    pub fn add_scope_item(&mut self) -> Result<i32, EstimateError> {
        let id = self.next_scope_id()?;
        let row = ScopeItem::blank(id).to_dataframe_row()?;
        self.scope = self.scope.vstack(&row)?;
        Ok(id)
    }

    pub fn upsert_scope_item(&mut self, item: ScopeItem) -> Result<(), EstimateError> {
        if self.contains_id(item.id)? {
            self.update_string_column("task", item.id, &item.task)?;
            self.update_string_column("work_role", item.id, item.work_role.as_str())?;
            self.update_string_column("work_type", item.id, item.work_type.as_str())?;
            self.update_float_column("hours", item.id, item.hours)?;
            return Ok(());
        }

        let row = item.to_dataframe_row()?;
        self.scope = self.scope.vstack(&row)?;
        Ok(())
    }

    pub fn remove_scope_item(&mut self, id: i32) -> Result<(), EstimateError> {
        self.ensure_scope_item(id)?;
        self.scope = self
            .scope
            .clone()
            .lazy()
            .filter(col("id").neq(lit(id)))
            .collect()?;
        Ok(())
    }

    pub fn set_task(&mut self, id: i32, task: &str) -> Result<(), EstimateError> {
        self.ensure_scope_item(id)?;
        self.update_string_column("task", id, task)?;
        Ok(())
    }

    pub fn set_hours(&mut self, id: i32, hours: f64) -> Result<(), EstimateError> {
        self.ensure_scope_item(id)?;
        self.update_float_column("hours", id, hours)?;
        Ok(())
    }

    pub fn set_work_role(&mut self, id: i32, role: Role) -> Result<(), EstimateError> {
        self.ensure_scope_item(id)?;
        self.update_string_column("work_role", id, role.as_str())?;
        Ok(())
    }

    pub fn set_work_type(&mut self, id: i32, work_type: WorkType) -> Result<(), EstimateError> {
        self.ensure_scope_item(id)?;
        self.update_string_column("work_type", id, work_type.as_str())?;
        Ok(())
    }

    fn update_string_column(&mut self, column_name: &str, item_id: i32, new_value: &str) -> Result<(), PolarsError> {
        let id_col = self.scope.column("id")?;
        let target_col = self.scope.column(column_name)?;

        let new_series = target_col
            .str()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| if id == Some(item_id) { Some(new_value) } else { val })
            .collect::<StringChunked>()
            .into_series()
            .with_name(column_name.into());

        self.scope.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_float_column(&mut self, column_name: &str, item_id: i32, new_value: f64) -> Result<(), PolarsError> {
        let id_col = self.scope.column("id")?;
        let target_col = self.scope.column(column_name)?;

        let new_series = target_col
            .f64()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| if id == Some(item_id) { Some(new_value) } else { val })
            .collect::<Float64Chunked>()
            .into_series()
            .with_name(column_name.into());

        self.scope.replace(column_name, new_series)?;
        Ok(())
    }

    pub fn project(&self) -> &ProjectInfo {
        &self.project
    }

    pub fn set_project(&mut self, project: ProjectInfo) -> Result<(), EstimateError> {
        validation::validate_project(&project)?;
        self.project = project;
        Ok(())
    }

    /// Applies `edit` to a copy of the project settings and keeps it only if
    /// the result validates.
    pub fn update_project<F>(&mut self, edit: F) -> Result<(), EstimateError>
    where
        F: FnOnce(&mut ProjectInfo),
    {
        let mut project = self.project.clone();
        edit(&mut project);
        self.set_project(project)
    }

    pub fn overrides(&self) -> &ManagementOverrides {
        &self.overrides
    }

    pub fn set_overrides(&mut self, overrides: ManagementOverrides) {
        self.overrides = overrides;
    }

    pub fn expenses(&self) -> &ExpenseInputs {
        &self.expenses
    }

    pub fn set_expenses(&mut self, expenses: ExpenseInputs) {
        self.expenses = expenses;
    }

    pub fn subcontractors(&self) -> &[Subcontractor] {
        &self.subcontractors
    }

    pub fn add_subcontractor(&mut self, sub: Subcontractor) {
        self.subcontractors.push(sub);
    }

    pub fn update_subcontractor(&mut self, index: usize, sub: Subcontractor) -> Result<(), EstimateError> {
        let slot = self
            .subcontractors
            .get_mut(index)
            .ok_or(EstimateError::IndexOutOfRange {
                list: "subcontractors",
                index,
            })?;
        *slot = sub;
        Ok(())
    }

    pub fn remove_subcontractor(&mut self, index: usize) -> Result<Subcontractor, EstimateError> {
        if index >= self.subcontractors.len() {
            return Err(EstimateError::IndexOutOfRange {
                list: "subcontractors",
                index,
            });
        }
        Ok(self.subcontractors.remove(index))
    }

    pub fn list(&self, kind: BoilerplateList) -> &[String] {
        match kind {
            BoilerplateList::Responsibilities => &self.responsibilities,
            BoilerplateList::Assumptions => &self.assumptions,
        }
    }

    fn list_mut(&mut self, kind: BoilerplateList) -> &mut Vec<String> {
        match kind {
            BoilerplateList::Responsibilities => &mut self.responsibilities,
            BoilerplateList::Assumptions => &mut self.assumptions,
        }
    }

    pub fn add_entry(&mut self, kind: BoilerplateList, text: impl Into<String>) {
        self.list_mut(kind).push(text.into());
    }

    pub fn set_entry(&mut self, kind: BoilerplateList, index: usize, text: impl Into<String>) -> Result<(), EstimateError> {
        let entry = self
            .list_mut(kind)
            .get_mut(index)
            .ok_or(EstimateError::IndexOutOfRange {
                list: kind.label(),
                index,
            })?;
        *entry = text.into();
        Ok(())
    }

    pub fn remove_entry(&mut self, kind: BoilerplateList, index: usize) -> Result<String, EstimateError> {
        let list = self.list_mut(kind);
        if index >= list.len() {
            return Err(EstimateError::IndexOutOfRange {
                list: kind.label(),
                index,
            });
        }
        Ok(list.remove(index))
    }

    pub fn reset_list(&mut self, kind: BoilerplateList) {
        *self.list_mut(kind) = kind.defaults();
    }

    pub fn catalog(&self) -> &RateCatalog {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: RateCatalog) {
        self.catalog = catalog;
    }

    /// Immutable copy of everything the pricing engine reads.
    pub fn snapshot(&self) -> Result<EstimateInputs, EstimateError> {
        Ok(EstimateInputs {
            project: self.project.clone(),
            scope_items: self.scope_items()?,
            overrides: self.overrides,
            expenses: self.expenses,
            subcontractors: self.subcontractors.clone(),
        })
    }

    pub fn breakdown(&self) -> Result<Breakdown, EstimateError> {
        let inputs = self.snapshot()?;
        Ok(pricing::compute(&inputs, &self.catalog))
    }

    pub fn recompute(&self) -> Result<RecomputeSummary, EstimateError> {
        Ok(RecomputeSummary::from(&self.breakdown()?))
    }

    pub fn placeholder_map(&self, contacts: &[Contact], expiration_days: i64) -> Result<PlaceholderMap, EstimateError> {
        let scope_items = self.scope_items()?;
        let breakdown = self.breakdown()?;
        let request = DocumentRequest {
            project: &self.project,
            breakdown: &breakdown,
            scope_items: &scope_items,
            responsibilities: &self.responsibilities,
            assumptions: &self.assumptions,
            contacts,
            expiration_days,
        };
        Ok(document::placeholder_map(&request))
    }
}
