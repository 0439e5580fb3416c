use std::io::{self, Write};
use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use quote_estimator::document::{proposal_filename, proposal_stem};
use quote_estimator::exchange::{self, ExchangeError};
use quote_estimator::money::{format_currency, format_percent};
use quote_estimator::{
    BoilerplateList, Contact, Estimate, EstimatorConfig, ProjectInfo, RiskFactor, Role,
    Subcontractor, TravelEntry, WorkType, numeric,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names[..]));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(&row[..]));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show scope of work\n  new                                Append blank scope line with next id\n  task    <id> <text...>             Set task description\n  hours   <id> <hours>               Set hours\n  role    <id> <role...>             Set work role (e.g. Engineer III)\n  type    <id> <type...>             Set work type (Proj. Normal | Proj. Overtime | Design Eng (ER))\n  delete  <id>                       Remove scope line\n  project [<field> <value...>]       Show or set project info\n                                     fields: customer opportunity created design implementation\n                                             secondary ce location background notes bom\n                                             discount risk fmu\n  pm <third_party|sync|day2> <hours> Set management override hours\n  expense <field> <value>            hotel_rate hotel_nights per_diem_rate per_diem_days\n  travel  <1|2> <role...> <trips>    Set a travel entry\n  sub [add <cost> <name...> | set <n> <cost> <name...> | rm <n>]\n  resp   [add <text...> | set <n> <text...> | rm <n> | reset]\n  assume [add <text...> | set <n> <text...> | rm <n> | reset]\n  rates                              Show the rate catalog\n  summary|compute                    Recompute and show the cost summary\n  import <json|csv> <path>           Import inputs (json) or scope lines (csv)\n  export <json|csv|placeholders> <path>\n  generate <dir>                     Write proposal data for the template\n  config <path>                      Load a TOML configuration\n  quit|exit                          Exit"
    );
}

/// Text following the first `skip` whitespace-separated tokens.
fn rest_after(input: &str, skip: usize) -> &str {
    let mut rest = input.trim_start();
    for _ in 0..skip {
        rest = match rest.find(char::is_whitespace) {
            Some(idx) => rest[idx..].trim_start(),
            None => "",
        };
    }
    rest.trim_end()
}

fn parse_position(s: Option<&str>) -> Option<usize> {
    s.and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map(|n| n - 1)
}

struct Session {
    estimate: Estimate,
    contacts: Vec<Contact>,
    expiration_days: i64,
}

impl Session {
    fn from_config(config: &EstimatorConfig) -> Result<Self, String> {
        let mut estimate = Estimate::default_form(config.catalog()).map_err(|e| e.to_string())?;
        estimate
            .set_project(config.project_defaults())
            .map_err(|e| e.to_string())?;
        Ok(Self {
            estimate,
            contacts: config.contacts(),
            expiration_days: config.expiration_days(),
        })
    }

    fn apply_config(&mut self, config: &EstimatorConfig) {
        self.estimate.set_catalog(config.catalog());
        self.contacts = config.contacts();
        self.expiration_days = config.expiration_days();
    }

    fn show_scope(&self) {
        println!("{}", render_df_as_text_table(self.estimate.scope_dataframe()));
    }

    fn show_headline(&self) {
        match self.estimate.recompute() {
            Ok(summary) => println!("{}", summary.to_cli_summary()),
            Err(e) => println!("Recompute error: {}", e),
        }
    }

    fn show_summary(&self) {
        let breakdown = match self.estimate.breakdown() {
            Ok(b) => b,
            Err(e) => {
                println!("Recompute error: {}", e);
                return;
            }
        };
        match breakdown.summary_dataframe() {
            Ok(df) => println!("{}", render_df_as_text_table(&df)),
            Err(e) => println!("Error: {}", e),
        }
        println!(
            "Total cost: {} | Profit: {} | Margin: {}",
            format_currency(breakdown.total_cost),
            format_currency(breakdown.est_profit),
            format_percent(breakdown.profit_margin)
        );
    }

    fn show_project(&self) {
        let p = self.estimate.project();
        println!("Customer:        {}", p.customer_name);
        println!("Opportunity:     {}", p.opportunity_name);
        println!("Created:         {}", p.created_date);
        println!("Expiration:      {}", p.expiration_date(self.expiration_days));
        println!("Design eng:      {}", p.design_engineer);
        println!("Implementation:  {}", p.implementation_engineer);
        println!("Secondary eng:   {}", p.secondary_engineer);
        println!("Client exec:     {}", p.client_executive);
        println!("Work location:   {}", p.work_location);
        println!("BOM:             {}", p.bill_of_materials_ref);
        println!("Background:      {}", p.project_background);
        println!("Notes:           {}", p.project_notes);
        println!("Discount:        {}%", p.discount_rate);
        println!("Risk:            {}", p.risk_factor);
        println!("Uplift:          {}", format_currency(p.fair_market_uplift));
    }

    fn set_project_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        let text = value.to_string();
        let edit: Box<dyn FnOnce(&mut ProjectInfo)> = match field {
            "customer" => Box::new(move |p: &mut ProjectInfo| p.customer_name = text),
            "opportunity" => Box::new(move |p: &mut ProjectInfo| p.opportunity_name = text),
            "design" => Box::new(move |p: &mut ProjectInfo| p.design_engineer = text),
            "implementation" => Box::new(move |p: &mut ProjectInfo| p.implementation_engineer = text),
            "secondary" => Box::new(move |p: &mut ProjectInfo| p.secondary_engineer = text),
            "ce" => Box::new(move |p: &mut ProjectInfo| p.client_executive = text),
            "location" => Box::new(move |p: &mut ProjectInfo| p.work_location = text),
            "background" => Box::new(move |p: &mut ProjectInfo| p.project_background = text),
            "notes" => Box::new(move |p: &mut ProjectInfo| p.project_notes = text),
            "bom" => Box::new(move |p: &mut ProjectInfo| p.bill_of_materials_ref = text),
            "created" => {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|_| "Invalid date (YYYY-MM-DD)".to_string())?;
                Box::new(move |p: &mut ProjectInfo| p.created_date = date)
            }
            "discount" => {
                let rate = numeric(value);
                Box::new(move |p: &mut ProjectInfo| p.discount_rate = rate)
            }
            "fmu" => {
                let uplift = numeric(value);
                Box::new(move |p: &mut ProjectInfo| p.fair_market_uplift = uplift)
            }
            "risk" => {
                let risk: RiskFactor = value.parse().map_err(|e| format!("{e}"))?;
                Box::new(move |p: &mut ProjectInfo| p.risk_factor = risk)
            }
            other => return Err(format!("Unknown project field '{other}'")),
        };
        self.estimate.update_project(edit).map_err(|e| e.to_string())
    }

    fn boilerplate(&mut self, kind: BoilerplateList, input: &str) {
        let mut parts = input.split_whitespace().skip(1);
        let result = match parts.next() {
            None => Ok(()),
            Some("add") => {
                let text = rest_after(input, 2);
                if text.is_empty() {
                    println!("Usage: add <text...>");
                    return;
                }
                self.estimate.add_entry(kind, text);
                Ok(())
            }
            Some("set") => match parse_position(parts.next()) {
                Some(idx) => self.estimate.set_entry(kind, idx, rest_after(input, 3)),
                None => {
                    println!("Usage: set <n> <text...>");
                    return;
                }
            },
            Some("rm") => match parse_position(parts.next()) {
                Some(idx) => self.estimate.remove_entry(kind, idx).map(|_| ()),
                None => {
                    println!("Usage: rm <n>");
                    return;
                }
            },
            Some("reset") => {
                self.estimate.reset_list(kind);
                Ok(())
            }
            Some(other) => {
                println!("Unknown {} command '{}'", kind.label(), other);
                return;
            }
        };
        if let Err(e) = result {
            println!("Error: {}", e);
            return;
        }
        println!("{}:", kind.label());
        for (i, entry) in self.estimate.list(kind).iter().enumerate() {
            println!("  {}. {}", i + 1, entry);
        }
    }

    fn subcontractors(&mut self, input: &str) {
        let mut parts = input.split_whitespace().skip(1);
        let result = match parts.next() {
            None => Ok(()),
            Some("add") => {
                let cost = numeric(parts.next().unwrap_or(""));
                self.estimate
                    .add_subcontractor(Subcontractor::new(rest_after(input, 3), cost));
                Ok(())
            }
            Some("set") => match parse_position(parts.next()) {
                Some(idx) => {
                    let cost = numeric(parts.next().unwrap_or(""));
                    self.estimate
                        .update_subcontractor(idx, Subcontractor::new(rest_after(input, 4), cost))
                }
                None => {
                    println!("Usage: sub set <n> <cost> <name...>");
                    return;
                }
            },
            Some("rm") => match parse_position(parts.next()) {
                Some(idx) => self.estimate.remove_subcontractor(idx).map(|_| ()),
                None => {
                    println!("Usage: sub rm <n>");
                    return;
                }
            },
            Some(other) => {
                println!("Unknown sub command '{}'", other);
                return;
            }
        };
        if let Err(e) = result {
            println!("Error: {}", e);
            return;
        }
        for (i, sub) in self.estimate.subcontractors().iter().enumerate() {
            println!("  {}. {} {}", i + 1, sub.name, format_currency(sub.cost));
        }
        self.show_headline();
    }

    fn show_rates(&self) {
        println!("{:<20} {:>10} {:>10} {:>12} {:>12}", "Role", "Cost/h", "Rate/h", "Travel cost", "Travel rate");
        for rate in self.estimate.catalog().rates() {
            println!(
                "{:<20} {:>10.2} {:>10.2} {:>12.2} {:>12.2}",
                rate.role.as_str(),
                rate.weighted_cost,
                rate.base_rate,
                rate.travel_cost,
                rate.travel_rate
            );
        }
    }

    fn import(&mut self, kind: Option<&str>, path: Option<&str>) {
        let (Some(kind), Some(path)) = (kind, path) else {
            println!("Usage: import <json|csv> <path>");
            return;
        };
        let result = match kind {
            "json" => exchange::load_inputs_from_json(path)
                .map_err(|e| e.to_string())
                .and_then(|inputs| self.estimate.load_inputs(inputs).map_err(|e| e.to_string())),
            "csv" => exchange::load_scope_items_from_csv(path)
                .map_err(|e| e.to_string())
                .and_then(|items| self.estimate.replace_scope_items(&items).map_err(|e| e.to_string())),
            other => Err(format!("Unknown import kind '{other}'")),
        };
        match result {
            Ok(()) => {
                println!("Imported {}.", path);
                self.show_scope();
                self.show_headline();
            }
            Err(e) => println!("Import failed: {}", e),
        }
    }

    fn export(&self, kind: Option<&str>, path: Option<&str>) {
        let (Some(kind), Some(path)) = (kind, path) else {
            println!("Usage: export <json|csv|placeholders> <path>");
            return;
        };
        let result: Result<(), String> = match kind {
            "json" | "csv" => self
                .estimate
                .breakdown()
                .map_err(|e| e.to_string())
                .and_then(|b| {
                    let saved = if kind == "json" {
                        exchange::save_breakdown_to_json(&b, path)
                    } else {
                        exchange::save_breakdown_to_csv(&b, path)
                    };
                    saved.map_err(|e| e.to_string())
                }),
            "placeholders" => self
                .estimate
                .placeholder_map(&self.contacts, self.expiration_days)
                .map_err(|e| e.to_string())
                .and_then(|map| {
                    exchange::save_placeholders_to_json(&map, path).map_err(|e| e.to_string())
                }),
            other => Err(format!("Unknown export kind '{other}'")),
        };
        match result {
            Ok(()) => println!("Exported {} to {}.", kind, path),
            Err(e) => println!("Export failed: {}", e),
        }
    }

    fn generate(&self, dir: &Path) -> Result<PathBuf, ExchangeError> {
        let placeholders = self
            .estimate
            .placeholder_map(&self.contacts, self.expiration_days)
            .map_err(|e| ExchangeError::InvalidData(e.to_string()))?;
        let path = dir.join(format!("{}.json", proposal_stem(self.estimate.project())));
        exchange::save_placeholders_to_json(&placeholders, &path)?;
        Ok(path)
    }
}

fn main() {
    init_tracing();

    let config = match EstimatorConfig::load_default() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}; using built-in defaults", e);
            EstimatorConfig::default()
        }
    };
    let mut session = match Session::from_config(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to start estimator: {}", e);
            std::process::exit(1);
        }
    };

    println!("Quote Estimator (CLI) - type 'help' for commands\n");
    session.show_scope();
    session.show_headline();

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() { continue; }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => session.show_scope(),
            "summary" | "compute" => session.show_summary(),
            "new" => match session.estimate.add_scope_item() {
                Ok(id) => {
                    println!("Added scope line id={}", id);
                    session.show_scope();
                }
                Err(e) => println!("Error: {}", e),
            },
            "task" | "hours" | "role" | "type" => {
                let Some(id) = parts.next().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Invalid id");
                    continue;
                };
                let value = rest_after(input, 2);
                let res = match cmd {
                    "task" => session.estimate.set_task(id, value),
                    "hours" => session.estimate.set_hours(id, numeric(value)),
                    "role" => match value.parse::<Role>() {
                        Ok(role) => session.estimate.set_work_role(id, role),
                        Err(e) => {
                            println!("Error: {}", e);
                            continue;
                        }
                    },
                    _ => session.estimate.set_work_type(id, WorkType::parse_lenient(value)),
                };
                match res {
                    Ok(_) => {
                        println!("{} set.", cmd);
                        session.show_scope();
                        session.show_headline();
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "delete" => {
                let Some(id) = parts.next().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: delete <id>");
                    continue;
                };
                match session.estimate.remove_scope_item(id) {
                    Ok(_) => {
                        println!("Removed scope line id={}", id);
                        session.show_scope();
                        session.show_headline();
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "project" => match parts.next() {
                None => session.show_project(),
                Some(field) => match session.set_project_field(field, rest_after(input, 2)) {
                    Ok(()) => {
                        println!("{} set.", field);
                        session.show_headline();
                    }
                    Err(e) => println!("Error: {}", e),
                },
            },
            "pm" => {
                let field = parts.next();
                let value = numeric(parts.next().unwrap_or(""));
                let mut overrides = *session.estimate.overrides();
                match field {
                    Some("third_party") => overrides.third_party_coord = value,
                    Some("sync") => overrides.additional_sync = value,
                    Some("day2") => overrides.day2_standby = value,
                    _ => {
                        println!("Usage: pm <third_party|sync|day2> <hours>");
                        continue;
                    }
                }
                session.estimate.set_overrides(overrides);
                session.show_headline();
            }
            "expense" => {
                let field = parts.next();
                let value = numeric(parts.next().unwrap_or(""));
                let mut expenses = *session.estimate.expenses();
                match field {
                    Some("hotel_rate") => expenses.hotel_rate = value,
                    Some("hotel_nights") => expenses.hotel_nights = value,
                    Some("per_diem_rate") => expenses.per_diem_rate = value,
                    Some("per_diem_days") => expenses.per_diem_days = value,
                    _ => {
                        println!("Usage: expense <hotel_rate|hotel_nights|per_diem_rate|per_diem_days> <value>");
                        continue;
                    }
                }
                session.estimate.set_expenses(expenses);
                session.show_headline();
            }
            "travel" => {
                let slot = parts.next();
                let rest = rest_after(input, 2);
                let (role_label, trips) = match rest.rsplit_once(char::is_whitespace) {
                    Some((role, trips)) => (role.trim(), numeric(trips)),
                    None => {
                        println!("Usage: travel <1|2> <role...> <trips>");
                        continue;
                    }
                };
                let role = match role_label.parse::<Role>() {
                    Ok(r) => r,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                let mut expenses = *session.estimate.expenses();
                match slot {
                    Some("1") => expenses.travel1 = TravelEntry::new(role, trips),
                    Some("2") => expenses.travel2 = TravelEntry::new(role, trips),
                    _ => {
                        println!("Usage: travel <1|2> <role...> <trips>");
                        continue;
                    }
                }
                session.estimate.set_expenses(expenses);
                session.show_headline();
            }
            "sub" => session.subcontractors(input),
            "resp" => session.boilerplate(BoilerplateList::Responsibilities, input),
            "assume" => session.boilerplate(BoilerplateList::Assumptions, input),
            "rates" => session.show_rates(),
            "import" => session.import(parts.next(), parts.next()),
            "export" => session.export(parts.next(), parts.next()),
            "generate" => {
                let dir = rest_after(input, 1);
                let dir = if dir.is_empty() { "." } else { dir };
                match session.generate(Path::new(dir)) {
                    Ok(path) => println!(
                        "Proposal data for {} written to {}",
                        proposal_filename(session.estimate.project()),
                        path.display()
                    ),
                    Err(e) => println!("Failed to generate proposal: {}", e),
                }
            }
            "config" => {
                let path = rest_after(input, 1);
                if path.is_empty() {
                    println!("Usage: config <path>");
                    continue;
                }
                match EstimatorConfig::load(path) {
                    Ok(config) => {
                        session.apply_config(&config);
                        println!("Configuration loaded.");
                        session.show_headline();
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
