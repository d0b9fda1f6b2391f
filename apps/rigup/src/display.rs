//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use rigup_config::ColorChoice;
use rigup_errors::Error;
use rigup_plan::PlanSummary;
use rigup_runner::{CheckReport, RunResult, StepStatus};
use serde::Serialize;
use std::io;

/// Aggregated result of one CLI command
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OperationResult {
    Run(RunResult),
    Check(CheckReport),
    Steps(PlanSummary),
}

impl OperationResult {
    /// Serialize for `--json` output
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Output renderer for CLI results
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::Run(report) => self.render_run_result(report),
            OperationResult::Check(report) => self.render_check_report(report),
            OperationResult::Steps(summary) => self.render_plan_summary(summary),
        }
    }

    /// Render run summary
    fn render_run_result(&self, report: &RunResult) -> io::Result<()> {
        if report.outcomes.is_empty() {
            println!("Nothing to do.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
            Cell::new("Actions").add_attribute(Attribute::Bold),
        ]);

        for outcome in &report.outcomes {
            let actions = if outcome.actions.is_empty() {
                "-".to_string()
            } else {
                outcome.actions.join("\n")
            };

            table.add_row(vec![
                Cell::new(&outcome.step),
                self.format_step_status(outcome.status),
                Cell::new(format!("{}ms", outcome.duration_ms)),
                Cell::new(actions),
            ]);
        }

        println!("{table}");
        println!();

        if let Some(failure) = &report.failure {
            println!(
                "Aborted at step '{}' after {}ms. Later steps were not attempted.",
                failure.step, report.duration_ms
            );
        } else if report.provisioned() == 0 {
            println!("All steps already satisfied ({}ms).", report.duration_ms);
        } else {
            println!(
                "Provisioned {} and skipped {} already-satisfied steps in {}ms.",
                report.provisioned(),
                report.satisfied(),
                report.duration_ms
            );
        }

        Ok(())
    }

    /// Render check report
    fn render_check_report(&self, report: &CheckReport) -> io::Result<()> {
        if report.steps.is_empty() {
            println!("No steps selected.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Probe").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Note").add_attribute(Attribute::Bold),
        ]);

        for check in &report.steps {
            let status_cell = if check.satisfied {
                Cell::new("satisfied").fg(Color::Green)
            } else {
                Cell::new("pending").fg(Color::Yellow)
            };

            table.add_row(vec![
                Cell::new(&check.step),
                Cell::new(&check.probe),
                status_cell,
                Cell::new(check.note.as_deref().unwrap_or("-")),
            ]);
        }

        println!("{table}");
        println!();

        let pending = report.pending();
        if pending == 0 {
            println!("All steps satisfied.");
        } else if pending == 1 {
            println!("1 step pending; `rigup run` will provision it.");
        } else {
            println!("{pending} steps pending; `rigup run` will provision them.");
        }

        Ok(())
    }

    /// Render plan step listing
    fn render_plan_summary(&self, summary: &PlanSummary) -> io::Result<()> {
        let name = summary.name.as_deref().unwrap_or("plan");
        println!("{}", self.style_plan_name(name));
        println!();

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Kind").add_attribute(Attribute::Bold),
            Cell::new("Detail").add_attribute(Attribute::Bold),
            Cell::new("Postcondition").add_attribute(Attribute::Bold),
        ]);

        for step in &summary.steps {
            table.add_row(vec![
                Cell::new(&step.name),
                Cell::new(&step.kind),
                Cell::new(&step.detail),
                Cell::new(step.postcondition.as_deref().unwrap_or("-")),
            ]);
        }

        println!("{table}");
        println!();

        if summary.total == 1 {
            println!("1 step.");
        } else {
            println!("{} steps.", summary.total);
        }

        Ok(())
    }

    /// Format step status as colored cell
    fn format_step_status(&self, status: StepStatus) -> Cell {
        match status {
            StepStatus::Satisfied => Cell::new("satisfied").fg(Color::Green),
            StepStatus::Provisioned => Cell::new("provisioned").fg(Color::Blue),
            StepStatus::Failed => Cell::new("failed").fg(Color::Red),
        }
    }

    /// Style the plan name
    fn style_plan_name(&self, name: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(name).to_string()
        } else {
            name.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}
