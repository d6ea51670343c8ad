//! Run summary report

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{Dashboard, FilterParams};

/// Record counts and step timings of one dashboard run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total_records: usize,
    pub filtered_records: usize,
    pub used_records: usize,
    pub category_filters: usize,
    pub range_filters: usize,
    pub outliers_removed: bool,
    pub load_time: Duration,
    pub build_time: Duration,
    pub export_time: Option<Duration>,
    pub exported: Vec<String>,
}

impl RunSummary {
    pub fn new(dashboard: &Dashboard, params: &FilterParams) -> Self {
        Self {
            total_records: dashboard.total_records,
            filtered_records: dashboard.filtered_records,
            used_records: dashboard.used_records,
            category_filters: params
                .categories
                .values()
                .filter(|selected| !selected.is_empty())
                .count(),
            range_filters: params.ranges.len(),
            outliers_removed: params.remove_outliers,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_build_time(&mut self, elapsed: Duration) {
        self.build_time = elapsed;
    }

    pub fn set_export_time(&mut self, elapsed: Duration) {
        self.export_time = Some(elapsed);
    }

    pub fn add_export(&mut self, description: String) {
        self.exported.push(description);
    }

    /// Share of the dataset the charts were built from, in percent
    pub fn retained_pct(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            self.used_records as f64 * 100.0 / self.total_records as f64
        }
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Records Loaded"),
            Cell::new(self.total_records),
        ]);

        table.add_row(vec![
            Cell::new("🔍 Active Filters"),
            Cell::new(format!(
                "{} categorical, {} range",
                self.category_filters, self.range_filters
            )),
        ]);

        table.add_row(vec![
            Cell::new("🧮 After Filters"),
            Cell::new(self.filtered_records),
        ]);

        if self.outliers_removed {
            let trimmed = self.filtered_records - self.used_records;
            table.add_row(vec![
                Cell::new("✂️  Outliers Trimmed"),
                Cell::new(trimmed).fg(if trimmed == 0 { Color::White } else { Color::Red }),
            ]);
        }

        table.add_row(vec![
            Cell::new("✅ Records Charted"),
            Cell::new(self.used_records)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let retained = self.retained_pct();
        let color = if retained >= 50.0 {
            Color::Green
        } else if retained > 0.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new("📉 Retained"),
            Cell::new(format!("{:.1}%", retained))
                .fg(color)
                .add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("⏱️  Load Time"),
            Cell::new(format!("{:.2}s", self.load_time.as_secs_f64())),
        ]);
        table.add_row(vec![
            Cell::new("⏱️  Build Time"),
            Cell::new(format!("{:.2}s", self.build_time.as_secs_f64())),
        ]);
        if let Some(export_time) = self.export_time {
            table.add_row(vec![
                Cell::new("⏱️  Export Time"),
                Cell::new(format!("{:.2}s", export_time.as_secs_f64())),
            ]);
        }

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.exported.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("💾").cyan(),
                style("EXPORTS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for export in &self.exported {
                println!("        {} {}", style("•").dim(), export);
            }
        }
    }
}
