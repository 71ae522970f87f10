//! Text and JSON rendering for plans, estimates and the catalog

use crate::planner::{Plan, ResourceKind};
use crate::pricing::catalog::regions;
use crate::pricing::StaticCatalog;
use crate::stack::Evaluation;
use crate::utils::{format_percent, format_usd};
use comfy_table::{Cell, Color, Table};
use console::style;
use serde_json::json;

fn usage_cell(used: f64, capacity: f64) -> Cell {
    let text = format!("{:.2} / {:.2} ({})", used, capacity, format_percent(used, capacity));
    let fraction = used / capacity;
    if fraction > 0.9 {
        Cell::new(text).fg(Color::Red)
    } else if fraction > 0.75 {
        Cell::new(text).fg(Color::Yellow)
    } else {
        Cell::new(text).fg(Color::Green)
    }
}

/// Per-server usage table followed by the server count
pub fn render_plan(plan: &Plan) -> String {
    let mut table = Table::new();
    let mut header = vec!["Server".to_string(), "Services".to_string()];
    header.extend(
        ResourceKind::ALL
            .iter()
            .map(|k| format!("{} ({})", k, k.unit())),
    );
    table.set_header(header);

    for server in &plan.servers {
        let mut row = vec![
            Cell::new(&server.name),
            Cell::new(server.services.iter().cloned().collect::<Vec<_>>().join(", ")),
        ];
        row.extend(
            ResourceKind::ALL
                .iter()
                .map(|&k| usage_cell(server.used.get(k), plan.capacity.get(k))),
        );
        table.add_row(row);
    }

    let order = plan
        .order
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" > ");

    format!(
        "{}\n{}\n\n{} {}\n{} {:?} (seed {}, order {})\n",
        style("=== Allocation plan ===").bold(),
        table,
        style("Total servers:").dim(),
        style(plan.server_count()).bold(),
        style("Strategy:").dim(),
        plan.strategy,
        plan.seed,
        order
    )
}

/// Breakdown table plus the two outputs
pub fn render_evaluation(evaluation: &Evaluation) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Resource",
        "Instance type",
        "Location",
        "Qty",
        "Compute/hr",
        "Volume/hr",
        "Total/hr",
    ]);
    for item in &evaluation.estimate.items {
        table.add_row(vec![
            Cell::new(&item.id),
            Cell::new(&item.instance_type),
            Cell::new(&item.location),
            Cell::new(item.quantity),
            Cell::new(format_usd(item.compute_per_hour)),
            Cell::new(format_usd(item.volume_per_hour)),
            Cell::new(format_usd(item.total_per_hour)),
        ]);
    }

    format!(
        "{}\n\n{}",
        table,
        render_outputs(&evaluation.outputs.hourly_price, evaluation.outputs.monthly_price)
    )
}

/// The two output lines, `name = value`
pub fn render_outputs(hourly_price: &str, monthly_price: f64) -> String {
    format!(
        "{} = \"{}\"\n{} = {}\n",
        style("hourly_price").cyan(),
        hourly_price,
        style("monthly_price").cyan(),
        monthly_price
    )
}

/// Effective instance, volume and region tables
pub fn render_catalog(catalog: &StaticCatalog) -> String {
    let mut instances = Table::new();
    instances.set_header(vec!["Instance type", "USD/hour", "USD/month"]);
    for (name, price) in catalog.instance_prices() {
        instances.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.4}", price)),
            Cell::new(format!("{:.2}", price * crate::pricing::HOURS_PER_MONTH)),
        ]);
    }

    let mut volumes = Table::new();
    volumes.set_header(vec!["Volume type", "USD/GB-month"]);
    for (name, price) in catalog.volume_prices() {
        volumes.add_row(vec![Cell::new(name), Cell::new(format!("{:.3}", price))]);
    }

    let mut locations = Table::new();
    locations.set_header(vec!["Region", "Location", "Factor"]);
    for region in regions() {
        locations.add_row(vec![
            Cell::new(region.code),
            Cell::new(region.name),
            Cell::new(format!("{:.2}", region.factor)),
        ]);
    }

    format!("{}\n\n{}\n\n{}\n", instances, volumes, locations)
}

/// JSON document for `plan --output json`
pub fn plan_json(plan: &Plan, evaluation: Option<&Evaluation>) -> serde_json::Value {
    json!({
        "plan": plan.report(),
        "pricing": evaluation,
    })
}

/// JSON document for `catalog --output json`
pub fn catalog_json(catalog: &StaticCatalog) -> serde_json::Value {
    let regions: Vec<_> = regions()
        .map(|r| json!({ "code": r.code, "name": r.name, "factor": r.factor }))
        .collect();
    json!({
        "instance_prices": catalog.instance_prices(),
        "volume_prices": catalog.volume_prices(),
        "regions": regions,
    })
}
