//! Listings of field kinds and components.

use std::path::Path;

use comfy_table::{presets::UTF8_FULL, Table};
use framering::Framering;
use framering_config::FrameringConfig;
use framering_fields::FieldRegistry;
use serde_json::{json, Value};

use crate::load_app;

/// Field kinds as JSON rows.
pub fn field_rows(registry: &FieldRegistry) -> Vec<Value> {
    registry
        .all()
        .iter()
        .map(|(key, kind)| {
            json!({
                "type": key,
                "tag": kind.tag,
                "element": kind.element,
                "input_type": kind.input_type,
                "parser": format!("{:?}", kind.parser),
            })
        })
        .collect()
}

pub fn run_fields(config: FrameringConfig, json: bool) -> anyhow::Result<()> {
    let app = Framering::new(config)?;
    let rows = field_rows(app.field_registry());
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Type", "Element", "Input type", "Parser"]);
    for (key, kind) in app.field_registry().all() {
        table.add_row(vec![
            key.as_str(),
            kind.element.as_str(),
            kind.input_type.as_deref().unwrap_or("-"),
            &format!("{:?}", kind.parser),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Components as JSON rows.
pub fn component_rows(app: &Framering) -> Vec<Value> {
    app.components()
        .all()
        .map(|c| {
            json!({
                "id": c.id(),
                "title": c.title(),
                "name": c.name(),
                "placement": c.placement(),
                "rules": Value::from(c.rules().clone()),
                "fields": c
                    .fields()
                    .iter()
                    .map(|f| f.name.clone().unwrap_or_else(|| format!("({})", f.field_type)))
                    .collect::<Vec<_>>(),
            })
        })
        .collect()
}

pub fn run_components(config: FrameringConfig, file: &Path, json: bool) -> anyhow::Result<()> {
    let app = load_app(config, file)?;
    let rows = component_rows(&app);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No components found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Title", "Placement", "Rules", "Fields"]);
    for row in &rows {
        let fields: Vec<&str> = row["fields"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        table.add_row(vec![
            row["id"].as_str().unwrap_or_default().to_string(),
            row["title"].as_str().unwrap_or_default().to_string(),
            row["placement"].as_str().unwrap_or_default().to_string(),
            row["rules"].to_string(),
            fields.join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}
