//! Commands that run components: rule checks, rendering and processing.

use std::path::Path;
use std::sync::Arc;

use framering::{Framering, MetaBox};
use framering_config::FrameringConfig;
use framering_fields::FieldRegistry;
use framering_forms::{Form, Renderer};
use framering_rules::StaticContext;
use serde_json::{Map, Value};
use tracing::debug;

use crate::cli::PageArgs;
use crate::{load_app, read_json};

impl From<&PageArgs> for StaticContext {
    fn from(page: &PageArgs) -> Self {
        StaticContext {
            homepage: page.home,
            post_type: page.post_type.clone(),
            archive: page
                .archive
                .as_ref()
                .map(|kind| Some(kind.clone()).filter(|k| !k.is_empty())),
        }
    }
}

/// Each component's id and whether its rules match `page`.
pub fn check_components(app: &Framering, page: &PageArgs) -> anyhow::Result<Vec<(String, bool)>> {
    let ctx = StaticContext::from(page);
    let mut results = Vec::new();
    for component in app.components().all() {
        let shown = component.check(&ctx)?;
        results.push((component.id().to_string(), shown));
    }
    Ok(results)
}

pub fn run_check(config: FrameringConfig, file: &Path, page: &PageArgs) -> anyhow::Result<()> {
    let app = load_app(config, file)?;
    for (id, shown) in check_components(&app, page)? {
        println!("{id}: {}", if shown { "shown" } else { "hidden" });
    }
    Ok(())
}

/// A standalone form per component, whatever the page.
fn build_forms(app: &Framering) -> anyhow::Result<Vec<(String, Form)>> {
    let config = Arc::new(app.config().clone());
    let registry: Arc<FieldRegistry> = Arc::new(app.field_registry().clone());
    app.components()
        .all()
        .map(|c| -> anyhow::Result<(String, Form)> {
            Ok((c.id().to_string(), c.build_form(&config, &registry)?))
        })
        .collect()
}

/// Every component rendered, with current values taken from `values`.
pub fn render_components(app: &Framering, values: Option<&Value>) -> anyhow::Result<Vec<MetaBox>> {
    let mut forms = build_forms(app)?;
    if let Some(payload) = values {
        for (_, form) in forms.iter_mut() {
            let scoped = form.scoped(payload).clone();
            let found: Vec<(String, Value)> = form
                .fields()
                .filter_map(|f| Some((f.name().to_string(), f.path().lookup(&scoped)?.clone())))
                .collect();
            for (name, value) in found {
                form.set_field_value(&name, value)?;
            }
        }
    }

    let mut renderer = Renderer::new(app.config(), app.field_registry());
    let mut boxes = Vec::new();
    for (component, (id, form)) in app.components().all().zip(forms.iter()) {
        boxes.push(MetaBox {
            id: id.clone(),
            title: component.title().to_string(),
            placement: component.placement(),
            fields: renderer.render_form(form)?,
        });
    }
    Ok(boxes)
}

pub fn run_render(
    config: FrameringConfig,
    file: &Path,
    values: Option<&Path>,
    html: bool,
) -> anyhow::Result<()> {
    let app = load_app(config, file)?;
    let values = values.map(read_json).transpose()?;
    let boxes = render_components(&app, values.as_ref())?;
    if html {
        for meta_box in &boxes {
            println!("<!-- {} -->", meta_box.id);
            println!("{}", meta_box.to_html());
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&boxes)?);
    }
    Ok(())
}

/// Each component's processed result keyed by component id.
///
/// The first rejection aborts and is returned as a [`framering::FrameringError`].
pub fn process_components(app: &Framering, payload: &Value) -> anyhow::Result<Value> {
    let mut results = Map::new();
    for (id, mut form) in build_forms(app)? {
        let result = form
            .process(Some(payload))
            .map_err(framering::FrameringError::from)?;
        debug!(component = %id, "processed submission");
        results.insert(id, result);
    }
    Ok(Value::Object(results))
}

pub fn run_process(config: FrameringConfig, file: &Path, payload: &Path) -> anyhow::Result<()> {
    let app = load_app(config, file)?;
    let payload = read_json(payload)?;
    let results = process_components(&app, &payload)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
