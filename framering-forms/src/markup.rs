//! HTML output for rendered fields.

use framering_fields::TagKind;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;

use crate::render::FieldDescriptor;

/// Elements written as `<tag ... />`.
const SELF_CLOSING: &[&str] = &["input", "img"];

/// Attributes written without a value when true.
const PROPERTIES: &[&str] = &[
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "contenteditable",
    "default",
    "defer",
    "disabled",
    "draggable",
    "hidden",
    "ismap",
    "loop",
    "multiple",
    "muted",
    "novalidate",
    "preload",
    "readonly",
    "required",
    "reversed",
    "selected",
    "spellcheck",
    "translate",
];

/// Write one attribute, or nothing when it carries no value.
///
/// `false`, `null` and empty lists or maps are dropped. Zero and the empty
/// string are kept: a required select's placeholder option needs `value=""`.
fn write_attribute(out: &mut String, key: &str, value: &Value) {
    let text = match value {
        Value::Null | Value::Bool(false) => return,
        Value::Array(items) if items.is_empty() => return,
        Value::Object(map) if map.is_empty() => return,
        Value::Bool(true) if PROPERTIES.contains(&key) => {
            out.push(' ');
            out.push_str(key);
            return;
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(&text));
    out.push('"');
}

fn open_tag<'a>(element: &str, attributes: impl IntoIterator<Item = (&'a str, &'a Value)>) -> String {
    let mut out = format!("<{element}");
    for (key, value) in attributes {
        write_attribute(&mut out, key, value);
    }
    out
}

impl FieldDescriptor {
    /// The field's element alone.
    pub fn to_html(&self) -> String {
        match self.tag {
            TagKind::Composite => self.composite_html(),
            _ => self.element_html(),
        }
    }

    /// The element wrapped with its label and description.
    pub fn to_group_html(&self) -> String {
        let mut out = String::from("<div class=\"framering-form-group\">");
        if let Some(label) = &self.label {
            out.push_str(&format!(
                "<label for=\"{}\">{}</label>",
                encode_double_quoted_attribute(self.id()),
                encode_text(label)
            ));
        }
        out.push_str("<div class=\"framering-input\">");
        out.push_str(&self.to_html());
        if let Some(description) = &self.description {
            out.push_str("<p class=\"description\">");
            out.push_str(&encode_text(description).replace('\n', "<br />\n"));
            out.push_str("</p>");
        }
        out.push_str("</div></div>");
        out
    }

    fn element_html(&self) -> String {
        let mut out = open_tag(
            &self.element,
            self.attributes.iter().map(|(k, v)| (k.as_str(), v)),
        );

        let inner = self.inner_html();
        if inner.is_empty() && SELF_CLOSING.contains(&self.element.as_str()) {
            out.push_str(" />");
        } else {
            out.push('>');
            out.push_str(&inner);
            out.push_str(&format!("</{}>", self.element));
        }
        out
    }

    fn inner_html(&self) -> String {
        if self.element == "select" {
            return self
                .options
                .iter()
                .map(|option| {
                    let value = Value::String(option.value.clone());
                    let disabled = Value::Bool(option.disabled);
                    let selected = Value::Bool(option.selected);
                    let mut out = open_tag(
                        "option",
                        [
                            ("value", &value),
                            ("disabled", &disabled),
                            ("selected", &selected),
                        ],
                    );
                    out.push('>');
                    out.push_str(&encode_text(&option.label));
                    out.push_str("</option>");
                    out
                })
                .collect::<Vec<_>>()
                .join("");
        }
        self.inner_text
            .as_deref()
            .map(|text| encode_text(text).into_owned())
            .unwrap_or_default()
    }

    fn composite_html(&self) -> String {
        let template: String = self.template.iter().map(|d| d.to_group_html()).collect();
        let items: String = self
            .items
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let fields: String = group.iter().map(|d| d.to_group_html()).collect();
                format!("<div class=\"item\" data-index=\"{index}\">{fields}</div>")
            })
            .collect();
        let name = encode_double_quoted_attribute(&self.name);
        let mut out = format!(
            "<script type=\"text/framering-repeater\" data-for=\"{name}\">{template}</script>"
        );
        out.push_str(&open_tag(
            &self.element,
            self.attributes.iter().map(|(k, v)| (k.as_str(), v)),
        ));
        out.push('>');
        out.push_str(&format!("<div class=\"items\">{items}</div>"));
        out.push_str(
            "<div class=\"actions\"><button class=\"button button-primary\" data-role=\"repeater-add-new\">Add new</button></div>",
        );
        out.push_str(&format!("</{}>", self.element));
        out
    }
}

#[cfg(test)]
mod tests {
    use framering_config::FrameringConfig;
    use framering_fields::{FieldDef, FieldOption, FieldRegistry};
    use serde_json::json;

    use crate::render::Renderer;

    fn render(def: FieldDef, value: Option<serde_json::Value>) -> String {
        let config = FrameringConfig::default();
        let registry = FieldRegistry::with_builtins();
        let mut renderer = Renderer::new(&config, &registry);
        renderer.render_field(&def, value.as_ref()).unwrap().to_html()
    }

    #[test]
    fn input_self_closes_with_escaped_value() {
        let html = render(
            FieldDef::new("text").with_name("headline").required(),
            Some(json!("Tom & \"Jerry\"")),
        );
        assert_eq!(
            html,
            "<input type=\"text\" class=\"form-control\" name=\"headline\" id=\"headline\" required tabindex=\"1\" value=\"Tom &amp; &quot;Jerry&quot;\" />"
        );
    }

    #[test]
    fn textarea_escapes_body() {
        let html = render(FieldDef::new("textarea").with_name("bio"), Some(json!("<b>x</b>")));
        assert!(html.starts_with("<textarea class=\"form-control\" name=\"bio\""));
        assert!(html.ends_with(">&lt;b&gt;x&lt;/b&gt;</textarea>"));
    }

    #[test]
    fn select_placeholder_keeps_empty_value() {
        let html = render(
            FieldDef::new("select")
                .with_name("size")
                .required()
                .with_options(vec![FieldOption::new("s", "Small")]),
            None,
        );
        assert!(html.contains("<option value=\"\" disabled selected>— Select —</option>"));
        assert!(html.contains("<option value=\"s\">Small</option>"));
        assert!(html.ends_with("</select>"));
    }

    #[test]
    fn false_properties_are_omitted() {
        let html = render(FieldDef::new("checkbox").with_name("flag"), None);
        assert!(!html.contains("checked"));
        assert!(!html.contains("disabled"));
        assert!(html.contains("value=\"1\""));
    }

    #[test]
    fn repeater_emits_template_and_items() {
        let html = render(
            FieldDef::new("repeater")
                .with_name("slides")
                .with_fields(vec![FieldDef::new("text").with_name("title").with_title("Title")]),
            Some(json!([{"title": "One"}])),
        );
        assert!(html.starts_with("<script type=\"text/framering-repeater\" data-for=\"slides\">"));
        assert!(html.contains("name=\"slides[__index__][title]\""));
        assert!(html.contains("<div class=\"item\" data-index=\"0\">"));
        assert!(html.contains("value=\"One\""));
        assert!(html.contains("<label for=\"slides[0][title]\">Title</label>"));
    }

    #[test]
    fn group_html_wraps_label_and_description() {
        let config = FrameringConfig::default();
        let registry = FieldRegistry::with_builtins();
        let mut renderer = Renderer::new(&config, &registry);
        let d = renderer
            .render_field(
                &FieldDef::new("text")
                    .with_name("a")
                    .with_title("A <title>")
                    .with_description("line one\nline two"),
                None,
            )
            .unwrap();
        let html = d.to_group_html();
        assert!(html.starts_with("<div class=\"framering-form-group\"><label for=\"a\">A &lt;title&gt;</label>"));
        assert!(html.contains("<p class=\"description\">line one<br />\nline two</p>"));
    }
}
