//! Page layout: a flat list of components rendered to one HTML document.

use std::fmt::Write;

/// A piece of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Centered page heading.
    Heading { text: String },
    /// Chart region; `svg` is the initial figure.
    Graph { id: String, svg: String },
    /// Multi-select filter. `value` holds the ticked options.
    Checklist {
        id: String,
        options: Vec<String>,
        value: Vec<String>,
        inline: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub components: Vec<Component>,
}

impl Layout {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            components: Vec::new(),
        }
    }

    pub fn with(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn to_html(&self) -> String {
        let mut body = String::new();
        for component in &self.components {
            render_component(&mut body, component);
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{ font-family: sans-serif; margin: 0 auto; max-width: 960px; }}
        h1 {{ text-align: center; }}
        .checklist.inline label {{ display: inline-block; margin-right: 12px; }}
        .checklist label {{ display: block; }}
    </style>
</head>
<body>
{body}<script>
{script}
</script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            body = body,
            script = DISPATCH_SCRIPT,
        )
    }
}

fn render_component(out: &mut String, component: &Component) {
    // Writing to a String cannot fail.
    match component {
        Component::Heading { text } => {
            let _ = writeln!(out, "<h1>{}</h1>", escape_html(text));
        }
        Component::Graph { id, svg } => {
            let _ = writeln!(
                out,
                r#"<div id="{}" class="graph" data-property="figure">{}</div>"#,
                escape_html(id),
                svg
            );
        }
        Component::Checklist {
            id,
            options,
            value,
            inline,
        } => {
            let class = if *inline { "checklist inline" } else { "checklist" };
            let _ = writeln!(out, r#"<div id="{}" class="{}">"#, escape_html(id), class);
            for option in options {
                let checked = if value.contains(option) { " checked" } else { "" };
                let _ = writeln!(
                    out,
                    r#"    <label><input type="checkbox" value="{v}"{checked}> {v}</label>"#,
                    v = escape_html(option),
                    checked = checked,
                );
            }
            let _ = writeln!(out, "</div>");
        }
    }
}

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Posts every checklist change to `/_update` and swaps the returned figure
/// into its output element.
const DISPATCH_SCRIPT: &str = r#"document.querySelectorAll('.checklist').forEach(function (list) {
    list.addEventListener('change', async function () {
        var value = Array.from(list.querySelectorAll('input:checked')).map(function (el) {
            return el.value;
        });
        var response = await fetch('/_update', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ input: { id: list.id, property: 'value' }, value: value })
        });
        if (!response.ok) {
            console.error('update failed', response.status, await response.text());
            return;
        }
        var update = await response.json();
        var target = document.getElementById(update.output.id);
        if (target && update.output.property === 'figure') {
            target.innerHTML = update.value.svg;
        }
    });
});"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Layout {
        Layout::new("East Bay Costco Gas Prices")
            .with(Component::Heading {
                text: "East Bay Costco Gas Prices".to_string(),
            })
            .with(Component::Graph {
                id: "graph-content".to_string(),
                svg: "<svg></svg>".to_string(),
            })
            .with(Component::Checklist {
                id: "checklist".to_string(),
                options: vec!["NEWARK".to_string(), "SAN LEANDRO".to_string()],
                value: vec!["NEWARK".to_string()],
                inline: true,
            })
    }

    #[test]
    fn renders_components_in_order() {
        let html = page().to_html();

        let heading = html.find("<h1>East Bay Costco Gas Prices</h1>").unwrap();
        let graph = html.find(r#"<div id="graph-content""#).unwrap();
        let checklist = html.find(r#"<div id="checklist" class="checklist inline">"#).unwrap();
        assert!(heading < graph && graph < checklist);
        assert!(html.contains("<svg></svg>"));
    }

    #[test]
    fn only_selected_options_are_checked() {
        let html = page().to_html();
        assert!(html.contains(r#"<input type="checkbox" value="NEWARK" checked> NEWARK"#));
        assert!(html.contains(r#"<input type="checkbox" value="SAN LEANDRO"> SAN LEANDRO"#));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
