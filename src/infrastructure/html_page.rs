// HTML rendering of the dashboard layout and its output region
use crate::domain::resample::Granularity;
use crate::domain::river::DatasetKind;
use crate::domain::table::Table;
use crate::domain::view::{SelectOption, Selection, View, Visualization, PLACEHOLDER_TEXT};
use crate::infrastructure::chart_renderer::{histogram_svg, trend_svg};
use std::fmt::Write;

pub const PAGE_TITLE: &str = "River Water Quality Dashboard";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything the page needs besides the output region
pub struct PageModel<'a> {
    pub rivers: &'a [SelectOption],
    pub parameters: &'a [SelectOption],
    pub selection: &'a Selection,
    pub n_clicks: u32,
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
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

fn select(id: &str, name: &str, options: &[SelectOption], selected: Option<&str>, style: &str) -> String {
    let mut html = format!(r#"<select id="{id}" name="{name}" style="{style}">"#);
    for option in options {
        let marker = if Some(option.value.as_str()) == selected { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{}"{}>{}</option>"#,
            escape_html(&option.value),
            marker,
            escape_html(&option.label)
        );
    }
    html.push_str("</select>");
    html
}

fn labelled(label: &str, control: String) -> String {
    format!(
        r#"<div style="width: 30%; display: inline-block; padding: 10px;"><label style="font-weight: bold;">{}</label><br>{}</div>"#,
        escape_html(label),
        control
    )
}

fn options<T: Copy>(values: &[T], value: fn(&T) -> &'static str, label: fn(&T) -> &'static str) -> Vec<SelectOption> {
    values
        .iter()
        .map(|v| SelectOption {
            label: label(v).to_string(),
            value: value(v).to_string(),
        })
        .collect()
}

/// Full dashboard page: selectors, trigger button and the rendered output
pub fn render_page(model: &PageModel<'_>, view: &View) -> String {
    let selection = model.selection;
    let datasets = options(&DatasetKind::ALL, DatasetKind::value, DatasetKind::label);
    let visualizations = options(&Visualization::ALL, Visualization::value, Visualization::label);
    let granularities = options(&Granularity::ALL, Granularity::value, Granularity::label);

    let mut parameters = vec![SelectOption {
        label: "Select parameter".to_string(),
        value: String::new(),
    }];
    parameters.extend(model.parameters.iter().cloned());

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", PAGE_TITLE);
    html.push_str("<style>table.grid{border-collapse:collapse;font-size:13px}table.grid th,table.grid td{border:1px solid #ddd;padding:4px 8px}table.grid th{background:#f4f6f8}.notice{color:#555}</style>\n");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(
        html,
        r#"<h1 style="text-align: center; color: #007bff; padding: 10px;">{}</h1>"#,
        PAGE_TITLE
    );
    html.push_str("<form id=\"dashboard\" method=\"get\" action=\"/\">\n");
    html.push_str(&labelled(
        "Select River:",
        select("river_selector", "river", model.rivers, Some(selection.river.as_str()), "width: 100%;"),
    ));
    html.push_str(&labelled(
        "Select Dataset:",
        select("dataset_selector", "dataset", &datasets, Some(selection.dataset.value()), "width: 100%;"),
    ));
    html.push_str(&labelled(
        "Select Visualization:",
        select(
            "visualization_selector",
            "visualization",
            &visualizations,
            Some(selection.visualization.value()),
            "width: 100%;",
        ),
    ));
    html.push_str("\n<div style=\"padding: 10px;\">");
    html.push_str(&select(
        "parameter_selector",
        "parameter",
        &parameters,
        Some(selection.parameter.as_deref().unwrap_or("")),
        "width: 45%; display: inline-block;",
    ));
    html.push_str(&select(
        "time_range_selector",
        "granularity",
        &granularities,
        Some(selection.granularity.value()),
        "width: 45%; display: inline-block; margin-left: 10px;",
    ));
    html.push_str("</div>\n");
    let _ = writeln!(
        html,
        r#"<button id="display_button" type="submit" name="n_clicks" value="{}" style="margin-top: 10px;">Display Data</button>"#,
        model.n_clicks.saturating_add(1)
    );
    html.push_str("</form>\n");
    let _ = writeln!(
        html,
        r#"<div id="output_content" style="margin-top: 20px;">{}</div>"#,
        render_view(view)
    );
    html.push_str(PARAMETER_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}

/// Repopulates the parameter dropdown as soon as river or dataset changes
const PARAMETER_SCRIPT: &str = r#"<script>
async function refreshParameters() {
  const river = document.getElementById('river_selector').value;
  const dataset = document.getElementById('dataset_selector').value;
  const select = document.getElementById('parameter_selector');
  const previous = select.value;
  const response = await fetch('/parameters?' + new URLSearchParams({ river, dataset }));
  if (!response.ok) { return; }
  const options = await response.json();
  select.replaceChildren(new Option('Select parameter', ''), ...options.map(o => new Option(o.label, o.value)));
  select.value = options.some(o => o.value === previous) ? previous : '';
}
document.getElementById('river_selector').addEventListener('change', refreshParameters);
document.getElementById('dataset_selector').addEventListener('change', refreshParameters);
</script>
"#;

/// Output region markup for a resolved view
pub fn render_view(view: &View) -> String {
    match view {
        View::Placeholder => format!("<div>{}</div>", escape_html(PLACEHOLDER_TEXT)),
        View::Notice(message) => format!(r#"<div class="notice">{}</div>"#, escape_html(message)),
        View::Table {
            river,
            dataset,
            table,
        } => format!(
            r#"<div class="caption">{} {}</div>{}"#,
            escape_html(river),
            dataset.label(),
            render_grid(table)
        ),
        View::Histogram {
            river,
            dataset,
            parameter,
            bins,
        } => {
            let title = format!("{} {} - {}", river, dataset.label(), parameter);
            chart_or_notice(histogram_svg(&title, parameter, bins))
        }
        View::Trend {
            river,
            parameter,
            granularity,
            points,
        } => {
            let title = format!("{} {} trend - {}", river, granularity.label(), parameter);
            chart_or_notice(trend_svg(&title, parameter, *granularity, points))
        }
    }
}

fn chart_or_notice<E: std::fmt::Display>(svg: Result<String, E>) -> String {
    match svg {
        Ok(svg) => format!(r#"<div class="chart">{}</div>"#, svg),
        Err(e) => {
            tracing::error!("Chart rendering failed: {}", e);
            format!(r#"<div class="notice">{}</div>"#, escape_html(&e.to_string()))
        }
    }
}

/// Every row and column of the table, timestamp included
pub fn render_grid(table: &Table) -> String {
    let mut html = String::from(r#"<table class="grid"><thead><tr>"#);
    for name in table.column_names() {
        let _ = write!(html, "<th>{}</th>", escape_html(&name));
    }
    html.push_str("</tr></thead><tbody>");
    for i in 0..table.row_count() {
        let Some((timestamp, values)) = table.row(i) else {
            break;
        };
        html.push_str("<tr>");
        let timestamp = timestamp
            .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default();
        let _ = write!(html, "<td>{}</td>", timestamp);
        for value in values {
            match value {
                Some(v) => {
                    let _ = write!(html, "<td>{}</td>", v);
                }
                None => html.push_str("<td></td>"),
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}
