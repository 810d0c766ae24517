//! Per-template section layouts.

use super::markdown;
use super::{FALLBACK_TAG, Section};
use crate::deck::{ContentTemplate, ContentUnit, DocumentBlueprint, VisualType};
use crate::research::ResearchRecord;
use crate::visual::{Visualization, matrix_position};

pub fn cover(section: &Section, blueprint: &DocumentBlueprint, client: &str, date: &str) -> String {
    let mut output = format!("# {}\n\n", section.entry.title);
    output.push_str(&format!("## {}\n\n", blueprint.hypothesis));
    output.push_str(&format!("**Prepared for:** {}  \n", client));
    output.push_str(&format!("**Date:** {}\n", date));

    if !blueprint.core_question.trim().is_empty() {
        output.push_str(&format!("\n*{}*\n", blueprint.core_question));
    }
    if !section.content.lead_insight.trim().is_empty() {
        output.push_str(&format!("\n> {}\n", section.content.lead_insight));
    }
    if section.content.provenance.is_fallback() {
        output.push_str(&format!("\n{}\n", FALLBACK_TAG));
    }
    output
}

pub fn section(section: &Section, research: &ResearchRecord) -> String {
    let entry = &section.entry;
    let content = &section.content;

    let mut output = format!("## {}. {}", entry.position, entry.title);
    if content.provenance.is_fallback() {
        output.push(' ');
        output.push_str(FALLBACK_TAG);
    }
    output.push_str("\n\n");
    output.push_str(&format!("**{}**\n\n", content.lead_insight));

    let body = match entry.content_template {
        ContentTemplate::TitleOnly => String::new(),
        ContentTemplate::TwoColumn => two_column(content),
        ContentTemplate::ChartMain => chart_main(content, section.visualization.as_ref()),
        ContentTemplate::Framework => framework(content, section.visualization.as_ref(), research),
    };
    if !body.is_empty() {
        output.push_str(&body);
        output.push('\n');
    }

    output.push_str(&closing(content));
    output
}

/// Left column takes the larger half
fn two_column(content: &ContentUnit) -> String {
    let points = &content.supporting_points;
    let split = points.len().div_ceil(2);
    let (left, right) = points.split_at(split);

    let mut rows = vec![vec!["Key findings".to_string(), "Implications".to_string()]];
    for (i, point) in left.iter().enumerate() {
        rows.push(vec![point.clone(), right.get(i).cloned().unwrap_or_default()]);
    }
    markdown::table(&rows)
}

fn chart_main(content: &ContentUnit, visualization: Option<&Visualization>) -> String {
    match visualization {
        Some(viz) if viz.encoded_image.is_some() => {
            let uri = viz.encoded_image.as_deref().unwrap_or_default();
            let mut output = markdown::image(&viz.title, uri);
            output.push_str(&format!("\n*{}*\n", content.chart_insight));
            output
        }
        Some(viz) if viz.table.is_some() => {
            let mut output = format!("**{}**\n\n", viz.title);
            output.push_str(&markdown::table(viz.table.as_deref().unwrap_or_default()));
            output.push_str(&format!("\n*{}*\n", content.chart_insight));
            output
        }
        _ => markdown::bullets(&content.supporting_points),
    }
}

const QUADRANTS: [&str; 4] = ["Leaders", "Innovators", "Incumbents", "Niche players"];

/// 2×2 grid; competitors placed by quadrant when the matrix was drawn
fn framework(
    content: &ContentUnit,
    visualization: Option<&Visualization>,
    research: &ResearchRecord,
) -> String {
    let mut cells: [Vec<String>; 4] = Default::default();

    let has_matrix = visualization.is_some_and(|v| v.kind == VisualType::Framework);
    if has_matrix {
        for competitor in &research.competitors {
            let (x, y) = matrix_position(competitor.share_percent(), &competitor.strengths);
            let quadrant = match (x >= 0.5, y >= 0.5) {
                (true, true) => 0,
                (false, true) => 1,
                (true, false) => 2,
                (false, false) => 3,
            };
            cells[quadrant].push(competitor.name.clone());
        }
    } else {
        for (i, point) in content.supporting_points.iter().take(4).enumerate() {
            cells[i].push(point.clone());
        }
    }

    let cell = |i: usize| {
        let body = if cells[i].is_empty() {
            "-".to_string()
        } else {
            cells[i].join(", ")
        };
        format!("**{}**: {}", QUADRANTS[i], body)
    };
    let rows = vec![
        vec![
            String::new(),
            "Low market presence".to_string(),
            "High market presence".to_string(),
        ],
        vec!["**High innovation**".to_string(), cell(1), cell(0)],
        vec!["**Low innovation**".to_string(), cell(3), cell(2)],
    ];

    let mut output = String::new();
    if let Some(viz) = visualization
        && let Some(uri) = viz.encoded_image.as_deref()
    {
        output.push_str(&markdown::image(&viz.title, uri));
        output.push('\n');
    }
    output.push_str(&markdown::table(&rows));
    if has_matrix {
        output.push_str(&format!("\n*{}*\n", content.chart_insight));
    }
    output
}

fn closing(content: &ContentUnit) -> String {
    let mut output = format!("**So what:** {}\n", content.takeaway);

    if !content.next_steps.is_empty() {
        output.push_str("\n**Next steps**\n\n");
        output.push_str(&markdown::numbered(&content.next_steps));
    }
    if !content.sources.is_empty() {
        output.push_str(&format!("\n*Sources: {}*\n", content.sources.join("; ")));
    }
    if let Some(notes) = content.presenter_notes.as_deref().filter(|n| !n.trim().is_empty()) {
        output.push_str(&format!("\n<!-- Presenter notes: {} -->\n", notes.replace("--", "-")));
    }
    output
}
