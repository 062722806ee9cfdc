//! `haven analyze` - mental health analytics report in the terminal.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use haven_core::analytics::analyzer::AnalysisSource;
use haven_core::analytics::service::AnalyticsReport;
use haven_types::analytics::ScoreBand;

use crate::cli::account;
use crate::cli::chat::loop_runner::thinking_spinner;
use crate::state::AppState;

/// Analyze one session, or every session of the user.
///
/// # Examples
///
/// ```bash
/// haven analyze mira
/// haven analyze mira --session <session-id> --json
/// ```
pub async fn analyze(state: &AppState, username: &str, session: Option<Uuid>, json: bool) -> Result<()> {
    let user = account::login(state, username).await?;

    let spinner = (!json).then(|| thinking_spinner("analyzing conversation..."));
    let result = match session {
        Some(id) => state.analytics_service.session_analytics(&user, &id).await,
        None => state.analytics_service.overall_analytics(&user).await,
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn score_color(score: f64) -> Color {
    match ScoreBand::from_score(score) {
        ScoreBand::Excellent | ScoreBand::Good => Color::Green,
        ScoreBand::Moderate => Color::Yellow,
        ScoreBand::Significant => Color::Red,
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {}", style(title).bold());
    for item in items {
        println!("    - {item}");
    }
    println!();
}

fn print_report(report: &AnalyticsReport) {
    let a = &report.analytics;

    println!();
    println!(
        "  {} {:.1}/10  {}",
        style("Overall").bold(),
        a.overall_mental_health_score,
        style(report.band_label).cyan().bold()
    );
    println!(
        "  Risk level: {}   Dominant emotion: {}",
        style(a.risk_level).yellow(),
        style(&a.emotional_state.dominant_emotion).magenta()
    );
    println!(
        "  {} messages analyzed, topics: {}",
        report.context.total_messages,
        if report.context.topics_discussed.is_empty() {
            "none detected".to_string()
        } else {
            report.context.topics_discussed.join(", ")
        }
    );
    if report.source == AnalysisSource::Fallback {
        println!(
            "  {}",
            style("Keyword-based estimate (no analysis model available).").dim()
        );
    }
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Wellness").fg(Color::White),
        Cell::new("Score").fg(Color::White),
        Cell::new("Confidence").fg(Color::White),
    ]);
    for w in &report.wellness {
        table.add_row(vec![
            Cell::new(w.label),
            Cell::new(format!("{:.1}", w.score)).fg(score_color(w.score)),
            Cell::new(format!("{:.0}%", w.confidence * 100.0)).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
    println!();

    print_list("Strengths", &a.strengths);
    print_list("Immediate concerns", &a.immediate_concerns);
    print_list("Recommendations", &a.priority_recommendations);

    if a.follow_up_needed {
        println!(
            "  {} {}",
            style("!").red().bold(),
            style("Consider reaching out to a mental health professional.").bold()
        );
        println!();
    }
}
