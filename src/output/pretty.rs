use chrono::NaiveDateTime;
use colored::Colorize;

use super::{SessionRow, StatusView};
use crate::features::hours::{format_hours, PeriodKind, PeriodTotal};
use crate::features::projects::{Project, ProjectSummary};

/// Format project summaries as a list
pub fn format_projects_pretty(projects: &[ProjectSummary]) -> String {
    if projects.is_empty() {
        return "Projects (0)\n  No projects".to_string();
    }

    let mut output = format!("Projects ({})\n", projects.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for project in projects {
        let mut line = format!(
            "{} {}  {}",
            format!("#{:<4}", project.id).dimmed(),
            project.name.bold(),
            format!(
                "{} sessions, {} h",
                project.session_count,
                format_hours(project.total_hours)
            )
            .dimmed()
        );

        if project.running {
            line.push_str(&format!("  {}", "● running".green()));
        }

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format a project's sessions with week and month totals after their anchors
pub fn format_sessions_pretty(project: &Project, rows: &[SessionRow]) -> String {
    if rows.is_empty() {
        return format!("{} (0 sessions)\n  No sessions", project.name);
    }

    let mut output = format!("{} ({} sessions)\n", project.name.bold(), rows.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for row in rows {
        let mut line = format!(
            "{} {}  {:>6} h",
            format!("#{:<4}", row.session.id).dimmed(),
            time_span(row.local_start, row.local_end),
            format_hours(row.hours)
        );
        if let Some(note) = row.session.note() {
            line.push_str(&format!("  {}", note.italic()));
        }
        output.push_str(&line);
        output.push('\n');

        if let Some(total) = &row.week_total {
            output.push_str(&format!("      {}\n", total_line(total).cyan()));
        }
        if let Some(total) = &row.month_total {
            output.push_str(&format!("      {}\n", total_line(total).magenta()));
        }
    }

    let sum: f64 = rows.iter().map(|r| r.hours).sum();
    output.push_str(&"─".repeat(60));
    output.push_str(&format!("\nTotal: {} h", format_hours(sum).bold()));

    output
}

/// Format a single session with its details
pub fn format_session_pretty(project: &Project, row: &SessionRow) -> String {
    let session = &row.session;
    let state = if session.is_running() {
        "running".green()
    } else {
        "closed".normal()
    };

    let mut output = format!("Session #{} {}\n", session.id, format!("[{state}]").bold());
    output.push_str(&format!("  {}: {project}\n", "Project".dimmed()));
    output.push_str(&format!(
        "  {}: {}\n",
        "Start".dimmed(),
        row.local_start.format("%Y-%m-%d %H:%M")
    ));
    if let Some(end) = row.local_end {
        output.push_str(&format!("  {}: {}\n", "End".dimmed(), end.format("%Y-%m-%d %H:%M")));
    }
    output.push_str(&format!("  {}: {}\n", "Hours".dimmed(), format_hours(row.hours)));
    if let Some(note) = session.note() {
        output.push_str(&format!("  {}: {note}\n", "Comment".dimmed()));
    }
    for total in [&row.week_total, &row.month_total].into_iter().flatten() {
        output.push_str(&format!("  {}\n", total_line(total).cyan()));
    }

    output
}

/// Format period totals, one per line
pub fn format_totals_pretty(project: &Project, kind: PeriodKind, totals: &[PeriodTotal]) -> String {
    let heading = match kind {
        PeriodKind::Week => "Weekly totals",
        PeriodKind::Month => "Monthly totals",
    };

    if totals.is_empty() {
        return format!("{heading} - {}\n  No closed sessions", project.name);
    }

    let mut output = format!("{heading} - {}\n", project.name.bold());
    output.push_str(&"─".repeat(40));
    output.push('\n');

    for total in totals {
        output.push_str(&format!(
            "  {:<10} {:>8} h  {}\n",
            total.key.to_string(),
            format_hours(total.total_hours),
            format!("({} sessions)", total.session_count).dimmed()
        ));
    }

    output
}

/// Format tracker status
pub fn format_status_pretty(status: Option<&StatusView>) -> String {
    let Some(view) = status else {
        return format!("{} No session running", "○".dimmed());
    };

    let mut output = format!("{} Tracking {}\n", "●".green(), view.project.name.bold());
    output.push_str(&format!(
        "  {}: {}\n",
        "Since".dimmed(),
        view.local_start.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!(
        "  {}: {} h",
        "Elapsed".dimmed(),
        format_hours(view.elapsed_hours)
    ));
    if let Some(note) = view.session.note() {
        output.push_str(&format!("\n  {}: {note}", "Comment".dimmed()));
    }

    output
}

/// Format a confirmation message
pub fn format_action_pretty(message: &str) -> String {
    format!("{} {message}", "✓".green())
}

fn total_line(total: &PeriodTotal) -> String {
    format!("{} total: {} h", total.key.label(), format_hours(total.total_hours))
}

fn time_span(start: NaiveDateTime, end: Option<NaiveDateTime>) -> String {
    let from = start.format("%Y-%m-%d %a %H:%M").to_string();
    match end {
        Some(end) if end.date() == start.date() => format!("{from}-{}", end.format("%H:%M")),
        Some(end) => format!("{from} - {}", end.format("%Y-%m-%d %H:%M")),
        None => format!("{from}-{}", "now".green()),
    }
}
