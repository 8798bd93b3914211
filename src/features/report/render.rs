//! Report renderers.

use chrono::Datelike;
use quick_xml::escape::escape;

use super::project_report::{ProjectReport, ReportLine, TotalLine};
use crate::features::hours::format_hours;

/// Output format of a shareable report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Tab-separated lines, ready to paste into a spreadsheet
    #[default]
    Text,
    /// A standalone HTML table
    Html,
}

impl ReportFormat {
    /// File extension for saved reports.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Html => "html",
        }
    }
}

/// Render a report in the given format.
#[must_use]
pub fn render(report: &ProjectReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => render_text(report),
        ReportFormat::Html => render_html(report),
    }
}

/// Tab-separated text.
///
/// Each line is `date<TAB>hours[<TAB>comment]`, followed by
/// `Week N total<TAB>hours` and `<Month> total<TAB>hours` lines where a
/// period ends.
#[must_use]
pub fn render_text(report: &ProjectReport) -> String {
    let mut out = vec![report.title(), String::new()];

    for line in &report.lines {
        let mut row = format!("{}\t{}", line.date, format_hours(line.hours));
        if let Some(comment) = &line.comment {
            row.push('\t');
            row.push_str(comment);
        }
        out.push(row);

        for total in [&line.week_total, &line.month_total].into_iter().flatten() {
            out.push(format!("{}\t{}", total.label, format_hours(total.hours)));
        }
    }

    if report.lines.is_empty() {
        out.push("No sessions in this period".to_string());
    } else {
        out.push(String::new());
        out.push(format!("Total\t{}", format_hours(report.total_hours)));
    }

    out.join("\n")
}

/// A standalone HTML document with one table row per line.
#[must_use]
pub fn render_html(report: &ProjectReport) -> String {
    let mut out = String::new();
    out.push_str("<html>\n<head><meta charset=\"utf-8\"><title>");
    out.push_str(&escape(&report.title()));
    out.push_str("</title></head>\n<body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&report.project.name)));
    out.push_str(&format!("<h2>{}</h2>\n", escape(&report.period.label)));
    out.push_str("<table>\n");
    out.push_str(
        "<tr><th>Date</th><th>Day</th><th>Hours</th><th>Comment</th><th>Week</th><th>Month</th></tr>\n",
    );

    for line in &report.lines {
        out.push_str(&html_row(line));
    }

    out.push_str(&format!(
        "<tr><th colspan=\"2\">Total</th><th>{}</th><th></th><th></th><th></th></tr>\n",
        format_hours(report.total_hours)
    ));
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

fn html_row(line: &ReportLine) -> String {
    let total_cell = |total: &Option<TotalLine>| {
        total.as_ref().map_or_else(String::new, |t| {
            format!("{}: {}", escape(&t.label), format_hours(t.hours))
        })
    };

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        line.date,
        line.date.weekday(),
        format_hours(line.hours),
        escape(line.comment.as_deref().unwrap_or_default()),
        total_cell(&line.week_total),
        total_cell(&line.month_total),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::projects::Project;
    use crate::features::report::PeriodRange;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn report(lines: Vec<ReportLine>) -> ProjectReport {
        let total_hours = lines.iter().map(|l| l.hours).sum();
        ProjectReport {
            project: Project {
                id: 1,
                name: "Acme & Co".to_string(),
            },
            period: PeriodRange {
                label: "This month (October)".to_string(),
                from: None,
                up_to: None,
            },
            generated_at: Utc.with_ymd_and_hms(2024, 10, 16, 12, 0, 0).unwrap(),
            lines,
            total_hours,
        }
    }

    fn line(day: u32, hours: f64, comment: Option<&str>) -> ReportLine {
        ReportLine {
            date: NaiveDate::from_ymd_opt(2024, 10, day).unwrap(),
            hours,
            comment: comment.map(str::to_string),
            session_ids: vec![i64::from(day)],
            week_total: None,
            month_total: None,
        }
    }

    #[test]
    fn test_text_lines_and_totals() {
        let mut second = line(2, 4.0, None);
        second.week_total = Some(TotalLine {
            label: "Week 40 total".to_string(),
            hours: 10.0,
        });
        second.month_total = Some(TotalLine {
            label: "October total".to_string(),
            hours: 10.0,
        });
        let text = render_text(&report(vec![line(1, 6.0, Some("planning, review")), second]));

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Acme & Co - This month (October)");
        assert_eq!(lines[2], "2024-10-01\t6\tplanning, review");
        assert_eq!(lines[3], "2024-10-02\t4");
        assert_eq!(lines[4], "Week 40 total\t10");
        assert_eq!(lines[5], "October total\t10");
        assert_eq!(lines.last().copied(), Some("Total\t10"));
    }

    #[test]
    fn test_text_empty_period() {
        let text = render_text(&report(Vec::new()));
        assert!(text.contains("No sessions in this period"));
    }

    #[test]
    fn test_html_escapes_and_has_header() {
        let html = render_html(&report(vec![line(1, 1.5, Some("<fix> & test"))]));
        assert!(html.starts_with("<html>"));
        assert!(html.contains("<h1>Acme &amp; Co</h1>"));
        assert!(html.contains("<th>Date</th><th>Day</th>"));
        assert!(html.contains("<td>2024-10-01</td><td>Tue</td><td>1.5</td><td>&lt;fix&gt; &amp; test</td>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_dispatch() {
        let r = report(vec![line(1, 1.0, None)]);
        assert_eq!(render(&r, ReportFormat::Text), render_text(&r));
        assert_eq!(render(&r, ReportFormat::Html), render_html(&r));
        assert_eq!(ReportFormat::Html.extension(), "html");
    }
}
