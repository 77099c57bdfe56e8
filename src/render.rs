//! HTML rendering of a loaded dashboard.

use anyhow::{Context, Result};
use askama::Template;

use crate::config::DisplayConfig;
use crate::loaders::{Dashboard, ExitLogRow, NextExecution};
use crate::status::STATUS_LABELS;
use crate::table::{SortColumn, SortDir, TableQuery};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardPage<'a> {
    title: &'a str,
    interactive: bool,
    last_updated: Option<String>,
    table: Option<TableView>,
    next_executions: Option<Vec<ExecutionView>>,
}

struct TableView {
    sort: &'static str,
    dir: &'static str,
    project: String,
    script: String,
    status_options: Vec<StatusOption>,
    headers: Vec<HeaderView>,
    rows: Vec<RowView>,
    page: usize,
    pages: usize,
    prev_href: Option<String>,
    next_href: Option<String>,
    counter: String,
}

struct StatusOption {
    label: &'static str,
    selected: bool,
}

struct HeaderView {
    title: &'static str,
    href: String,
    indicator: &'static str,
    centered: bool,
}

struct RowView {
    class: &'static str,
    utc: String,
    display: String,
    date: String,
    time: String,
    project: String,
    script: String,
    exit_code: i64,
    label: &'static str,
}

struct ExecutionView {
    project: String,
    utc: String,
    display: String,
}

impl From<&ExitLogRow> for RowView {
    fn from(row: &ExitLogRow) -> Self {
        Self {
            class: row.status.class(),
            utc: row.timestamp.utc().to_rfc3339(),
            display: row.timestamp.long(),
            date: row.timestamp.date(),
            time: row.timestamp.time(),
            project: row.project_name.clone(),
            script: row.script_name.clone(),
            exit_code: row.exit_code,
            label: row.status.label(),
        }
    }
}

impl From<&NextExecution> for ExecutionView {
    fn from(entry: &NextExecution) -> Self {
        Self {
            project: entry.project_name.clone(),
            utc: entry.next_run.utc().to_rfc3339(),
            display: entry.next_run.long(),
        }
    }
}

fn table_view(rows: &[ExitLogRow], query: &TableQuery) -> TableView {
    let page = query.apply(rows);

    let headers = SortColumn::ALL
        .iter()
        .map(|&column| HeaderView {
            title: column.title(),
            href: query.sorted_by(column).to_query_string(),
            indicator: match (query.sort == column, query.dir) {
                (true, SortDir::Asc) => " ▲",
                (true, SortDir::Desc) => " ▼",
                (false, _) => "",
            },
            centered: matches!(column, SortColumn::ExitCode | SortColumn::Status),
        })
        .collect();

    let selected_status = query.status.as_deref().unwrap_or_default();
    let status_options = STATUS_LABELS
        .iter()
        .map(|&label| StatusOption {
            label,
            selected: label.eq_ignore_ascii_case(selected_status),
        })
        .collect();

    TableView {
        sort: query.sort.as_str(),
        dir: query.dir.as_str(),
        project: query.project.clone().unwrap_or_default(),
        script: query.script.clone().unwrap_or_default(),
        status_options,
        headers,
        rows: page.rows.iter().map(|r| RowView::from(*r)).collect(),
        page: page.page,
        pages: page.pages,
        prev_href: (page.page > 1).then(|| query.at_page(page.page - 1).to_query_string()),
        next_href: (page.page < page.pages).then(|| query.at_page(page.page + 1).to_query_string()),
        counter: page.counter(),
    }
}

/// Render the page served over HTTP: sortable headers, filter form and pager
/// links round-trip through `query`. Regions that failed to load render empty.
pub fn render_dashboard(
    dashboard: &Dashboard,
    query: &TableQuery,
    display: &DisplayConfig,
) -> Result<String> {
    render_page(dashboard, query, display, true)
}

/// Render a standalone page with every exit log row in the default order and
/// no links back to a server.
pub fn render_static(dashboard: &Dashboard, display: &DisplayConfig) -> Result<String> {
    let query = TableQuery {
        page_size: dashboard.exit_log.as_ref().map_or(1, |rows| rows.len().max(1)),
        ..TableQuery::default()
    };
    render_page(dashboard, &query, display, false)
}

fn render_page(
    dashboard: &Dashboard,
    query: &TableQuery,
    display: &DisplayConfig,
    interactive: bool,
) -> Result<String> {
    let page = DashboardPage {
        title: &display.title,
        interactive,
        last_updated: dashboard.last_updated.as_ref().map(|v| v.text()),
        table: dashboard.exit_log.as_deref().map(|rows| table_view(rows, query)),
        next_executions: dashboard
            .next_executions
            .as_ref()
            .map(|entries| entries.iter().map(ExecutionView::from).collect()),
    };
    page.render().context("failed to render dashboard template")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::{LastUpdatedView, LogRecord};
    use crate::time::DisplayInstant;

    fn row(ts: &str, project: &str, code: i64) -> ExitLogRow {
        ExitLogRow::from_record(LogRecord {
            timestamp: ts.to_string(),
            project_name: project.to_string(),
            script_name: "run.sh".to_string(),
            exit_code: code,
        })
        .unwrap()
    }

    fn render(dashboard: &Dashboard) -> String {
        render_dashboard(dashboard, &TableQuery::default(), &DisplayConfig::default()).unwrap()
    }

    #[test]
    fn test_error_row_carries_style_marker() {
        let dashboard = Dashboard {
            exit_log: Some(vec![row("2024-01-15T12:00:00Z", "Billing", 40)]),
            ..Dashboard::default()
        };
        let html = render(&dashboard);
        assert!(html.contains(r#"<tr class="exit-error">"#));
        assert!(html.contains(r#"<td class="center">ERROR</td>"#));
        assert!(html.contains("Monday, January 15, 03:00:00"));
    }

    #[test]
    fn test_unknown_row_has_no_style_marker() {
        let dashboard = Dashboard {
            exit_log: Some(vec![row("2024-01-15T12:00:00Z", "Billing", 7)]),
            ..Dashboard::default()
        };
        let html = render(&dashboard);
        assert!(html.contains(r#"<td class="center">UNKNOWN</td>"#));
        assert!(!html.contains(r#"<tr class="#));
        assert!(html.contains("<tr>"));
    }

    #[test]
    fn test_last_updated_and_executions() {
        let dashboard = Dashboard {
            last_updated: Some(LastUpdatedView {
                generated_at: DisplayInstant::parse("2024-01-15T12:00:00Z").unwrap(),
            }),
            next_executions: Some(vec![NextExecution {
                project_name: "Backup".to_string(),
                next_run: DisplayInstant::parse("2024-06-01T09:30:00Z").unwrap(),
            }]),
            ..Dashboard::default()
        };
        let html = render(&dashboard);
        assert!(html.contains(r#"<span id="last-updated">Monday, January 15, 03:00:00</span>"#));
        assert!(html.contains("<strong>Backup</strong>"));
        assert!(html.contains("Saturday, June 01, 01:30:00"));
        assert_eq!(html.matches(r#"class="execution-item""#).count(), 1);
    }

    #[test]
    fn test_failed_regions_render_empty() {
        let html = render(&Dashboard::default());
        assert!(html.contains(r#"<span id="last-updated"></span>"#));
        assert!(html.contains(r#"id="exit-log-table""#));
        assert!(html.contains(r#"id="next-executions-list""#));
        assert!(!html.contains("<table>"));
        assert!(!html.contains("execution-item\">"));
    }

    #[test]
    fn test_values_are_escaped() {
        let dashboard = Dashboard {
            exit_log: Some(vec![row("2024-01-15T12:00:00Z", "<script>x</script>", 1)]),
            ..Dashboard::default()
        };
        let html = render(&dashboard);
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_pager_links() {
        let rows: Vec<_> = (0..30)
            .map(|i| row(&format!("2024-01-15T12:{:02}:00Z", i), "P", 1))
            .collect();
        let dashboard = Dashboard {
            exit_log: Some(rows),
            ..Dashboard::default()
        };
        let html = render(&dashboard);
        assert!(html.contains("Page 1 of 2"));
        assert!(html.contains("Showing 1-25 of 30 rows"));
        assert!(html.contains("?sort=timestamp&amp;dir=desc&amp;page=2"));
        assert!(!html.contains("Prev"));
    }

    #[test]
    fn test_static_page_has_every_row_and_no_links() {
        let rows: Vec<_> = (0..30)
            .map(|i| row(&format!("2024-01-15T12:{:02}:00Z", i), "P", 1))
            .collect();
        let dashboard = Dashboard {
            exit_log: Some(rows),
            ..Dashboard::default()
        };
        let html = render_static(&dashboard, &DisplayConfig::default()).unwrap();
        assert_eq!(html.matches(r#"<tr class="exit-ok">"#).count(), 30);
        assert!(html.contains("Showing 1-30 of 30 rows"));
        assert!(html.contains(r#"<th>Timestamp ▼</th>"#));
        assert!(!html.contains("<form"));
        assert!(!html.contains(r#"href="?"#));
        assert!(!html.contains("Page 1 of"));
    }

    #[test]
    fn test_static_page_with_empty_log() {
        let dashboard = Dashboard {
            exit_log: Some(Vec::new()),
            ..Dashboard::default()
        };
        let html = render_static(&dashboard, &DisplayConfig::default()).unwrap();
        assert!(html.contains("<table>"));
        assert!(!html.contains("<form"));
    }
}
