//! Exit log table -- sorting, filtering and pagination over loaded rows.

use std::cmp::Ordering;

use reqwest::Url;
use serde::Deserialize;

use crate::loaders::ExitLogRow;

pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Timestamp,
    Project,
    Script,
    ExitCode,
    Status,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Timestamp,
        SortColumn::Project,
        SortColumn::Script,
        SortColumn::ExitCode,
        SortColumn::Status,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Timestamp => "timestamp",
            SortColumn::Project => "project",
            SortColumn::Script => "script",
            SortColumn::ExitCode => "exit_code",
            SortColumn::Status => "status",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SortColumn::Timestamp => "Timestamp",
            SortColumn::Project => "Project",
            SortColumn::Script => "Script",
            SortColumn::ExitCode => "Exit Code",
            SortColumn::Status => "Status",
        }
    }

    fn compare(self, a: &ExitLogRow, b: &ExitLogRow) -> Ordering {
        match self {
            SortColumn::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortColumn::Project => a.project_name.cmp(&b.project_name),
            SortColumn::Script => a.script_name.cmp(&b.script_name),
            SortColumn::ExitCode => a.exit_code.cmp(&b.exit_code),
            SortColumn::Status => a.status.label().cmp(b.status.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }
}

/// Raw query-string parameters for the table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableParams {
    pub sort: Option<SortColumn>,
    pub dir: Option<SortDir>,
    pub page: Option<usize>,
    pub project: Option<String>,
    pub script: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub sort: SortColumn,
    pub dir: SortDir,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub project: Option<String>,
    pub script: Option<String>,
    pub status: Option<String>,
}

impl Default for TableQuery {
    /// Newest runs first, first page.
    fn default() -> Self {
        Self {
            sort: SortColumn::Timestamp,
            dir: SortDir::Desc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            project: None,
            script: None,
            status: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TableQuery {
    pub fn from_params(params: TableParams, page_size: usize) -> Self {
        let defaults = Self::default();
        Self {
            sort: params.sort.unwrap_or(defaults.sort),
            dir: params.dir.unwrap_or(defaults.dir),
            page: params.page.unwrap_or(1).max(1),
            page_size: page_size.max(1),
            project: non_empty(params.project),
            script: non_empty(params.script),
            status: non_empty(params.status),
        }
    }

    fn matches(&self, row: &ExitLogRow) -> bool {
        let contains = |haystack: &str, needle: &Option<String>| {
            needle
                .as_ref()
                .map_or(true, |n| haystack.to_lowercase().contains(&n.to_lowercase()))
        };
        contains(&row.project_name, &self.project)
            && contains(&row.script_name, &self.script)
            && self
                .status
                .as_ref()
                .map_or(true, |s| row.status.label().eq_ignore_ascii_case(s))
    }

    /// Filter, sort and paginate `rows`. Equal keys keep their incoming order.
    pub fn apply<'a>(&self, rows: &'a [ExitLogRow]) -> TablePage<'a> {
        let mut selected: Vec<&ExitLogRow> = rows.iter().filter(|r| self.matches(r)).collect();
        match self.dir {
            SortDir::Asc => selected.sort_by(|a, b| self.sort.compare(a, b)),
            SortDir::Desc => selected.sort_by(|a, b| self.sort.compare(b, a)),
        }

        let total = selected.len();
        let pages = total.div_ceil(self.page_size).max(1);
        let page = self.page.min(pages);
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(total);

        TablePage {
            rows: selected[start..end].to_vec(),
            page,
            pages,
            total,
            first: if total == 0 { 0 } else { start + 1 },
            last: end,
        }
    }

    /// Same filters, sorted by `column`. Re-selecting the active column flips direction.
    pub fn sorted_by(&self, column: SortColumn) -> Self {
        let dir = if self.sort == column {
            self.dir.flipped()
        } else {
            SortDir::Asc
        };
        Self {
            sort: column,
            dir,
            page: 1,
            ..self.clone()
        }
    }

    pub fn at_page(&self, page: usize) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Query string (with leading `?`) reproducing this query.
    pub fn to_query_string(&self) -> String {
        let mut pairs = vec![
            ("sort", self.sort.as_str().to_string()),
            ("dir", self.dir.as_str().to_string()),
            ("page", self.page.to_string()),
        ];
        for (key, value) in [
            ("project", &self.project),
            ("script", &self.script),
            ("status", &self.status),
        ] {
            if let Some(v) = value {
                pairs.push((key, v.clone()));
            }
        }
        Url::parse_with_params("http://localhost/", &pairs)
            .ok()
            .and_then(|url| url.query().map(|q| format!("?{}", q)))
            .unwrap_or_default()
    }
}

/// One page of the filtered, sorted table.
#[derive(Debug)]
pub struct TablePage<'a> {
    pub rows: Vec<&'a ExitLogRow>,
    pub page: usize,
    pub pages: usize,
    /// Rows left after filtering.
    pub total: usize,
    pub first: usize,
    pub last: usize,
}

impl TablePage<'_> {
    pub fn counter(&self) -> String {
        if self.total == 0 {
            "Showing 0 of 0 rows".to_string()
        } else {
            format!("Showing {}-{} of {} rows", self.first, self.last, self.total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::LogRecord;

    fn row(ts: &str, project: &str, script: &str, code: i64) -> ExitLogRow {
        ExitLogRow::from_record(LogRecord {
            timestamp: ts.to_string(),
            project_name: project.to_string(),
            script_name: script.to_string(),
            exit_code: code,
        })
        .unwrap()
    }

    fn fixture() -> Vec<ExitLogRow> {
        vec![
            row("2024-01-15T12:00:00Z", "Billing", "invoice.py", 1),
            row("2024-01-16T12:00:00Z", "Backup", "nightly.sh", 40),
            row("2024-01-14T12:00:00Z", "billing-eu", "invoice.py", 30),
            row("2024-01-17T12:00:00Z", "Search", "reindex.sh", 1),
        ]
    }

    fn projects(page: &TablePage<'_>) -> Vec<String> {
        page.rows.iter().map(|r| r.project_name.clone()).collect()
    }

    #[test]
    fn test_default_is_newest_first() {
        let rows = fixture();
        let page = TableQuery::default().apply(&rows);
        assert_eq!(projects(&page), ["Search", "Backup", "Billing", "billing-eu"]);
        assert_eq!(page.counter(), "Showing 1-4 of 4 rows");
    }

    #[test]
    fn test_sort_exit_code_numeric() {
        let rows = vec![
            row("2024-01-15T12:00:00Z", "a", "s", 40),
            row("2024-01-15T12:00:00Z", "b", "s", -999),
            row("2024-01-15T12:00:00Z", "c", "s", 5),
        ];
        let q = TableQuery {
            sort: SortColumn::ExitCode,
            dir: SortDir::Asc,
            ..TableQuery::default()
        };
        assert_eq!(projects(&q.apply(&rows)), ["b", "c", "a"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let rows = fixture();
        let q = TableQuery {
            sort: SortColumn::Status,
            dir: SortDir::Desc,
            ..TableQuery::default()
        };
        // WARNING > OK > ERROR as strings; the two OK rows keep their input order.
        assert_eq!(projects(&q.apply(&rows)), ["billing-eu", "Billing", "Search", "Backup"]);
    }

    #[test]
    fn test_filters_combine() {
        let rows = fixture();
        let q = TableQuery {
            project: Some("BILL".to_string()),
            ..TableQuery::default()
        };
        assert_eq!(projects(&q.apply(&rows)), ["Billing", "billing-eu"]);

        let q = TableQuery {
            project: Some("bill".to_string()),
            status: Some("warning".to_string()),
            ..TableQuery::default()
        };
        assert_eq!(projects(&q.apply(&rows)), ["billing-eu"]);

        let q = TableQuery {
            script: Some("sh".to_string()),
            status: Some("unknown".to_string()),
            ..TableQuery::default()
        };
        assert_eq!(q.apply(&rows).counter(), "Showing 0 of 0 rows");
    }

    #[test]
    fn test_pagination_clamps() {
        let rows = fixture();
        let q = TableQuery {
            page_size: 3,
            page: 2,
            ..TableQuery::default()
        };
        let page = q.apply(&rows);
        assert_eq!(page.pages, 2);
        assert_eq!(projects(&page), ["billing-eu"]);
        assert_eq!(page.counter(), "Showing 4-4 of 4 rows");

        let page = q.at_page(9).apply(&rows);
        assert_eq!(page.page, 2);

        let empty: Vec<ExitLogRow> = Vec::new();
        let page = TableQuery::default().apply(&empty);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 1);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn test_from_params_normalizes() {
        let q = TableQuery::from_params(
            TableParams {
                page: Some(0),
                project: Some("  ".to_string()),
                script: Some(" nightly ".to_string()),
                ..TableParams::default()
            },
            0,
        );
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 1);
        assert_eq!(q.project, None);
        assert_eq!(q.script.as_deref(), Some("nightly"));
        assert_eq!(q.sort, SortColumn::Timestamp);
        assert_eq!(q.dir, SortDir::Desc);
    }

    #[test]
    fn test_sorted_by_toggles() {
        let q = TableQuery::default().at_page(3);
        let flipped = q.sorted_by(SortColumn::Timestamp);
        assert_eq!(flipped.dir, SortDir::Asc);
        assert_eq!(flipped.page, 1);
        let other = flipped.sorted_by(SortColumn::Project);
        assert_eq!((other.sort, other.dir), (SortColumn::Project, SortDir::Asc));
        assert_eq!(other.sorted_by(SortColumn::Project).dir, SortDir::Desc);
    }

    #[test]
    fn test_query_string_encodes_filters() {
        let q = TableQuery {
            project: Some("a&b c".to_string()),
            ..TableQuery::default()
        };
        assert_eq!(q.to_query_string(), "?sort=timestamp&dir=desc&page=1&project=a%26b+c");
    }
}
