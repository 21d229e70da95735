//! HTML rendering of grouped records.

use reqwest::Url;

use super::grouping::{products, Grouped, ReportCounts};
use crate::config::SourceUrls;
use crate::domain::{Result, Source, Status, TriageError, UnifiedRecord};

const PAGE_TEMPLATE: &str = include_str!("../../templates/index.html");
const ISSUE_BODY_TEMPLATE: &str = include_str!("../../templates/issue-body.md");

const TITLE: &str = "Disabled/flaky/slow web-platform-tests Report";
const THEAD: &str = "<tr><th>Path<th>Engines<th>Results<th>Bugs<th>New issue</tr>";
const NEW_ISSUE_URL: &str = "https://github.com/web-platform-tests/wpt/issues/new";

/// Bug host prefixes shortened in link labels.
const BUG_LABELS: [(&str, &str); 4] = [
    ("bugzilla.mozilla.org/show_bug.cgi?id=", "mozilla #"),
    ("crbug.com/", "chromium #"),
    ("webkit.org/b/", "webkit #"),
    ("github.com/web-platform-tests/wpt/issues/", "web-platform-tests #"),
];

pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitute `{{name}}` placeholders in one pass; an unknown name is an error.
///
/// Substituted values are never rescanned.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| TriageError::Template {
            placeholder: after.chars().take(32).collect(),
        })?;
        let name = &after[..end];
        let value = vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| TriageError::Template {
                placeholder: name.to_string(),
            })?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// `<a>` for a scheme-less bug reference, with a shortened label.
pub fn bug_link(bug: &str) -> String {
    let label = BUG_LABELS
        .iter()
        .fold(bug.to_string(), |label, (from, to)| label.replace(from, to));
    format!(
        "<a href='https://{}'>{}</a>",
        html_escape(bug),
        html_escape(&label)
    )
}

fn dashboards_html(path: &str) -> String {
    let path = html_escape(path);
    format!(
        "Test result history for: \
         <a href='https://test-results.appspot.com/dashboards/flakiness_dashboard.html#testType=webkit_layout_tests&amp;tests=external/wpt{path}'>chromium</a>, \
         <a href='https://webkit-test-results.webkit.org/dashboards/flakiness_dashboard.html#tests=imported/w3c/web-platform-tests{path}'>webkit</a>"
    )
}

fn dashboards_markdown(path: &str) -> String {
    format!(
        "Test result history for: \
         [chromium](https://test-results.appspot.com/dashboards/flakiness_dashboard.html#testType=webkit_layout_tests&tests=external/wpt{path}), \
         [webkit](https://webkit-test-results.webkit.org/dashboards/flakiness_dashboard.html#tests=imported/w3c/web-platform-tests{path})"
    )
}

fn path_cell(path: &str) -> String {
    format!(
        "<a href='https://wpt.fyi{0}'>{0}</a><br><small>{1}</small>",
        html_escape(path),
        dashboards_html(path)
    )
}

fn results_of(record: &UnifiedRecord, products: &[Source]) -> Vec<String> {
    products
        .iter()
        .filter_map(|s| record.get(*s).and_then(|o| o.results.clone()))
        .collect()
}

/// Bugs of the listed products, then the issue tracker's.
fn bugs_of(record: &UnifiedRecord, products: &[Source]) -> Vec<String> {
    let mut bugs: Vec<String> = products
        .iter()
        .filter(|s| **s != Source::WebPlatformTests)
        .filter_map(|s| record.get(*s).and_then(|o| o.bug.clone()))
        .collect();
    if let Some(bug) = record
        .get(Source::WebPlatformTests)
        .and_then(|o| o.bug.clone())
    {
        bugs.push(bug);
    }
    bugs
}

/// Distinct statuses of the listed products, first-seen order, `/`-joined.
fn short_status(record: &UnifiedRecord, products: &[Source]) -> String {
    let mut seen: Vec<Status> = Vec::new();
    for status in products
        .iter()
        .filter_map(|s| record.get(*s).map(|o| o.status))
        .filter(|s| *s != Status::Absent)
    {
        if !seen.contains(&status) {
            seen.push(status);
        }
    }
    seen.iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join("/")
}

fn product_names(products: &[Source]) -> Vec<&'static str> {
    products.iter().map(|s| s.name()).collect()
}

/// Pre-filled "new issue" button, or `None` when the tracker already has one.
pub fn new_issue_link(record: &UnifiedRecord) -> Result<Option<String>> {
    if record.has(Source::WebPlatformTests) {
        return Ok(None);
    }
    let products = products(record);
    let names = product_names(&products).join(" ");

    let title = format!(
        "{} is {} in {}",
        record.path,
        short_status(record, &products),
        names
    );
    let bug_urls: Vec<String> = bugs_of(record, &products)
        .iter()
        .map(|b| format!("https://{b}"))
        .collect();
    let dashboards = dashboards_markdown(&record.path);
    let results = results_of(record, &products).join(" ");
    let bugs = bug_urls.join(" ");
    let body = fill_template(
        ISSUE_BODY_TEMPLATE,
        &[
            ("path", record.path.as_str()),
            ("products", names.as_str()),
            ("results", results.as_str()),
            ("bugs", bugs.as_str()),
            ("dashboards", dashboards.as_str()),
        ],
    )?;

    let url = Url::parse_with_params(
        NEW_ISSUE_URL,
        &[
            ("title", title.as_str()),
            ("body", body.as_str()),
            ("labels", "flaky"),
        ],
    )
    .map_err(|e| TriageError::Render(e.to_string()))?;

    Ok(Some(format!(
        "<a href=\"{}\" class=\"gh-button\">New issue</a>",
        html_escape(url.as_str())
    )))
}

/// One `<tr>` of the report.
pub fn render_row(record: &UnifiedRecord) -> Result<String> {
    let products = products(record);
    let results: Vec<String> = results_of(record, &products)
        .iter()
        .map(|r| html_escape(r))
        .collect();
    let bugs: Vec<String> = bugs_of(record, &products)
        .iter()
        .map(|b| bug_link(b))
        .collect();
    let new_issue = new_issue_link(record)?.unwrap_or_default();

    Ok(format!(
        "<tr><td>{}<td> {}<td> {}<td> {}<td> {}</tr>",
        path_cell(&record.path),
        product_names(&products).join("<br> "),
        results.join("<br> "),
        bugs.join("<br> "),
        new_issue
    ))
}

fn render_rows(records: &[&UnifiedRecord]) -> Result<String> {
    let rows = records
        .iter()
        .map(|r| render_row(r))
        .collect::<Result<Vec<_>>>()?;
    Ok(rows.join("\n"))
}

/// Render the full report page.
pub fn render_page(grouped: &Grouped<'_>, urls: &SourceUrls, date: &str) -> Result<String> {
    let counts: ReportCounts = grouped.counts();

    let rows4 = render_rows(&grouped.in4)?;
    let rows3 = render_rows(&grouped.in3)?;
    let rows2 = render_rows(&grouped.in2)?;
    let flaky_rows = render_rows(&grouped.flaky)?;
    let slow_rows = render_rows(&grouped.slow)?;
    let timeout_rows = render_rows(&grouped.timeout)?;
    let disabled_rows = render_rows(&grouped.disabled)?;

    let mozilla_url = html_escape(&urls.mozilla_disabled);
    let chromium_url = html_escape(&urls.chromium_expectations);
    let never_fix_url = html_escape(&urls.chromium_never_fix);
    let slow_url = html_escape(&urls.chromium_slow);
    let webkit_url = html_escape(&urls.webkit_expectations);
    let wpt_url = html_escape(&urls.wpt_issues_html);

    let num4 = counts.in4.to_string();
    let num3 = counts.in3.to_string();
    let num2 = counts.in2.to_string();
    let num1 = counts.in1().to_string();
    let flaky_num = counts.flaky.to_string();
    let slow_num = counts.slow.to_string();
    let timeout_num = counts.timeout.to_string();
    let disabled_num = counts.disabled.to_string();

    fill_template(
        PAGE_TEMPLATE,
        &[
            ("title", TITLE),
            ("mozillaURL", mozilla_url.as_str()),
            ("chromiumURL", chromium_url.as_str()),
            ("chromiumNeverFixTestsURL", never_fix_url.as_str()),
            ("chromiumSlowTestsURL", slow_url.as_str()),
            ("webkitURL", webkit_url.as_str()),
            ("wptHTMLURL", wpt_url.as_str()),
            ("date", date),
            ("thead", THEAD),
            ("numRows4", num4.as_str()),
            ("rows4", rows4.as_str()),
            ("numRows3", num3.as_str()),
            ("rows3", rows3.as_str()),
            ("numRows2", num2.as_str()),
            ("rows2", rows2.as_str()),
            ("numRows1", num1.as_str()),
            ("flakyNum", flaky_num.as_str()),
            ("flakyRows", flaky_rows.as_str()),
            ("slowNum", slow_num.as_str()),
            ("slowRows", slow_rows.as_str()),
            ("timeoutNum", timeout_num.as_str()),
            ("timeoutRows", timeout_rows.as_str()),
            ("disabledNum", disabled_num.as_str()),
            ("disabledRows", disabled_rows.as_str()),
        ],
    )
}
