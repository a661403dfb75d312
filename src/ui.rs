use crate::models::{MonthStat, YearSummary};
use crate::picker::PickerView;

pub struct DashboardPage<'a> {
    pub heading_year: i32,
    pub stats_year: i32,
    pub picker: &'a PickerView,
    pub months: &'a [MonthStat],
    pub summary: &'a YearSummary,
    pub notice: Option<&'a str>,
    /// Month to highlight, when the stats are for the running year.
    pub current_month: Option<u32>,
}

pub fn render_index(page: &DashboardPage<'_>) -> String {
    let placeholder = matches!(page.picker, PickerView::Placeholder { .. });
    let mut notice = page.notice.map(escape).unwrap_or_default();
    if !placeholder && page.stats_year != page.heading_year && notice.is_empty() {
        notice = format!("Loading {}&hellip;", page.heading_year);
    }

    INDEX_HTML
        .replace("{{YEAR}}", &page.heading_year.to_string())
        .replace("{{PHASE}}", if placeholder { "placeholder" } else { "interactive" })
        .replace("{{PICKER}}", &render_picker(page.picker))
        .replace("{{NOTICE}}", &notice)
        .replace("{{SUMMARY}}", &render_summary(page.summary))
        .replace("{{MONTHS}}", &render_months(page.months, page.current_month))
}

fn render_picker(view: &PickerView) -> String {
    let mut out = String::new();
    match view {
        PickerView::Placeholder { year } => {
            out.push_str(&format!(r#"<button class="picker-button" disabled>{year}</button>"#));
        }
        PickerView::Interactive {
            selected,
            is_open,
            range_label,
            cells,
        } => {
            out.push_str(&format!(
                r#"<form method="post" action="/picker/toggle"><button class="picker-button">{selected}</button></form>"#
            ));
            if !is_open {
                return out;
            }

            out.push_str(
                r#"<form method="post" action="/picker/dismiss" class="backdrop"><button aria-label="Close year picker"></button></form>"#,
            );
            out.push_str(&format!(
                r#"<div class="dropdown"><div class="dropdown-header"><form method="post" action="/picker/previous"><button class="nav" aria-label="Previous years">&lsaquo;</button></form><span>{range_label}</span><form method="post" action="/picker/next"><button class="nav" aria-label="Next years">&rsaquo;</button></form></div><div class="grid">"#
            ));
            for cell in cells {
                let class = match (cell.selected, cell.today) {
                    (true, _) => "year selected",
                    (false, true) => "year today",
                    (false, false) => "year",
                };
                out.push_str(&format!(
                    r#"<form method="post" action="/picker/select"><input type="hidden" name="year" value="{year}"><button class="{class}">{year}</button></form>"#,
                    year = cell.year
                ));
            }
            out.push_str("</div></div>");
        }
    }
    out
}

fn render_summary(summary: &YearSummary) -> String {
    let best = summary.best_month.as_deref().unwrap_or("-");
    let mut out = String::new();
    for (label, value) in [
        ("Total Tasks", summary.total_tasks.to_string()),
        ("Completed", summary.completed_tasks.to_string()),
        ("Completion Rate", format!("{}%", summary.completion_rate)),
        ("Best Month", best.to_string()),
    ] {
        out.push_str(&format!(
            r#"<div class="stat"><span class="label">{label}</span><span class="value">{value}</span></div>"#
        ));
    }
    out
}

fn render_months(months: &[MonthStat], current_month: Option<u32>) -> String {
    let mut out = String::new();
    for month in months {
        let class = match current_month {
            Some(current) if month.month == current => "month current",
            Some(current) if month.month > current => "month upcoming",
            _ => "month",
        };
        out.push_str(&format!(
            r#"<article class="{class}"><h3>{name}</h3><div class="progress-line"><span>{done} / {total} tasks</span><strong>{rate}%</strong></div><div class="bar"><span style="width: {rate}%"></span></div>"#,
            name = month.name,
            done = month.completed_tasks,
            total = month.total_tasks,
            rate = month.completion_rate,
        ));
        if let Some(week) = month.most_active_week {
            out.push_str(&format!(r#"<p class="hint">Most active: Week {week}</p>"#));
        }
        if !month.tag_usage.is_empty() {
            out.push_str(r#"<p class="hint">Top categories:</p><div class="tags">"#);
            for usage in &month.tag_usage {
                out.push_str(&format!(
                    r#"<span class="tag" style="border-color: {color}; color: {color}">{name} ({count})</span>"#,
                    color = escape(&usage.tag.color),
                    name = escape(&usage.tag.name),
                    count = usage.count,
                ));
            }
            out.push_str("</div>");
        }
        if month.total_tasks == 0 {
            out.push_str(r#"<p class="hint empty">No tasks this month</p>"#);
        }
        out.push_str("</article>");
    }
    out
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{YEAR}} Monthly Overview</title>
  <style>
    :root {
      --bg: #f8f3e6;
      --ink: #2b2a28;
      --muted: #8b857d;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1080px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      margin: 0;
      font-family: "Georgia", serif;
    }

    .subtitle,
    .hint {
      margin: 0;
      color: var(--muted);
    }

    .hint {
      font-size: 0.8rem;
    }

    .picker {
      position: relative;
      display: flex;
      align-items: center;
      gap: 6px;
    }

    form {
      margin: 0;
    }

    button {
      appearance: none;
      border: none;
      background: transparent;
      font: inherit;
      cursor: pointer;
    }

    .picker-button {
      font-weight: 600;
      padding: 6px 10px;
      border-radius: 8px;
    }

    .picker-button:disabled {
      cursor: default;
      opacity: 0.7;
    }

    .backdrop button {
      position: fixed;
      inset: 0;
      z-index: 10;
      cursor: default;
    }

    .dropdown {
      position: absolute;
      top: 100%;
      right: 0;
      z-index: 20;
      min-width: 280px;
      margin-top: 4px;
      padding: 12px;
      background: white;
      border-radius: 12px;
      box-shadow: var(--shadow);
    }

    .dropdown-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      margin-bottom: 12px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 4px;
    }

    .year {
      width: 100%;
      height: 40px;
      border-radius: 8px;
    }

    .year.selected {
      background: var(--accent-2);
      color: white;
    }

    .year.today {
      box-shadow: inset 0 0 0 1px var(--accent);
    }

    .notice {
      margin: 0;
      color: var(--accent);
    }

    .notice:empty {
      display: none;
    }

    .panel,
    .months {
      display: grid;
      gap: 16px;
    }

    .panel {
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
    }

    .months {
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
    }

    .stat,
    .month {
      background: var(--card);
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .month h3 {
      margin: 0;
    }

    .month.current {
      border-color: var(--accent);
    }

    .month.upcoming {
      opacity: 0.6;
    }

    .progress-line {
      display: flex;
      justify-content: space-between;
      font-size: 0.9rem;
    }

    .bar {
      height: 8px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      overflow: hidden;
    }

    .bar span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    .tags {
      display: flex;
      flex-wrap: wrap;
      gap: 4px;
    }

    .tag {
      font-size: 0.75rem;
      border: 1px solid;
      border-radius: 999px;
      padding: 2px 8px;
    }

    .empty {
      font-style: italic;
    }
  </style>
</head>
<body data-phase="{{PHASE}}">
  <main class="app">
    <header>
      <div>
        <h1>{{YEAR}} Monthly Overview</h1>
        <p class="subtitle">{{YEAR}} progress by month</p>
      </div>
      <div class="picker">
        <span class="hint">Year:</span>
        {{PICKER}}
      </div>
    </header>
    <p class="notice">{{NOTICE}}</p>
    <section class="panel">{{SUMMARY}}</section>
    <section class="months">{{MONTHS}}</section>
  </main>
  <script>
    if (document.body.dataset.phase === 'placeholder') {
      window.location.replace(window.location.href);
    }
  </script>
</body>
</html>
"#;
