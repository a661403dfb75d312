use crate::calendar::MONTH_NAMES;
use crate::models::{MonthStat, Tag, TagUsage, TaskRecord, YearSummary};
use indexmap::IndexMap;
use std::collections::HashMap;

const TOP_TAGS: usize = 3;

/// Rounded percentage, halves rounding up (2 of 3 is 67).
pub fn completion_rate(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (completed, total) = (u64::from(completed), u64::from(total));
    ((200 * completed + total) / (2 * total)) as u32
}

/// Groups `tasks` into twelve month buckets via `month_of(week_number, year)`
/// and computes per-month statistics.
///
/// Ties in tag counts and week counts go to whichever was seen first while
/// walking the bucket in task order. Tag ids missing from `tags` are counted
/// and then dropped before the top three are taken.
pub fn build_month_stats<F>(tasks: &[TaskRecord], tags: &[Tag], year: i32, month_of: F) -> Vec<MonthStat>
where
    F: Fn(u32, i32) -> u32,
{
    let mut buckets: Vec<Vec<&TaskRecord>> = vec![Vec::new(); MONTH_NAMES.len()];
    for task in tasks {
        let month = month_of(task.week_number, year).min(11) as usize;
        buckets[month].push(task);
    }

    let tag_index: HashMap<&str, &Tag> = tags.iter().map(|tag| (tag.id.as_str(), tag)).collect();

    buckets
        .iter()
        .zip(MONTH_NAMES)
        .enumerate()
        .map(|(month, (bucket, name))| {
            let total_tasks = bucket.len() as u32;
            let completed_tasks = bucket.iter().filter(|task| task.completed).count() as u32;

            MonthStat {
                month: month as u32,
                name: name.to_string(),
                total_tasks,
                completed_tasks,
                completion_rate: completion_rate(completed_tasks, total_tasks),
                tag_usage: top_tags(bucket, &tag_index),
                most_active_week: most_active_week(bucket),
            }
        })
        .collect()
}

fn top_tags(bucket: &[&TaskRecord], tag_index: &HashMap<&str, &Tag>) -> Vec<TagUsage> {
    let mut counts: IndexMap<&str, u32> = IndexMap::new();
    for task in bucket {
        for link in &task.tags {
            *counts.entry(link.tag.id.as_str()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(&str, u32)> = counts.into_iter().collect();
    // Stable, so equal counts keep first-seen order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .filter_map(|(id, count)| {
            tag_index.get(id).map(|tag| TagUsage {
                tag: (*tag).clone(),
                count,
            })
        })
        .take(TOP_TAGS)
        .collect()
}

fn most_active_week(bucket: &[&TaskRecord]) -> Option<u32> {
    let mut counts: IndexMap<u32, u32> = IndexMap::new();
    for task in bucket {
        *counts.entry(task.week_number).or_default() += 1;
    }

    let mut best: Option<(u32, u32)> = None;
    for (week, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((week, count));
        }
    }
    best.map(|(week, _)| week)
}

pub fn summarize(months: &[MonthStat]) -> YearSummary {
    let total_tasks: u32 = months.iter().map(|month| month.total_tasks).sum();
    let completed_tasks: u32 = months.iter().map(|month| month.completed_tasks).sum();

    YearSummary {
        total_tasks,
        completed_tasks,
        completion_rate: completion_rate(completed_tasks, total_tasks),
        best_month: first_max_by_key(months, |month| month.completion_rate),
        most_productive_month: first_max_by_key(months, |month| month.completed_tasks),
    }
}

fn first_max_by_key(months: &[MonthStat], key: impl Fn(&MonthStat) -> u32) -> Option<String> {
    let mut best: Option<&MonthStat> = None;
    for month in months {
        if best.is_none_or(|top| key(month) > key(top)) {
            best = Some(month);
        }
    }
    best.map(|month| month.name.clone())
}
