use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Tag row as stored in the data file; scoped to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(flatten)]
    pub tag: Tag,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagLink {
    pub tag: Tag,
}

/// Task row in the shape the data source hands out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub week_number: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub tags: Vec<TagLink>,
    pub year: i32,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagUsage {
    pub tag: Tag,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthStat {
    pub month: u32,
    pub name: String,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub completion_rate: u32,
    pub tag_usage: Vec<TagUsage>,
    pub most_active_week: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub completion_rate: u32,
    pub best_month: Option<String>,
    pub most_productive_month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub year: i32,
    pub months: Vec<MonthStat>,
    pub summary: YearSummary,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub year: i32,
    pub selected_year: i32,
    pub months: Vec<MonthStat>,
    pub summary: YearSummary,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct YearResponse {
    pub selected_year: i32,
    pub current_year: i32,
    pub share_path: String,
    /// What the preference store holds, absent if unreadable.
    pub persisted_year: Option<i32>,
    /// The last `?year=` value seen, absent if malformed.
    pub location_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct YearRequest {
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectYearForm {
    pub year: String,
}
