use crate::calendar::{current_month, parse_year, supported_years};
use crate::errors::AppError;
use crate::models::{
    OverviewResponse, SelectYearForm, StatsResponse, YearQuery, YearRequest, YearResponse,
};
use crate::overview::fetch_month_stats;
use crate::picker::{self, PickerView, YearPicker};
use crate::state::AppState;
use crate::stats::summarize;
use crate::ui::{render_index, DashboardPage};
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use tracing::info;

pub async fn index(State(state): State<AppState>, Query(query): Query<YearQuery>) -> Html<String> {
    state.selection.sync_location(query.year.as_deref()).await;
    let selected = state.selection.selected_year();

    let picker_view = {
        let mut picker = state.picker.lock().await;
        picker.follow_selection(selected);
        picker.view(selected, &state.gate)
    };
    let first_paint = matches!(picker_view, PickerView::Placeholder { .. });

    let overview = state.overview.lock().await;
    let current_year = state.selection.current_year();
    let html = render_index(&DashboardPage {
        heading_year: if first_paint { overview.year() } else { selected },
        stats_year: overview.year(),
        picker: &picker_view,
        months: overview.months(),
        summary: overview.summary(),
        notice: overview.notice(),
        current_month: (overview.year() == current_year).then(current_month),
    });
    drop(overview);

    if first_paint && state.gate.open() {
        info!("first paint served; dashboard is interactive");
    }
    Html(html)
}

pub async fn picker_toggle(State(state): State<AppState>) -> Redirect {
    update_picker(&state, YearPicker::toggle).await
}

pub async fn picker_previous(State(state): State<AppState>) -> Redirect {
    update_picker(&state, YearPicker::previous_page).await
}

pub async fn picker_next(State(state): State<AppState>) -> Redirect {
    update_picker(&state, YearPicker::next_page).await
}

pub async fn picker_dismiss(State(state): State<AppState>) -> Redirect {
    update_picker(&state, YearPicker::dismiss_outside).await
}

pub async fn picker_select(
    State(state): State<AppState>,
    Form(form): Form<SelectYearForm>,
) -> Result<Redirect, AppError> {
    let year = parse_year(&form.year).ok_or_else(invalid_year)?;
    picker::select_year(&state.picker, &state.selection, year).await;
    Ok(Redirect::to(&state.selection.share_path()))
}

async fn update_picker(state: &AppState, action: fn(&mut YearPicker)) -> Redirect {
    action(&mut *state.picker.lock().await);
    Redirect::to(&state.selection.share_path())
}

pub async fn get_picker(State(state): State<AppState>) -> Json<PickerView> {
    let selected = state.selection.selected_year();
    let picker = state.picker.lock().await;
    Json(picker.view(selected, &state.gate))
}

pub async fn get_year(State(state): State<AppState>) -> Json<YearResponse> {
    Json(year_response(&state))
}

pub async fn set_year(
    State(state): State<AppState>,
    Json(payload): Json<YearRequest>,
) -> Result<Json<YearResponse>, AppError> {
    if !supported_years().contains(&payload.year) {
        return Err(invalid_year());
    }
    state.selection.set_selected_year(payload.year).await;
    state.picker.lock().await.follow_selection(state.selection.selected_year());
    Ok(Json(year_response(&state)))
}

fn year_response(state: &AppState) -> YearResponse {
    YearResponse {
        selected_year: state.selection.selected_year(),
        current_year: state.selection.current_year(),
        share_path: state.selection.share_path(),
        persisted_year: state.selection.persisted_year(),
        location_year: state.selection.location_year(),
    }
}

fn invalid_year() -> AppError {
    AppError::bad_request("year must be an integer within the supported calendar")
}

pub async fn get_overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    let overview = state.overview.lock().await;
    Json(OverviewResponse {
        year: overview.year(),
        selected_year: state.selection.selected_year(),
        months: overview.months().to_vec(),
        summary: overview.summary().clone(),
        notice: overview.notice().map(str::to_string),
    })
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let year = match query.year.as_deref() {
        Some(raw) => parse_year(raw).ok_or_else(invalid_year)?,
        None => state.selection.selected_year(),
    };

    let months = fetch_month_stats(&*state.source, &state.user_id, year).await?;
    let summary = summarize(&months);
    Ok(Json(StatsResponse {
        year,
        months,
        summary,
    }))
}
