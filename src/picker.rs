use crate::calendar::{clamp_year, supported_years};
use crate::gate::HydrationGate;
use crate::year_state::YearSelection;
use serde::Serialize;
use std::ops::Range;
use tokio::sync::Mutex;

pub const WINDOW_SIZE: i32 = 9;

/// First year of the fixed 9-year block containing `year`. Blocks are aligned
/// to multiples of 9, not centered on the selection. Years outside the
/// calendar are clamped first.
pub fn window_start(year: i32) -> i32 {
    let year = clamp_year(year);
    year - year.rem_euclid(WINDOW_SIZE)
}

/// Picks `year`: the selection (and its store) first, then the window. The
/// picker lock is only taken once the selection has settled.
pub async fn select_year(picker: &Mutex<YearPicker>, selection: &YearSelection, year: i32) {
    selection.set_selected_year(year).await;
    picker.lock().await.show_year(selection.selected_year());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCell {
    pub year: i32,
    pub selected: bool,
    /// Real calendar year, flagged only when it is not also the selection.
    pub today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PickerView {
    /// Non-interactive first paint showing the real calendar year.
    Placeholder { year: i32 },
    Interactive {
        selected: i32,
        is_open: bool,
        range_label: String,
        cells: Vec<YearCell>,
    },
}

#[derive(Debug, Clone)]
pub struct YearPicker {
    window_start: i32,
    is_open: bool,
    current_year: i32,
    followed: i32,
}

impl YearPicker {
    pub fn new(selected: i32, current_year: i32) -> Self {
        Self {
            window_start: window_start(selected),
            is_open: false,
            current_year,
            followed: selected,
        }
    }

    pub fn window_start(&self) -> i32 {
        self.window_start
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Pointer interaction outside the control.
    pub fn dismiss_outside(&mut self) {
        self.close();
    }

    /// Stops at the first window of the calendar.
    pub fn previous_page(&mut self) {
        let first = window_start(*supported_years().start());
        self.window_start = (self.window_start - WINDOW_SIZE).max(first);
    }

    /// Stops at the last window of the calendar.
    pub fn next_page(&mut self) {
        let last = window_start(*supported_years().end());
        self.window_start = (self.window_start + WINDOW_SIZE).min(last);
    }

    /// Realigns on a year picked from the grid. Leaves the dropdown open.
    pub fn show_year(&mut self, year: i32) {
        self.window_start = window_start(year);
        self.followed = year;
    }

    /// Re-aligns the window when the selection moved without going through
    /// this picker. Paging is preserved while the selection is unchanged.
    pub fn follow_selection(&mut self, selected: i32) {
        if selected != self.followed {
            self.window_start = window_start(selected);
            self.followed = selected;
        }
    }

    pub fn years(&self) -> Range<i32> {
        self.window_start..self.window_start + WINDOW_SIZE
    }

    pub fn view(&self, selected: i32, gate: &HydrationGate) -> PickerView {
        if !gate.is_open() {
            return PickerView::Placeholder {
                year: self.current_year,
            };
        }

        let cells = self
            .years()
            .map(|year| YearCell {
                year,
                selected: year == selected,
                today: year == self.current_year && year != selected,
            })
            .collect();

        PickerView::Interactive {
            selected,
            is_open: self.is_open,
            range_label: format!(
                "{} - {}",
                self.window_start,
                self.window_start + WINDOW_SIZE - 1
            ),
            cells,
        }
    }
}
