use crate::session::DayRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCell {
    Selected,
    InRange,
    Plain,
}

/// Two-click day range selection over `1..=max_day`.
///
/// The first click picks a single day and waits for an end day. A second
/// click on or after the start closes the range; a click before the start
/// restarts the range there and keeps waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRangePicker {
    max_day: u32,
    start: u32,
    end: u32,
    awaiting_end: bool,
}

impl DayRangePicker {
    pub fn new(max_day: u32) -> Self {
        Self {
            max_day,
            start: 1,
            end: 1,
            awaiting_end: false,
        }
    }

    pub fn max_day(&self) -> u32 {
        self.max_day
    }

    pub fn range(&self) -> DayRange {
        DayRange::new(self.start, self.end)
    }

    pub fn awaiting_end(&self) -> bool {
        self.awaiting_end
    }

    /// Days outside the grid are ignored.
    pub fn click(&mut self, day: u32) {
        if day == 0 || day > self.max_day {
            return;
        }
        if !self.awaiting_end || day < self.start {
            self.start = day;
            self.end = day;
            self.awaiting_end = true;
        } else {
            self.end = day;
            self.awaiting_end = false;
        }
    }

    pub fn cell(&self, day: u32) -> DayCell {
        if day == self.start || day == self.end {
            DayCell::Selected
        } else if day > self.start && day < self.end {
            DayCell::InRange
        } else {
            DayCell::Plain
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (u32, DayCell)> + '_ {
        (1..=self.max_day).map(|d| (d, self.cell(d)))
    }

    pub fn label(&self) -> String {
        self.range().to_string()
    }
}
