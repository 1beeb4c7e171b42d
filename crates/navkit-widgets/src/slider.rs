#![forbid(unsafe_code)]

//! Two-ended range slider editing.
//!
//! A [`RangeValue`] is a `[min, max]` pair inside fixed bounds, snapped to a
//! step grid. A [`RangeEditor`] is the temporary sub-mode a tree enters when
//! the user activates a slider node: list navigation is suspended and the
//! arrow keys adjust one end of the range.
//!
//! Edits are buffered. Enter hands the new value back for the caller to
//! write to the host; Escape drops the edits and restores the value held on
//! entry.

use std::fmt;

use navkit_core::announce::Announcer;
use navkit_core::event::{KeyCode, KeyEvent};

/// Steps applied by PageUp / PageDown.
pub const PAGE_STEPS: i32 = 10;

/// How slider values are spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    /// Plain number, up to two decimals (`3`, `0.25`).
    #[default]
    Number,
    /// Fraction shown as a whole percentage (`0.05` → `5%`).
    Percent,
}

impl ValueFormat {
    /// Render `value` for speech.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Percent => format!("{:.0}%", value * 100.0),
            Self::Number => {
                let text = format!("{value:.2}");
                let text = text.trim_end_matches('0').trim_end_matches('.');
                if text == "-0" {
                    "0".to_string()
                } else {
                    text.to_string()
                }
            }
        }
    }
}

/// Which end of a range is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RangeEnd {
    /// The lower end.
    #[default]
    Min,
    /// The upper end.
    Max,
}

impl RangeEnd {
    /// The other end.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Min => Self::Max,
            Self::Max => Self::Min,
        }
    }

    /// Spoken name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Min => "Minimum",
            Self::Max => "Maximum",
        }
    }
}

/// A `[min, max]` selection inside `[lower, upper]`.
///
/// Invariant: `lower <= min <= max <= upper`, and both ends lie on the step
/// grid anchored at `lower` (or on `upper`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeValue {
    min: f64,
    max: f64,
    lower: f64,
    upper: f64,
    step: f64,
    format: ValueFormat,
}

impl RangeValue {
    /// The full range `[lower, upper]` with the given step.
    ///
    /// Reversed bounds are swapped. A non-positive or non-finite step falls
    /// back to one hundredth of the span (or 1 for an empty span).
    #[must_use]
    pub fn new(lower: f64, upper: f64, step: f64) -> Self {
        let (lower, upper) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
        let step = if step.is_finite() && step > 0.0 {
            step
        } else if upper > lower {
            (upper - lower) / 100.0
        } else {
            1.0
        };
        Self {
            min: lower,
            max: upper,
            lower,
            upper,
            step,
            format: ValueFormat::Number,
        }
    }

    /// Set the current ends, snapped and clamped into the invariant.
    #[must_use]
    pub fn with_values(mut self, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min = self.snap(min);
        self.max = self.snap(max).max(self.min);
        self
    }

    /// Set how values are spoken.
    #[must_use]
    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    /// Current lower end.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Current upper end.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Fixed bounds `(lower, upper)`.
    #[must_use]
    pub const fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    /// Step size.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Value of one end.
    #[must_use]
    pub const fn get(&self, end: RangeEnd) -> f64 {
        match end {
            RangeEnd::Min => self.min,
            RangeEnd::Max => self.max,
        }
    }

    /// Move one end by `steps` grid steps.
    ///
    /// The minimum stops at the maximum and at `lower`; the maximum stops at
    /// the minimum and at `upper`. Returns whether the value changed.
    pub fn adjust(&mut self, end: RangeEnd, steps: i32) -> bool {
        let before = *self;
        match end {
            RangeEnd::Min => {
                let target = self.snap(self.min + f64::from(steps) * self.step);
                self.min = target.min(self.max);
            }
            RangeEnd::Max => {
                let target = self.snap(self.max + f64::from(steps) * self.step);
                self.max = target.max(self.min);
            }
        }
        *self != before
    }

    /// Spoken form of one end.
    #[must_use]
    pub fn format_end(&self, end: RangeEnd) -> String {
        self.format.format(self.get(end))
    }

    fn snap(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.lower;
        }
        let steps = ((value - self.lower) / self.step).round();
        (self.lower + steps * self.step).clamp(self.lower, self.upper)
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.format.format(self.min),
            self.format.format(self.max)
        )
    }
}

/// Outcome of a key in range-editing mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeResponse {
    /// The key has no meaning here; it is still swallowed by the caller.
    Ignored,
    /// One end moved or the edited end switched.
    Adjusted,
    /// Enter: write this value to the host.
    Commit(RangeValue),
    /// Escape: edits dropped, entry value restored.
    Cancel(RangeValue),
}

/// Buffered editing of a [`RangeValue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeEditor {
    value: RangeValue,
    original: RangeValue,
    end: RangeEnd,
}

impl RangeEditor {
    /// Start editing `value`, minimum first.
    #[must_use]
    pub fn new(value: RangeValue) -> Self {
        Self {
            value,
            original: value,
            end: RangeEnd::Min,
        }
    }

    /// The value with edits applied.
    #[must_use]
    pub const fn value(&self) -> RangeValue {
        self.value
    }

    /// The value held on entry.
    #[must_use]
    pub const fn original(&self) -> RangeValue {
        self.original
    }

    /// The end currently being edited.
    #[must_use]
    pub const fn editing(&self) -> RangeEnd {
        self.end
    }

    /// Announcement for entering the sub-mode.
    #[must_use]
    pub fn describe_entry(&self, label: &str) -> String {
        format!(
            "Editing {label}, {}. {} {}",
            self.value,
            self.end.label(),
            self.value.format_end(self.end)
        )
    }

    /// Move the edited end and announce it.
    pub fn adjust(&mut self, steps: i32, announcer: &mut Announcer) {
        self.value.adjust(self.end, steps);
        self.announce_end(announcer);
    }

    /// Switch to `end` and announce it.
    pub fn switch_to(&mut self, end: RangeEnd, announcer: &mut Announcer) {
        self.end = end;
        self.announce_end(announcer);
    }

    /// Route a key-down event.
    pub fn handle_key(&mut self, key: &KeyEvent, announcer: &mut Announcer) -> RangeResponse {
        if !key.is_down() {
            return RangeResponse::Ignored;
        }
        match key.code {
            KeyCode::Left => self.adjust(-1, announcer),
            KeyCode::Right => self.adjust(1, announcer),
            KeyCode::PageDown => self.adjust(-PAGE_STEPS, announcer),
            KeyCode::PageUp => self.adjust(PAGE_STEPS, announcer),
            KeyCode::Up | KeyCode::Down => self.switch_to(self.end.other(), announcer),
            KeyCode::Enter => return RangeResponse::Commit(self.value),
            KeyCode::Escape => {
                self.value = self.original;
                return RangeResponse::Cancel(self.original);
            }
            _ => return RangeResponse::Ignored,
        }
        RangeResponse::Adjusted
    }

    fn announce_end(&self, announcer: &mut Announcer) {
        announcer.announce(format!(
            "{} {}",
            self.end.label(),
            self.value.format_end(self.end)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> RangeValue {
        RangeValue::new(0.0, 1.0, 0.05).with_format(ValueFormat::Percent)
    }

    #[test]
    fn one_increase_moves_min_one_step() {
        let mut editor = RangeEditor::new(unit());
        let mut announcer = Announcer::new();
        assert_eq!(
            editor.handle_key(&KeyEvent::new(KeyCode::Right), &mut announcer),
            RangeResponse::Adjusted
        );
        assert!((editor.value().min() - 0.05).abs() < 1e-9);
        assert_eq!(announcer.last(), Some("Minimum 5%"));
    }

    #[test]
    fn min_never_crosses_max() {
        let mut value = unit().with_values(0.0, 0.5);
        for _ in 0..40 {
            value.adjust(RangeEnd::Min, 1);
        }
        assert!((value.min() - 0.5).abs() < 1e-9);
        assert!((value.max() - 0.5).abs() < 1e-9);
        assert!(!value.adjust(RangeEnd::Min, 1));
    }

    #[test]
    fn max_never_crosses_min() {
        let mut value = unit().with_values(0.3, 1.0);
        value.adjust(RangeEnd::Max, -100);
        assert!((value.max() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn ends_stay_in_bounds() {
        let mut value = unit();
        value.adjust(RangeEnd::Min, -5);
        value.adjust(RangeEnd::Max, 5);
        assert_eq!(value.min(), 0.0);
        assert_eq!(value.max(), 1.0);
    }

    #[test]
    fn with_values_snaps_and_orders() {
        let value = RangeValue::new(0.0, 10.0, 1.0).with_values(7.4, 2.6);
        assert_eq!(value.min(), 3.0);
        assert_eq!(value.max(), 7.0);
        let value = RangeValue::new(0.0, 10.0, 1.0).with_values(-4.0, 40.0);
        assert_eq!((value.min(), value.max()), (0.0, 10.0));
    }

    #[test]
    fn bad_construction_is_repaired() {
        let value = RangeValue::new(10.0, 0.0, -1.0);
        assert_eq!(value.bounds(), (0.0, 10.0));
        assert!((value.step() - 0.1).abs() < 1e-12);
        let point = RangeValue::new(3.0, 3.0, f64::NAN);
        assert_eq!(point.step(), 1.0);
    }

    #[test]
    fn page_keys_move_ten_steps() {
        let mut editor = RangeEditor::new(RangeValue::new(0.0, 100.0, 1.0));
        let mut announcer = Announcer::new();
        editor.switch_to(RangeEnd::Max, &mut announcer);
        editor.handle_key(&KeyEvent::new(KeyCode::PageDown), &mut announcer);
        assert_eq!(editor.value().max(), 90.0);
        assert_eq!(announcer.last(), Some("Maximum 90"));
    }

    #[test]
    fn up_down_switch_edited_end() {
        let mut editor = RangeEditor::new(unit());
        let mut announcer = Announcer::new();
        assert_eq!(editor.editing(), RangeEnd::Min);
        editor.handle_key(&KeyEvent::new(KeyCode::Down), &mut announcer);
        assert_eq!(editor.editing(), RangeEnd::Max);
        assert_eq!(announcer.last(), Some("Maximum 100%"));
        editor.handle_key(&KeyEvent::new(KeyCode::Up), &mut announcer);
        assert_eq!(editor.editing(), RangeEnd::Min);
    }

    #[test]
    fn escape_restores_entry_value() {
        let start = unit().with_values(0.2, 0.8);
        let mut editor = RangeEditor::new(start);
        let mut announcer = Announcer::new();
        editor.handle_key(&KeyEvent::new(KeyCode::Right), &mut announcer);
        assert_ne!(editor.value(), start);
        assert_eq!(
            editor.handle_key(&KeyEvent::new(KeyCode::Escape), &mut announcer),
            RangeResponse::Cancel(start)
        );
        assert_eq!(editor.value(), start);
    }

    #[test]
    fn enter_commits_edited_value() {
        let mut editor = RangeEditor::new(unit());
        let mut announcer = Announcer::new();
        editor.handle_key(&KeyEvent::new(KeyCode::Right), &mut announcer);
        editor.handle_key(&KeyEvent::new(KeyCode::Right), &mut announcer);
        match editor.handle_key(&KeyEvent::new(KeyCode::Enter), &mut announcer) {
            RangeResponse::Commit(value) => assert!((value.min() - 0.1).abs() < 1e-9),
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn formats() {
        assert_eq!(ValueFormat::Number.format(3.0), "3");
        assert_eq!(ValueFormat::Number.format(0.25), "0.25");
        assert_eq!(ValueFormat::Number.format(2.5), "2.5");
        assert_eq!(ValueFormat::Percent.format(0.35), "35%");
        assert_eq!(unit().with_values(0.1, 0.9).to_string(), "10% to 90%");
    }

    #[test]
    fn entry_description() {
        let editor = RangeEditor::new(unit());
        assert_eq!(
            editor.describe_entry("Hit points"),
            "Editing Hit points, 0% to 100%. Minimum 0%"
        );
    }
}
