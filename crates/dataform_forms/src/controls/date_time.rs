use crate::control::{Control, ControlBase, input_set_enabled};
use crate::error::FormResult;
use crate::events::EventKind;
use crate::registry::BuildContext;
use crate::structure::ControlDef;
use crate::surface::Part;
use chrono::NaiveDate;
use serde_json::{Value, json};

const DISPLAY_FORMAT: &str = "%d.%m.%Y";

/// Parses `YYYY-MM-DD` or `DD.MM.YYYY`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, DISPLAY_FORMAT))
        .ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Date in a structure field: a date string, or `-1`/null for none.
fn date_field(value: Option<&Value>) -> Option<NaiveDate> {
    value.and_then(Value::as_str).and_then(parse_date)
}

#[derive(Debug)]
pub struct DateField {
    base: ControlBase,
    date: Option<NaiveDate>,
    minimum: Option<NaiveDate>,
    maximum: Option<NaiveDate>,
}

impl DateField {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        let mut field = Self {
            base: ControlBase::new(ctx.scope(), def)?,
            date: None,
            minimum: date_field(def.minimum.as_ref()),
            maximum: date_field(def.maximum.as_ref()),
        };
        field.set_value(date_field(def.value.as_ref()));
        Ok(field)
    }

    pub fn value(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Programmatic selection. A date outside the bounds is rejected.
    pub fn set_value(&mut self, date: Option<NaiveDate>) -> bool {
        if date.is_some_and(|d| !self.in_range(d)) {
            return false;
        }
        if date != self.date {
            self.date = date;
            self.base.render(Part::Input, self.json()["date"].clone());
        }
        true
    }

    /// User pick in the calendar.
    pub fn pick(&mut self, date: Option<NaiveDate>) {
        if !self.base.enabled() || date == self.date {
            return;
        }
        if self.set_value(date) {
            self.base.raise(EventKind::DateChanged { date });
        }
    }

    fn in_range(&self, date: NaiveDate) -> bool {
        self.minimum.is_none_or(|min| date >= min) && self.maximum.is_none_or(|max| date <= max)
    }
}

impl Control for DateField {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn set_enabled(&mut self, enabled: bool) {
        input_set_enabled(&mut self.base, enabled);
    }

    fn json(&self) -> Value {
        let date = self.date.map(format_date).unwrap_or_default();
        json!({ "date": date })
    }
}

/// Hour and minute pickers.
#[derive(Debug)]
pub struct TimeField {
    base: ControlBase,
    hours: u32,
    minutes: u32,
}

impl TimeField {
    pub fn new(ctx: &mut BuildContext<'_>, def: &ControlDef) -> FormResult<Self> {
        let wrap = |v: Option<i64>, modulus: i64| match v {
            Some(v) if v >= 0 => (v % modulus) as u32,
            _ => 0,
        };
        Ok(Self {
            base: ControlBase::new(ctx.scope(), def)?,
            hours: wrap(def.hours, 24),
            minutes: wrap(def.minutes, 60),
        })
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn set_hours(&mut self, hours: i64) {
        self.hours = hours.rem_euclid(24) as u32;
        self.render();
    }

    pub fn set_minutes(&mut self, minutes: i64) {
        self.minutes = minutes.rem_euclid(60) as u32;
        self.render();
    }

    /// User pick in either drop-down.
    pub fn pick(&mut self, hours: u32, minutes: u32) {
        let (hours, minutes) = (hours % 24, minutes % 60);
        if !self.base.enabled() || (hours, minutes) == (self.hours, self.minutes) {
            return;
        }
        self.hours = hours;
        self.minutes = minutes;
        self.render();
        self.base.raise(EventKind::TimeChanged { hours, minutes });
    }

    fn render(&self) {
        self.base.render(Part::Input, self.json());
    }
}

impl Control for TimeField {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ControlBase {
        &mut self.base
    }

    fn set_enabled(&mut self, enabled: bool) {
        input_set_enabled(&mut self.base, enabled);
    }

    fn json(&self) -> Value {
        json!({ "hours": self.hours, "minutes": self.minutes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_date_notations() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09"), expected);
        assert_eq!(parse_date("09.03.2024"), expected);
        assert_eq!(parse_date("-1"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn formats_day_first() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(format_date(date), "01.12.2024");
    }
}
