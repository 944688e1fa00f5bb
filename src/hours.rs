use crate::errors::{Error, Result};
use crate::models::hhmm;
use chrono::NaiveTime;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorkHours {
    pub hours_worked: f64,
    pub overtime: f64,
    pub undertime: f64,
}

/// Half away from zero, two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Hours worked against a daily baseline. Either time missing yields zeros.
/// A check-out before the check-in is rejected: overnight shifts are not
/// modelled.
pub fn work_hours(
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    standard_hours: f64,
) -> Result<WorkHours> {
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return Ok(WorkHours::default());
    };
    if check_out < check_in {
        return Err(Error::overnight_shift(
            &check_in.format(hhmm::FORMAT).to_string(),
            &check_out.format(hhmm::FORMAT).to_string(),
        ));
    }

    let minutes = (check_out - check_in).num_minutes();
    let hours_worked = minutes as f64 / 60.0;
    let difference = hours_worked - standard_hours;

    Ok(WorkHours {
        hours_worked: round2(hours_worked),
        overtime: if difference > 0.0 { round2(difference) } else { 0.0 },
        undertime: if difference < 0.0 { round2(-difference) } else { 0.0 },
    })
}
