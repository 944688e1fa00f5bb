use crate::calendar::{date_key, parse_date_key, weekday_name, weekday_number};
use crate::errors::{Error, Result};
use crate::models::{AnalyticsResponse, AttendanceRecord, Ledger, NoShowResponse, hhmm};
use chrono::NaiveDate;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Attendance,
    Analytics,
    NoShow,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Attendance => "attendance",
            ReportKind::Analytics => "analytics",
            ReportKind::NoShow => "noshow",
        }
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().trim_end_matches(".csv") {
            "attendance" => Ok(ReportKind::Attendance),
            "analytics" => Ok(ReportKind::Analytics),
            "noshow" | "no-show" => Ok(ReportKind::NoShow),
            other => Err(Error::bad_request(format!("unknown report '{other}'"))),
        }
    }
}

/// Every cell quoted, embedded quotes doubled, rows separated by `\n`.
pub fn render_csv(rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(row)
            .map_err(|err| Error::Export(err.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| Error::Export(err.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|err| Error::Export(err.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// `<report>-<start>_to_<end>.csv`, or `<report>-all.csv` without a range.
pub fn export_filename(kind: ReportKind, range: Option<(NaiveDate, NaiveDate)>) -> String {
    match range {
        Some((start, end)) => format!("{}-{}_to_{}.csv", kind.as_str(), date_key(start), date_key(end)),
        None => format!("{}-all.csv", kind.as_str()),
    }
}

pub fn records_table(ledger: Ledger, records: &[AttendanceRecord]) -> Vec<Vec<String>> {
    let header = [
        "Date",
        "Day",
        "Name",
        "Status",
        "Slot",
        "Check-In",
        "Check-Out",
        "Overtime Hours",
        "Cabin",
    ];
    let mut rows = vec![header.iter().map(|h| h.to_string()).collect()];

    for record in records {
        let day = parse_date_key(&record.date)
            .ok()
            .and_then(|date| weekday_name(weekday_number(date)))
            .unwrap_or("N/A");
        let time = |value: Option<chrono::NaiveTime>| {
            value.map_or_else(|| "N/A".to_string(), |t| t.format(hhmm::FORMAT).to_string())
        };
        rows.push(vec![
            record.date.clone(),
            day.to_string(),
            record.entity_name.clone(),
            record.status.to_string(),
            record.slot_label(ledger),
            time(record.check_in_time),
            time(record.check_out_time),
            record.overtime_hours.to_string(),
            record.cabin_number.map_or_else(String::new, |c| c.to_string()),
        ]);
    }
    rows
}

pub fn analytics_table(report: &AnalyticsResponse) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec![
            "Date Range".to_string(),
            report.date_range.start.clone(),
            report.date_range.end.clone(),
        ],
        vec!["Total Working Days".to_string(), report.total_working_days.to_string()],
        vec!["Total Recorded Days".to_string(), report.total_recorded_days.to_string()],
        [
            "Name",
            "Present Days",
            "Absent Days",
            "Total Overtime Hours",
            "Total Slot Attendances",
            "Attendance Rate (%)",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect(),
    ];

    rows.extend(report.entities.iter().map(|entity| {
        vec![
            entity.name.clone(),
            entity.present_days.to_string(),
            entity.absent_days.to_string(),
            entity.total_overtime_hours.to_string(),
            entity.total_slot_attendances.to_string(),
            entity.attendance_rate.to_string(),
        ]
    }));
    rows
}

pub fn no_show_table(report: &NoShowResponse) -> Vec<Vec<String>> {
    let mut rows = vec![
        ["Sr. No.", "Day & Date", "Name", "Absent Slot", "Remark"]
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>(),
    ];
    rows.extend(report.records.iter().map(|entry| {
        vec![
            entry.sr_no.to_string(),
            entry.day_date.clone(),
            entry.entity_name.clone(),
            entry.absent_slot.clone(),
            entry.remark.clone(),
        ]
    }));
    rows
}
