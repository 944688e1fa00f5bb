use crate::calendar::{date_key, Calendar};
use crate::errors::Result;
use crate::hours::round2;
use crate::models::{
    AnalyticsResponse, AppData, AttendanceRecord, DateRange, EntityStats, RosterKind, StaffKind,
    DAILY_SLOT,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Analytics for one roster over an inclusive date range, using the stored
/// holidays as non-working days.
pub fn build_analytics(
    data: &AppData,
    kind: RosterKind,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AnalyticsResponse> {
    let calendar = Calendar::new(&data.holidays);
    let staff_kinds: HashMap<&str, StaffKind> = data
        .staff
        .iter()
        .map(|member| (member.name.as_str(), member.kind))
        .collect();
    let records: Vec<AttendanceRecord> = data
        .records_in_range(kind.ledger(), start, end)
        .into_iter()
        .filter(|record| belongs_to(kind, record, &staff_kinds))
        .collect();

    build_report(&calendar, &records, start, end, &roster_names(data, kind))
}

/// Staff records follow the member's kind. Names no longer on the roster
/// fall back to the slot: the daily slot means other staff.
fn belongs_to(
    kind: RosterKind,
    record: &AttendanceRecord,
    staff_kinds: &HashMap<&str, StaffKind>,
) -> bool {
    let staff_kind = staff_kinds
        .get(record.entity_name.as_str())
        .copied()
        .unwrap_or(if record.slot_number == Some(DAILY_SLOT) {
            StaffKind::Other
        } else {
            StaffKind::Employee
        });
    match kind {
        RosterKind::Doctors => true,
        RosterKind::Employees => staff_kind == StaffKind::Employee,
        RosterKind::Other => staff_kind == StaffKind::Other,
    }
}

/// Active members of the roster; they are listed even without records.
pub fn roster_names(data: &AppData, kind: RosterKind) -> Vec<String> {
    match kind {
        RosterKind::Doctors => data
            .doctors
            .iter()
            .filter(|doctor| doctor.active)
            .map(|doctor| doctor.name.clone())
            .collect(),
        RosterKind::Employees => staff_names(data, StaffKind::Employee),
        RosterKind::Other => staff_names(data, StaffKind::Other),
    }
}

fn staff_names(data: &AppData, kind: StaffKind) -> Vec<String> {
    data.staff
        .iter()
        .filter(|member| member.active && member.kind == kind)
        .map(|member| member.name.clone())
        .collect()
}

#[derive(Default)]
struct Tally<'a> {
    present_dates: BTreeSet<&'a str>,
    absent_dates: BTreeSet<&'a str>,
    slot_attendances: usize,
    overtime_hours: f64,
}

pub fn build_report(
    calendar: &Calendar,
    records: &[AttendanceRecord],
    start: NaiveDate,
    end: NaiveDate,
    roster: &[String],
) -> Result<AnalyticsResponse> {
    let total_working_days = calendar.count_working_days(start, end)?;
    let total_recorded_days = records
        .iter()
        .map(|record| record.date.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let mut tallies: BTreeMap<&str, Tally<'_>> = roster
        .iter()
        .map(|name| (name.as_str(), Tally::default()))
        .collect();

    // Names missing from the roster still get a row.
    for record in records {
        let tally = tallies.entry(record.entity_name.as_str()).or_default();
        if record.is_present() {
            tally.present_dates.insert(record.date.as_str());
            tally.slot_attendances += 1;
            tally.overtime_hours += record.overtime_hours;
        } else {
            tally.absent_dates.insert(record.date.as_str());
        }
    }

    let mut entities: Vec<EntityStats> = tallies
        .into_iter()
        .map(|(name, tally)| {
            let present_days = tally.present_dates.len();
            let attendance_rate = if total_working_days > 0 {
                round2(present_days as f64 / f64::from(total_working_days) * 100.0)
            } else {
                0.0
            };
            EntityStats {
                name: name.to_string(),
                present_days,
                absent_days: tally.absent_dates.len(),
                total_slot_attendances: tally.slot_attendances,
                total_overtime_hours: round2(tally.overtime_hours),
                attendance_rate,
            }
        })
        .collect();

    entities.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(AnalyticsResponse {
        total_working_days,
        total_recorded_days,
        date_range: DateRange {
            start: date_key(start),
            end: date_key(end),
        },
        entities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::models::{AttendanceStatus, Holiday, Ledger, StaffMember};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(date: &str, name: &str, status: AttendanceStatus, slot: u8) -> AttendanceRecord {
        AttendanceRecord::new(date, name, status, Some(slot))
    }

    #[test]
    fn present_and_absent_on_same_day_count_separately() {
        let records = vec![
            rec("2024-06-03", "Dr. A", AttendanceStatus::Present, 1),
            rec("2024-06-03", "Dr. A", AttendanceStatus::Absent, 2),
        ];
        let report = build_report(
            &Calendar::default(),
            &records,
            day(2024, 6, 3),
            day(2024, 6, 3),
            &["Dr. A".to_string()],
        )
        .unwrap();

        let a = &report.entities[0];
        assert_eq!(a.present_days, 1);
        assert_eq!(a.absent_days, 1);
        assert_eq!(a.total_slot_attendances, 1);
        assert_eq!(a.attendance_rate, 100.0);
        assert_eq!(report.total_recorded_days, 1);
    }

    #[test]
    fn roster_members_without_records_get_zero_rows() {
        let records = vec![rec("2024-06-03", "dr. lower", AttendanceStatus::Present, 1)];
        let roster = vec!["Dr. Zed".to_string(), "Dr. Alpha".to_string()];
        let report = build_report(
            &Calendar::default(),
            &records,
            day(2024, 6, 1),
            day(2024, 6, 30),
            &roster,
        )
        .unwrap();

        let names: Vec<&str> = report.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Dr. Alpha", "dr. lower", "Dr. Zed"]);
        assert_eq!(report.total_working_days, 25);
        let zed = &report.entities[2];
        assert_eq!((zed.present_days, zed.absent_days, zed.attendance_rate), (0, 0, 0.0));
        assert_eq!(report.entities[1].attendance_rate, 4.0);
        assert_eq!(report.date_range.start, "2024-06-01");
    }

    #[test]
    fn slot_attendances_and_overtime_sum_per_record() {
        let mut first = rec("2024-06-03", "Ms. A", AttendanceStatus::Present, 1);
        first.overtime_hours = 1.25;
        let mut second = rec("2024-06-03", "Ms. A", AttendanceStatus::Present, 2);
        second.overtime_hours = 0.5;
        let third = rec("2024-06-04", "Ms. A", AttendanceStatus::Present, 1);

        let report = build_report(
            &Calendar::default(),
            &[first, second, third],
            day(2024, 6, 3),
            day(2024, 6, 5),
            &[],
        )
        .unwrap();
        let a = &report.entities[0];
        assert_eq!(a.present_days, 2);
        assert_eq!(a.total_slot_attendances, 3);
        assert_eq!(a.total_overtime_hours, 1.75);
        assert_eq!(a.attendance_rate, 66.67);
    }

    #[test]
    fn no_working_days_gives_zero_rate() {
        // 2024-06-02 is a Sunday.
        let records = vec![rec("2024-06-02", "Dr. A", AttendanceStatus::Present, 1)];
        let report = build_report(
            &Calendar::default(),
            &records,
            day(2024, 6, 2),
            day(2024, 6, 2),
            &[],
        )
        .unwrap();
        assert_eq!(report.total_working_days, 0);
        assert_eq!(report.entities[0].attendance_rate, 0.0);
    }

    #[test]
    fn inverted_range_is_bad_request() {
        let err = build_report(&Calendar::default(), &[], day(2024, 6, 5), day(2024, 6, 1), &[])
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn analytics_splits_staff_by_kind_and_honours_holidays() {
        let mut data = AppData::default();
        data.holidays.push(Holiday {
            date: day(2024, 6, 4),
            name: "Closed".into(),
            description: String::new(),
        });
        data.replace_date(
            Ledger::Staff,
            day(2024, 6, 3),
            vec![
                rec("", "Ms. Shift", AttendanceStatus::Present, 1),
                rec("", "Ms. Daily", AttendanceStatus::Present, 0),
            ],
        )
        .unwrap();

        let employees =
            build_analytics(&data, RosterKind::Employees, day(2024, 6, 3), day(2024, 6, 4)).unwrap();
        assert_eq!(employees.total_working_days, 1);
        let names: Vec<&str> = employees.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ms. Shift"]);

        let other =
            build_analytics(&data, RosterKind::Other, day(2024, 6, 3), day(2024, 6, 4)).unwrap();
        assert_eq!(other.entities[0].name, "Ms. Daily");
        assert_eq!(other.entities[0].attendance_rate, 100.0);
    }

    #[test]
    fn staff_records_follow_the_member_kind_not_the_slot() {
        let mut data = AppData::default();
        data.add_staff(StaffMember {
            id: 0,
            name: "Ms. Emp".into(),
            kind: StaffKind::Employee,
            standard_hours: 6.0,
            role: "Staff".into(),
            work_time: "N/A".into(),
            working_days: vec![1, 2, 3, 4, 5, 6],
            slots: vec![DAILY_SLOT],
            join_date: None,
            active: true,
        })
        .unwrap();
        data.replace_date(
            Ledger::Staff,
            day(2024, 6, 3),
            vec![rec("", "Ms. Emp", AttendanceStatus::Present, 0)],
        )
        .unwrap();

        let employees =
            build_analytics(&data, RosterKind::Employees, day(2024, 6, 3), day(2024, 6, 3)).unwrap();
        assert_eq!(employees.entities.len(), 1);
        assert_eq!(employees.entities[0].present_days, 1);
        assert_eq!(employees.entities[0].attendance_rate, 100.0);

        let other =
            build_analytics(&data, RosterKind::Other, day(2024, 6, 3), day(2024, 6, 3)).unwrap();
        assert!(other.entities.is_empty());
    }
}
