use crate::calendar::{date_key, display_day_date, parse_date_key};
use crate::models::{AttendanceRecord, DateRange, Ledger, NoShowEntry, NoShowResponse};
use chrono::NaiveDate;

pub fn build_no_show(
    records: &[AttendanceRecord],
    ledger: Ledger,
    start: NaiveDate,
    end: NaiveDate,
) -> NoShowResponse {
    let (start_key, end_key) = (date_key(start), date_key(end));
    let mut absences: Vec<&AttendanceRecord> = records
        .iter()
        .filter(|record| record.is_absent())
        .filter(|record| record.date >= start_key && record.date <= end_key)
        .collect();
    absences.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.entity_name.cmp(&b.entity_name))
            .then_with(|| a.slot_number.cmp(&b.slot_number))
    });

    let entries = absences
        .into_iter()
        .enumerate()
        .map(|(index, record)| NoShowEntry {
            sr_no: index + 1,
            day_date: parse_date_key(&record.date)
                .map(display_day_date)
                .unwrap_or_else(|_| record.date.clone()),
            entity_name: record.entity_name.clone(),
            absent_slot: record.slot_label(ledger),
            remark: String::new(),
        })
        .collect::<Vec<_>>();

    NoShowResponse {
        date_range: DateRange {
            start: start_key,
            end: end_key,
        },
        total_absences: entries.len(),
        records: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn absent(date: &str, name: &str, slot: Option<u8>) -> AttendanceRecord {
        AttendanceRecord::new(date, name, AttendanceStatus::Absent, slot)
    }

    #[test]
    fn empty_range_is_well_formed() {
        let records = vec![AttendanceRecord::new(
            "2024-06-03",
            "Dr. A",
            AttendanceStatus::Present,
            Some(1),
        )];
        let report = build_no_show(&records, Ledger::Doctors, day(2024, 6, 1), day(2024, 6, 30));
        assert_eq!(report.total_absences, 0);
        assert!(report.records.is_empty());
        assert_eq!(report.date_range.end, "2024-06-30");
    }

    #[test]
    fn absences_are_ordered_numbered_and_labelled() {
        let mut legacy = absent("2024-06-03", "Dr. Legacy", None);
        legacy.time_slot_label = "9:00 AM - 1:00 PM".into();
        let records = vec![
            absent("2024-06-04", "Dr. A", Some(4)),
            absent("2024-06-03", "Dr. B", Some(2)),
            legacy,
            absent("2024-06-03", "Dr. C", None),
            absent("2024-07-01", "Dr. Outside", Some(1)),
        ];

        let report = build_no_show(&records, Ledger::Doctors, day(2024, 6, 1), day(2024, 6, 30));
        assert_eq!(report.total_absences, 4);

        let rows: Vec<(usize, &str, &str)> = report
            .records
            .iter()
            .map(|r| (r.sr_no, r.entity_name.as_str(), r.absent_slot.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (1, "Dr. B", "Mid-Day (11:00 AM - 2:00 PM)"),
                (2, "Dr. C", "N/A"),
                (3, "Dr. Legacy", "9:00 AM - 1:00 PM"),
                (4, "Dr. A", "Evening (5:00 PM - 8:00 PM)"),
            ]
        );
        assert_eq!(report.records[0].day_date, "Monday, 03 Jun 2024");
        assert_eq!(report.records[3].day_date, "Tuesday, 04 Jun 2024");
    }

    #[test]
    fn non_canonical_date_key_shows_the_raw_key() {
        let records = vec![
            absent("2024-06-05x", "Dr. Odd", Some(1)),
            absent("2024-06-03", "Dr. A", Some(1)),
        ];
        let report = build_no_show(&records, Ledger::Doctors, day(2024, 6, 1), day(2024, 6, 30));
        assert_eq!(report.total_absences, 2);
        assert_eq!(report.records[0].day_date, "Monday, 03 Jun 2024");
        assert_eq!(report.records[1].day_date, "2024-06-05x");
    }
}
