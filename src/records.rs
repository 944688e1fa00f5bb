use crate::calendar::date_key;
use crate::errors::{Error, Result};
use crate::hours::work_hours;
use crate::models::{AppData, AttendanceRecord, Ledger, CABIN_RANGE};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

impl AppData {
    pub fn ledger(&self, ledger: Ledger) -> &BTreeMap<String, Vec<AttendanceRecord>> {
        match ledger {
            Ledger::Doctors => &self.doctor_attendance,
            Ledger::Staff => &self.staff_attendance,
        }
    }

    fn ledger_mut(&mut self, ledger: Ledger) -> &mut BTreeMap<String, Vec<AttendanceRecord>> {
        match ledger {
            Ledger::Doctors => &mut self.doctor_attendance,
            Ledger::Staff => &mut self.staff_attendance,
        }
    }

    /// Every stored record of the ledger, oldest date first.
    pub fn all_records(&self, ledger: Ledger) -> Vec<AttendanceRecord> {
        self.ledger(ledger).values().flatten().cloned().collect()
    }

    /// Inclusive on both ends.
    pub fn records_in_range(
        &self,
        ledger: Ledger,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<AttendanceRecord> {
        if start > end {
            return Vec::new();
        }
        self.ledger(ledger)
            .range(date_key(start)..=date_key(end))
            .flat_map(|(_, records)| records.iter().cloned())
            .collect()
    }

    pub fn records_on(&self, ledger: Ledger, date: NaiveDate) -> Vec<AttendanceRecord> {
        self.ledger(ledger)
            .get(&date_key(date))
            .cloned()
            .unwrap_or_default()
    }

    /// Swap the full set of records for `date`. Nothing is changed when any
    /// record in the batch is rejected.
    pub fn replace_date(
        &mut self,
        ledger: Ledger,
        date: NaiveDate,
        records: Vec<AttendanceRecord>,
    ) -> Result<usize> {
        let key = date_key(date);
        let mut seen = HashSet::with_capacity(records.len());
        let mut prepared = Vec::with_capacity(records.len());

        for mut record in records {
            record.entity_name = record.entity_name.trim().to_string();
            if record.entity_name.is_empty() {
                return Err(Error::bad_request("entityName is required"));
            }
            if record.date.is_empty() {
                record.date = key.clone();
            } else if record.date != key {
                return Err(Error::bad_request(format!(
                    "record for {} dated {} does not belong to {key}",
                    record.entity_name, record.date
                )));
            }
            if !seen.insert((record.entity_name.clone(), record.slot_number)) {
                return Err(Error::duplicate_key(&key, &record.entity_name, record.slot_number));
            }

            self.normalize_record(ledger, &mut record)?;
            prepared.push(record);
        }

        prepared.sort_by(|a, b| {
            a.entity_name
                .cmp(&b.entity_name)
                .then(a.slot_number.cmp(&b.slot_number))
        });

        let count = prepared.len();
        let day_book = self.ledger_mut(ledger);
        if prepared.is_empty() {
            day_book.remove(&key);
        } else {
            day_book.insert(key, prepared);
        }
        Ok(count)
    }

    fn normalize_record(&self, ledger: Ledger, record: &mut AttendanceRecord) -> Result<()> {
        if let Some(number) = record.slot_number {
            let slot = ledger.slot(number).ok_or_else(|| {
                Error::bad_request(format!("slot {number} is not a {ledger} slot"))
            })?;
            if record.time_slot_label.trim().is_empty() {
                record.time_slot_label = slot.time.to_string();
            }
        }
        if let Some(cabin) = record.cabin_number {
            if !CABIN_RANGE.contains(&cabin) {
                return Err(Error::bad_request(format!("cabin must be 1-9, got {cabin}")));
            }
        }
        if !record.overtime_hours.is_finite() || record.overtime_hours < 0.0 {
            return Err(Error::bad_request("overtimeHours must be zero or more"));
        }
        if record.entity_id.is_none() {
            record.entity_id = self.entity_id(ledger, &record.entity_name);
        }

        if !record.is_present() {
            record.overtime_hours = 0.0;
            return Ok(());
        }

        let standard_hours = match ledger {
            Ledger::Staff => self
                .staff
                .iter()
                .find(|member| member.name == record.entity_name)
                .map(|member| member.standard_hours),
            Ledger::Doctors => None,
        };
        let hours = work_hours(
            record.check_in_time,
            record.check_out_time,
            standard_hours.unwrap_or(0.0),
        )?;
        if standard_hours.is_some() {
            record.overtime_hours = hours.overtime;
        }
        Ok(())
    }

    pub fn entity_id(&self, ledger: Ledger, name: &str) -> Option<u64> {
        match ledger {
            Ledger::Doctors => self.doctors.iter().find(|d| d.name == name).map(|d| d.id),
            Ledger::Staff => self.staff.iter().find(|s| s.name == name).map(|s| s.id),
        }
    }
}
