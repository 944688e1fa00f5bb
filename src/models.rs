use crate::errors::Error;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Document schema version. Version 2 introduced surrogate entity ids.
pub const DATA_VERSION: u32 = 2;

/// Pseudo-slot used by staff who are tracked once per day.
pub const DAILY_SLOT: u8 = 0;

pub const CABIN_RANGE: std::ops::RangeInclusive<u8> = 1..=9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub number: u8,
    pub name: &'static str,
    pub time: &'static str,
}

impl Slot {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.time)
    }
}

const DOCTOR_SLOTS: [Slot; 4] = [
    Slot { number: 1, name: "Morning", time: "8:00 AM - 11:00 AM" },
    Slot { number: 2, name: "Mid-Day", time: "11:00 AM - 2:00 PM" },
    Slot { number: 3, name: "Afternoon", time: "2:00 PM - 5:00 PM" },
    Slot { number: 4, name: "Evening", time: "5:00 PM - 8:00 PM" },
];

const STAFF_SLOTS: [Slot; 4] = [
    Slot { number: DAILY_SLOT, name: "Daily", time: "Full day" },
    Slot { number: 1, name: "Morning Shift", time: "8:00 AM - 2:00 PM" },
    Slot { number: 2, name: "Day Shift", time: "11:00 AM - 5:00 PM" },
    Slot { number: 3, name: "Evening Shift", time: "5:00 PM - 8:00 PM" },
];

/// A record collection. Doctors and staff keep separate day books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ledger {
    Doctors,
    Staff,
}

impl Ledger {
    pub fn slots(self) -> &'static [Slot] {
        match self {
            Ledger::Doctors => &DOCTOR_SLOTS,
            Ledger::Staff => &STAFF_SLOTS,
        }
    }

    pub fn slot(self, number: u8) -> Option<&'static Slot> {
        self.slots().iter().find(|slot| slot.number == number)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Ledger::Doctors => "doctors",
            Ledger::Staff => "staff",
        }
    }
}

impl FromStr for Ledger {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "doctors" => Ok(Ledger::Doctors),
            "staff" | "employees" => Ok(Ledger::Staff),
            other => Err(Error::bad_request(format!("unknown ledger '{other}'"))),
        }
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The roster an analytics report is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterKind {
    Doctors,
    Employees,
    Other,
}

impl RosterKind {
    pub fn ledger(self) -> Ledger {
        match self {
            RosterKind::Doctors => Ledger::Doctors,
            RosterKind::Employees | RosterKind::Other => Ledger::Staff,
        }
    }
}

impl FromStr for RosterKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "doctors" => Ok(RosterKind::Doctors),
            "employees" => Ok(RosterKind::Employees),
            "other" => Ok(RosterKind::Other),
            other => Err(Error::bad_request(format!("unknown roster kind '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => f.write_str("Present"),
            AttendanceStatus::Absent => f.write_str("Absent"),
        }
    }
}

/// One explicit attendance action. A missing record means nothing was
/// recorded yet, which is not the same as [`AttendanceStatus::Absent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default)]
    pub date: String,
    pub entity_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<u64>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub slot_number: Option<u8>,
    #[serde(default)]
    pub time_slot_label: String,
    #[serde(default, with = "hhmm")]
    pub check_in_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub check_out_time: Option<NaiveTime>,
    #[serde(default)]
    pub overtime_hours: f64,
    #[serde(default)]
    pub cabin_number: Option<u8>,
}

impl AttendanceRecord {
    pub fn new(date: &str, entity_name: &str, status: AttendanceStatus, slot: Option<u8>) -> Self {
        Self {
            date: date.to_string(),
            entity_name: entity_name.to_string(),
            entity_id: None,
            status,
            slot_number: slot,
            time_slot_label: String::new(),
            check_in_time: None,
            check_out_time: None,
            overtime_hours: 0.0,
            cabin_number: None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }

    pub fn is_absent(&self) -> bool {
        self.status == AttendanceStatus::Absent
    }

    /// Catalog label for the slot, else the stored label, else `N/A`.
    pub fn slot_label(&self, ledger: Ledger) -> String {
        if let Some(slot) = self.slot_number.and_then(|number| ledger.slot(number)) {
            return slot.label();
        }
        let stored = self.time_slot_label.trim();
        if stored.is_empty() {
            "N/A".to_string()
        } else {
            stored.to_string()
        }
    }
}

/// `HH:MM` wall-clock times. Empty strings and nulls both mean "not set".
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveTime::parse_from_str(text, FORMAT)
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid time '{text}', expected HH:MM"))),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_working_days() -> Vec<u8> {
    vec![1, 2, 3, 4, 5, 6]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<u8>,
    pub slots: Vec<u8>,
    #[serde(default)]
    pub special_schedule: BTreeMap<u8, Vec<u8>>,
    #[serde(default)]
    pub time_range: String,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default)]
    pub cabin_number: Option<u8>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffKind {
    #[default]
    Employee,
    Other,
}

impl StaffKind {
    pub fn default_slots(self) -> Vec<u8> {
        match self {
            StaffKind::Employee => vec![1, 2, 3],
            StaffKind::Other => vec![DAILY_SLOT],
        }
    }
}

impl FromStr for StaffKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "employee" | "employees" => Ok(StaffKind::Employee),
            "other" => Ok(StaffKind::Other),
            other => Err(Error::bad_request(format!("unknown staff kind '{other}'"))),
        }
    }
}

fn default_role() -> String {
    "Staff".to_string()
}

fn default_work_time() -> String {
    "N/A".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub kind: StaffKind,
    pub standard_hours: f64,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_work_time")]
    pub work_time: String,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<u8>,
    #[serde(default)]
    pub slots: Vec<u8>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

fn legacy_version() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub doctor_attendance: BTreeMap<String, Vec<AttendanceRecord>>,
    #[serde(default)]
    pub staff_attendance: BTreeMap<String, Vec<AttendanceRecord>>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            version: DATA_VERSION,
            next_id: 0,
            doctors: Vec::new(),
            staff: Vec::new(),
            holidays: Vec::new(),
            doctor_attendance: BTreeMap::new(),
            staff_attendance: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStats {
    pub name: String,
    pub present_days: usize,
    pub absent_days: usize,
    pub total_slot_attendances: usize,
    pub total_overtime_hours: f64,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_working_days: u32,
    pub total_recorded_days: usize,
    pub date_range: DateRange,
    pub entities: Vec<EntityStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoShowEntry {
    pub sr_no: usize,
    pub day_date: String,
    pub entity_name: String,
    pub absent_slot: String,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoShowResponse {
    pub date_range: DateRange,
    pub total_absences: usize,
    pub records: Vec<NoShowEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub date: String,
    pub ledger: Ledger,
    pub saved: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accepts_empty_times_and_fills_defaults() {
        let record: AttendanceRecord = serde_json::from_value(serde_json::json!({
            "entityName": "Ms. Aditi Deshpande",
            "status": "present",
            "slotNumber": 1,
            "checkInTime": "",
            "checkOutTime": "14:00"
        }))
        .unwrap();

        assert_eq!(record.check_in_time, None);
        assert_eq!(record.check_out_time, NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(record.overtime_hours, 0.0);
        assert!(record.date.is_empty());
    }

    #[test]
    fn record_rejects_malformed_time() {
        let result = serde_json::from_value::<AttendanceRecord>(serde_json::json!({
            "entityName": "A",
            "status": "present",
            "checkInTime": "8am"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn times_serialize_as_hhmm() {
        let mut record = AttendanceRecord::new("2024-06-03", "A", AttendanceStatus::Present, Some(1));
        record.check_in_time = NaiveTime::from_hms_opt(8, 5, 0);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["checkInTime"], "08:05");
        assert_eq!(value["checkOutTime"], serde_json::Value::Null);
        assert_eq!(value["status"], "present");
    }

    #[test]
    fn doctor_special_schedule_round_trips_with_numeric_keys() {
        let doctor: Doctor = serde_json::from_value(serde_json::json!({
            "name": "Dr. Rajendra Tippanwar",
            "workingDays": [1, 4],
            "slots": [1],
            "specialSchedule": { "4": [2, 3] }
        }))
        .unwrap();
        assert!(doctor.active);
        assert_eq!(doctor.special_schedule.get(&4), Some(&vec![2, 3]));
    }

    #[test]
    fn ledger_and_roster_parse() {
        assert_eq!("doctors".parse::<Ledger>().unwrap(), Ledger::Doctors);
        assert_eq!("other".parse::<RosterKind>().unwrap().ledger(), Ledger::Staff);
        assert!(matches!("nurses".parse::<RosterKind>(), Err(Error::BadRequest(_))));
    }

    #[test]
    fn slot_catalog_lookup() {
        assert_eq!(Ledger::Doctors.slot(4).unwrap().name, "Evening");
        assert_eq!(Ledger::Staff.slot(DAILY_SLOT).unwrap().name, "Daily");
        assert!(Ledger::Doctors.slot(0).is_none());
    }

    #[test]
    fn missing_version_is_legacy() {
        let data: AppData = serde_json::from_str("{}").unwrap();
        assert_eq!(data.version, 1);
        assert_eq!(AppData::default().version, DATA_VERSION);
    }
}
