use crate::calendar::{weekday_name, weekday_number, Calendar};
use crate::errors::{Error, Result};
use crate::models::{Doctor, Ledger, StaffMember, CABIN_RANGE};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Borrowed view of the fields that decide whether someone is expected in.
#[derive(Debug, Clone, Copy)]
pub struct Schedule<'a> {
    pub working_days: &'a [u8],
    pub slots: &'a [u8],
    pub special_schedule: Option<&'a BTreeMap<u8, Vec<u8>>>,
    pub join_date: Option<NaiveDate>,
    pub active: bool,
}

pub trait Scheduled {
    fn id(&self) -> u64;
    fn name(&self) -> &str;
    fn schedule(&self) -> Schedule<'_>;
}

impl Scheduled for Doctor {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn schedule(&self) -> Schedule<'_> {
        Schedule {
            working_days: &self.working_days,
            slots: &self.slots,
            special_schedule: Some(&self.special_schedule),
            join_date: self.join_date,
            active: self.active,
        }
    }
}

impl Scheduled for StaffMember {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn schedule(&self) -> Schedule<'_> {
        Schedule {
            working_days: &self.working_days,
            slots: &self.slots,
            special_schedule: None,
            join_date: self.join_date,
            active: self.active,
        }
    }
}

/// Slots the entity is expected to work on `date`, ascending. Missing data
/// means "not scheduled", never an error.
pub fn scheduled_slots(entity: &impl Scheduled, date: NaiveDate) -> Vec<u8> {
    let schedule = entity.schedule();
    if !schedule.active {
        return Vec::new();
    }
    if schedule.join_date.is_some_and(|joined| date < joined) {
        return Vec::new();
    }

    let day = weekday_number(date);
    if !schedule.working_days.contains(&day) {
        return Vec::new();
    }

    let slots = schedule
        .special_schedule
        .and_then(|special| special.get(&day))
        .map_or(schedule.slots, Vec::as_slice);

    let mut slots = slots.to_vec();
    slots.sort_unstable();
    slots.dedup();
    slots
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedEntity {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRoster {
    pub slot_number: u8,
    pub slot_name: &'static str,
    pub time: &'static str,
    pub expected: Vec<ExpectedEntity>,
}

/// Who is expected in each slot of the ledger's catalog on `date`. Every
/// slot is empty on Sundays and declared holidays.
pub fn expected_on<T: Scheduled>(
    calendar: &Calendar,
    ledger: Ledger,
    entities: &[T],
    date: NaiveDate,
) -> Vec<SlotRoster> {
    let mut rosters: Vec<SlotRoster> = ledger
        .slots()
        .iter()
        .map(|slot| SlotRoster {
            slot_number: slot.number,
            slot_name: slot.name,
            time: slot.time,
            expected: Vec::new(),
        })
        .collect();

    if calendar.is_non_working_day(date) {
        return rosters;
    }

    for entity in entities {
        for slot in scheduled_slots(entity, date) {
            if let Some(roster) = rosters.iter_mut().find(|r| r.slot_number == slot) {
                roster.expected.push(ExpectedEntity {
                    id: entity.id(),
                    name: entity.name().to_string(),
                });
            }
        }
    }

    for roster in &mut rosters {
        roster.expected.sort_by_key(|e| e.name.to_lowercase());
    }
    rosters
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CabinOccupant {
    pub name: String,
    pub slot: u8,
    pub time_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CabinStatus {
    pub cabin: u8,
    pub booked: bool,
    pub slots: Vec<u8>,
    pub doctors: Vec<CabinOccupant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CabinReport {
    pub day: u8,
    pub day_name: &'static str,
    pub slot: Option<u8>,
    pub booked: usize,
    pub available: usize,
    pub cabins: Vec<CabinStatus>,
}

/// Cabin bookings for a weekday, from the doctors' standing schedules.
pub fn cabin_occupancy(
    doctors: &[Doctor],
    day: u8,
    slot: Option<u8>,
    cabin: Option<u8>,
) -> Result<CabinReport> {
    let day_name =
        weekday_name(day).ok_or_else(|| Error::bad_request(format!("day must be 0-6, got {day}")))?;
    if let Some(slot) = slot {
        if Ledger::Doctors.slot(slot).is_none() {
            return Err(Error::bad_request(format!("unknown doctor slot {slot}")));
        }
    }
    if let Some(cabin) = cabin {
        if !CABIN_RANGE.contains(&cabin) {
            return Err(Error::bad_request(format!("cabin must be 1-9, got {cabin}")));
        }
    }

    let mut occupancy: BTreeMap<u8, (BTreeSet<u8>, Vec<CabinOccupant>)> = BTreeMap::new();
    for doctor in doctors.iter().filter(|d| d.active && d.working_days.contains(&day)) {
        let Some(cabin_number) = doctor.cabin_number else {
            continue;
        };
        let doctor_slots = doctor
            .special_schedule
            .get(&day)
            .unwrap_or(&doctor.slots);

        for &s in doctor_slots.iter().filter(|s| slot.is_none_or(|wanted| **s == wanted)) {
            let entry = occupancy.entry(cabin_number).or_default();
            entry.0.insert(s);
            entry.1.push(CabinOccupant {
                name: doctor.name.clone(),
                slot: s,
                time_range: doctor.time_range.clone(),
            });
        }
    }

    let cabins: Vec<CabinStatus> = match cabin {
        Some(cabin) => vec![cabin],
        None => CABIN_RANGE.collect(),
    }
    .into_iter()
    .map(|cabin| {
        let (slots, doctors) = occupancy.remove(&cabin).unwrap_or_default();
        CabinStatus {
            cabin,
            booked: !doctors.is_empty(),
            slots: slots.into_iter().collect(),
            doctors,
        }
    })
    .collect();

    let booked = cabins.iter().filter(|c| c.booked).count();
    Ok(CabinReport {
        day,
        day_name,
        slot,
        booked,
        available: cabins.len() - booked,
        cabins,
    })
}
