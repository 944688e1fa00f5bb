use crate::calendar::date_key;
use crate::errors::{Error, Result};
use crate::models::{AppData, Doctor, Holiday, Ledger, StaffMember, CABIN_RANGE, DATA_VERSION};
use chrono::NaiveDate;
use tracing::info;

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::bad_request("name is required"));
    }
    Ok(name.to_string())
}

fn normalize_days(days: &mut Vec<u8>) -> Result<()> {
    if let Some(bad) = days.iter().find(|day| **day > 6) {
        return Err(Error::bad_request(format!("weekday must be 0-6, got {bad}")));
    }
    days.sort_unstable();
    days.dedup();
    Ok(())
}

fn normalize_slots(ledger: Ledger, slots: &mut Vec<u8>) -> Result<()> {
    if let Some(bad) = slots.iter().find(|slot| ledger.slot(**slot).is_none()) {
        return Err(Error::bad_request(format!("slot {bad} is not a {ledger} slot")));
    }
    slots.sort_unstable();
    slots.dedup();
    Ok(())
}

fn validate_doctor(doctor: &mut Doctor) -> Result<()> {
    doctor.name = normalize_name(&doctor.name)?;
    doctor.time_range = doctor.time_range.trim().to_string();
    normalize_days(&mut doctor.working_days)?;
    if doctor.working_days.is_empty() {
        return Err(Error::bad_request("at least one working day is required"));
    }
    normalize_slots(Ledger::Doctors, &mut doctor.slots)?;
    if doctor.slots.is_empty() {
        return Err(Error::bad_request("at least one slot is required"));
    }
    for (day, slots) in doctor.special_schedule.iter_mut() {
        if *day > 6 {
            return Err(Error::bad_request(format!("weekday must be 0-6, got {day}")));
        }
        normalize_slots(Ledger::Doctors, slots)?;
    }
    if let Some(cabin) = doctor.cabin_number {
        if !CABIN_RANGE.contains(&cabin) {
            return Err(Error::bad_request(format!("cabin must be 1-9, got {cabin}")));
        }
    }
    Ok(())
}

fn validate_staff(member: &mut StaffMember) -> Result<()> {
    member.name = normalize_name(&member.name)?;
    if !member.standard_hours.is_finite() || member.standard_hours < 0.0 {
        return Err(Error::bad_request("standardHours must be zero or more"));
    }
    normalize_days(&mut member.working_days)?;
    if member.slots.is_empty() {
        member.slots = member.kind.default_slots();
    }
    normalize_slots(Ledger::Staff, &mut member.slots)
}

impl AppData {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Bring an older document up to [`DATA_VERSION`]: every entity gets a
    /// surrogate id and existing records are linked to it by name. Returns
    /// whether anything changed.
    pub fn migrate(&mut self) -> bool {
        let highest = self
            .doctors
            .iter()
            .map(|d| d.id)
            .chain(self.staff.iter().map(|s| s.id))
            .max()
            .unwrap_or(0);
        let raised = self.next_id < highest;
        self.next_id = self.next_id.max(highest);

        if self.version >= DATA_VERSION {
            return raised;
        }

        for index in 0..self.doctors.len() {
            if self.doctors[index].id == 0 {
                self.doctors[index].id = self.allocate_id();
            }
        }
        for index in 0..self.staff.len() {
            if self.staff[index].id == 0 {
                self.staff[index].id = self.allocate_id();
            }
        }

        for ledger in [Ledger::Doctors, Ledger::Staff] {
            let ids: Vec<(String, u64)> = match ledger {
                Ledger::Doctors => self.doctors.iter().map(|d| (d.name.clone(), d.id)).collect(),
                Ledger::Staff => self.staff.iter().map(|s| (s.name.clone(), s.id)).collect(),
            };
            let day_book = match ledger {
                Ledger::Doctors => &mut self.doctor_attendance,
                Ledger::Staff => &mut self.staff_attendance,
            };
            for record in day_book.values_mut().flatten() {
                if record.entity_id.is_none() {
                    record.entity_id = ids
                        .iter()
                        .find(|(name, _)| *name == record.entity_name)
                        .map(|(_, id)| *id);
                }
            }
        }

        info!(from = self.version, to = DATA_VERSION, "migrated data document");
        self.version = DATA_VERSION;
        true
    }

    pub fn add_doctor(&mut self, mut doctor: Doctor) -> Result<Doctor> {
        validate_doctor(&mut doctor)?;
        if self.doctors.iter().any(|d| d.name == doctor.name) {
            return Err(Error::Conflict(format!("doctor '{}' already exists", doctor.name)));
        }
        doctor.id = self.allocate_id();
        self.doctors.push(doctor.clone());
        Ok(doctor)
    }

    /// Replaces the doctor's profile. The active flag is kept; use
    /// [`AppData::set_doctor_active`] to change it.
    pub fn update_doctor(&mut self, id: u64, mut doctor: Doctor) -> Result<Doctor> {
        validate_doctor(&mut doctor)?;
        let index = self
            .doctors
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::NotFound(format!("doctor {id} not found")))?;
        if self.doctors.iter().any(|d| d.id != id && d.name == doctor.name) {
            return Err(Error::Conflict(format!("doctor '{}' already exists", doctor.name)));
        }
        let existing = &mut self.doctors[index];
        doctor.id = id;
        doctor.active = existing.active;
        *existing = doctor.clone();
        Ok(doctor)
    }

    pub fn set_doctor_active(&mut self, id: u64, active: bool) -> Result<Doctor> {
        let doctor = self
            .doctors
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::NotFound(format!("doctor {id} not found")))?;
        doctor.active = active;
        Ok(doctor.clone())
    }

    pub fn add_staff(&mut self, mut member: StaffMember) -> Result<StaffMember> {
        validate_staff(&mut member)?;
        if self.staff.iter().any(|s| s.name == member.name) {
            return Err(Error::Conflict(format!("staff member '{}' already exists", member.name)));
        }
        member.id = self.allocate_id();
        self.staff.push(member.clone());
        Ok(member)
    }

    pub fn update_staff(&mut self, id: u64, mut member: StaffMember) -> Result<StaffMember> {
        validate_staff(&mut member)?;
        let index = self
            .staff
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("staff member {id} not found")))?;
        if self.staff.iter().any(|s| s.id != id && s.name == member.name) {
            return Err(Error::Conflict(format!("staff member '{}' already exists", member.name)));
        }
        member.id = id;
        self.staff[index] = member.clone();
        Ok(member)
    }

    /// Hard delete. Attendance history stays, keyed by name.
    pub fn remove_staff(&mut self, id: u64) -> Result<StaffMember> {
        let index = self
            .staff
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("staff member {id} not found")))?;
        Ok(self.staff.remove(index))
    }

    pub fn add_holiday(&mut self, mut holiday: Holiday) -> Result<Holiday> {
        holiday.name = normalize_name(&holiday.name)?;
        if self.holidays.iter().any(|h| h.date == holiday.date) {
            return Err(Error::Conflict(format!(
                "a holiday is already declared on {}",
                date_key(holiday.date)
            )));
        }
        self.holidays.push(holiday.clone());
        self.holidays.sort_by_key(|h| h.date);
        Ok(holiday)
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> Result<Holiday> {
        let index = self
            .holidays
            .iter()
            .position(|h| h.date == date)
            .ok_or_else(|| Error::NotFound(format!("no holiday on {}", date_key(date))))?;
        Ok(self.holidays.remove(index))
    }
}
