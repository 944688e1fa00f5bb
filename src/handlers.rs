use crate::calendar::{date_key, parse_date_key, parse_range, weekday_name, weekday_number, Calendar};
use crate::errors::{AppError, Result};
use crate::export::{
    analytics_table, export_filename, no_show_table, records_table, render_csv, ReportKind,
};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::{
    AnalyticsResponse, AttendanceRecord, Doctor, Holiday, Ledger, NoShowResponse, RangeQuery,
    RosterKind, SaveResponse, StaffKind, StaffMember, DATA_VERSION,
};
use crate::noshow::build_no_show;
use crate::schedule::{cabin_occupancy, expected_on, CabinReport, SlotRoster};
use crate::state::AppState;
use crate::stats::build_analytics;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

fn optional_range(query: &RangeQuery) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
    if blank(&query.start_date) && blank(&query.end_date) {
        return Ok(None);
    }
    required_range(query).map(Some)
}

fn required_range(query: &RangeQuery) -> Result<(NaiveDate, NaiveDate)> {
    parse_range(query.start_date.as_deref(), query.end_date.as_deref())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    data_version: u32,
    doctors: usize,
    staff: usize,
    recorded_days: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let response = state
        .read(|data| HealthResponse {
            status: "ok",
            data_version: DATA_VERSION,
            doctors: data.doctors.len(),
            staff: data.staff.len(),
            recorded_days: data.doctor_attendance.len() + data.staff_attendance.len(),
        })
        .await;
    Json(response)
}

pub async fn list_attendance(
    State(state): State<AppState>,
    AppPath(ledger): AppPath<String>,
    AppQuery(query): AppQuery<RangeQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let ledger: Ledger = ledger.parse()?;
    let range = optional_range(&query)?;
    let records = state
        .read(|data| match range {
            Some((start, end)) => data.records_in_range(ledger, start, end),
            None => data.all_records(ledger),
        })
        .await;
    Ok(Json(records))
}

pub async fn get_attendance_day(
    State(state): State<AppState>,
    AppPath((ledger, date)): AppPath<(String, String)>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let ledger: Ledger = ledger.parse()?;
    let date = parse_date_key(&date)?;
    Ok(Json(state.read(|data| data.records_on(ledger, date)).await))
}

pub async fn save_attendance_day(
    State(state): State<AppState>,
    AppPath((ledger, date)): AppPath<(String, String)>,
    AppJson(records): AppJson<Vec<AttendanceRecord>>,
) -> Result<Json<SaveResponse>, AppError> {
    let ledger: Ledger = ledger.parse()?;
    let date = parse_date_key(&date)?;
    let saved = state
        .write(|data| data.replace_date(ledger, date, records))
        .await?;

    info!(%ledger, date = %date_key(date), saved, "replaced attendance for date");
    Ok(Json(SaveResponse {
        date: date_key(date),
        ledger,
        saved,
    }))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    AppPath(roster): AppPath<String>,
    AppQuery(query): AppQuery<RangeQuery>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let kind: RosterKind = roster.parse()?;
    let (start, end) = required_range(&query)?;
    let report = state
        .read(|data| build_analytics(data, kind, start, end))
        .await?;
    Ok(Json(report))
}

pub async fn get_no_show(
    State(state): State<AppState>,
    AppPath(ledger): AppPath<String>,
    AppQuery(query): AppQuery<RangeQuery>,
) -> Result<Json<NoShowResponse>, AppError> {
    let ledger: Ledger = ledger.parse()?;
    let (start, end) = required_range(&query)?;
    let report = state
        .read(|data| build_no_show(&data.records_in_range(ledger, start, end), ledger, start, end))
        .await;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    ledger: Option<String>,
    roster: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

pub async fn export_csv(
    State(state): State<AppState>,
    AppPath(report): AppPath<String>,
    AppQuery(query): AppQuery<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let kind: ReportKind = report.parse()?;
    let range_query = RangeQuery {
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let ledger: Ledger = query.ledger.as_deref().unwrap_or("doctors").parse()?;

    let (rows, range) = match kind {
        ReportKind::Attendance => {
            let range = optional_range(&range_query)?;
            let records = state
                .read(|data| match range {
                    Some((start, end)) => data.records_in_range(ledger, start, end),
                    None => data.all_records(ledger),
                })
                .await;
            (records_table(ledger, &records), range)
        }
        ReportKind::Analytics => {
            let roster: RosterKind = query.roster.as_deref().unwrap_or("doctors").parse()?;
            let (start, end) = required_range(&range_query)?;
            let report = state
                .read(|data| build_analytics(data, roster, start, end))
                .await?;
            (analytics_table(&report), Some((start, end)))
        }
        ReportKind::NoShow => {
            let (start, end) = required_range(&range_query)?;
            let report = state
                .read(|data| {
                    build_no_show(&data.records_in_range(ledger, start, end), ledger, start, end)
                })
                .await;
            (no_show_table(&report), Some((start, end)))
        }
    };

    let body = render_csv(&rows)?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(kind, range));
    info!(report = kind.as_str(), rows = rows.len(), "exported csv");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    date: String,
    day_name: &'static str,
    non_working_day: bool,
    holiday: Option<String>,
    doctors: Vec<SlotRoster>,
    staff: Vec<SlotRoster>,
}

pub async fn get_schedule(
    State(state): State<AppState>,
    AppPath(date): AppPath<String>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let date = parse_date_key(&date)?;
    let response = state
        .read(|data| {
            let calendar = Calendar::new(&data.holidays);
            ScheduleResponse {
                date: date_key(date),
                day_name: weekday_name(weekday_number(date)).unwrap_or_default(),
                non_working_day: calendar.is_non_working_day(date),
                holiday: data
                    .holidays
                    .iter()
                    .find(|h| h.date == date)
                    .map(|h| h.name.clone()),
                doctors: expected_on(&calendar, Ledger::Doctors, &data.doctors, date),
                staff: expected_on(&calendar, Ledger::Staff, &data.staff, date),
            }
        })
        .await;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct CabinQuery {
    day: u8,
    slot: Option<u8>,
    cabin: Option<u8>,
}

pub async fn get_cabins(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CabinQuery>,
) -> Result<Json<CabinReport>, AppError> {
    let report = state
        .read(|data| cabin_occupancy(&data.doctors, query.day, query.slot, query.cabin))
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    active: Option<bool>,
    kind: Option<String>,
}

pub async fn list_doctors(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RosterQuery>,
) -> Json<Vec<Doctor>> {
    let doctors: Vec<Doctor> = state
        .read(|data| {
            data.doctors
                .iter()
                .filter(|d| query.active.is_none_or(|active| d.active == active))
                .cloned()
                .collect()
        })
        .await;
    Json(doctors)
}

pub async fn create_doctor(
    State(state): State<AppState>,
    AppJson(doctor): AppJson<Doctor>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    let created = state.write(|data| data.add_doctor(doctor)).await?;
    info!(id = created.id, name = %created.name, "added doctor");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(doctor): AppJson<Doctor>,
) -> Result<Json<Doctor>, AppError> {
    let updated = state.write(|data| data.update_doctor(id, doctor)).await?;
    info!(id, name = %updated.name, "updated doctor");
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    active: bool,
}

pub async fn set_doctor_active(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(payload): AppJson<ActiveRequest>,
) -> Result<Json<Doctor>, AppError> {
    let doctor = state
        .write(|data| data.set_doctor_active(id, payload.active))
        .await?;
    info!(id, active = doctor.active, "changed doctor status");
    Ok(Json(doctor))
}

pub async fn list_staff(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RosterQuery>,
) -> Result<Json<Vec<StaffMember>>, AppError> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<StaffKind>)
        .transpose()?;
    let staff: Vec<StaffMember> = state
        .read(|data| {
            data.staff
                .iter()
                .filter(|s| kind.is_none_or(|kind| s.kind == kind))
                .filter(|s| query.active.is_none_or(|active| s.active == active))
                .cloned()
                .collect()
        })
        .await;
    Ok(Json(staff))
}

pub async fn create_staff(
    State(state): State<AppState>,
    AppJson(member): AppJson<StaffMember>,
) -> Result<(StatusCode, Json<StaffMember>), AppError> {
    let created = state.write(|data| data.add_staff(member)).await?;
    info!(id = created.id, name = %created.name, kind = ?created.kind, "added staff member");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_staff(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(member): AppJson<StaffMember>,
) -> Result<Json<StaffMember>, AppError> {
    let updated = state.write(|data| data.update_staff(id, member)).await?;
    info!(id, name = %updated.name, "updated staff member");
    Ok(Json(updated))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<StaffMember>, AppError> {
    let removed = state.write(|data| data.remove_staff(id)).await?;
    info!(id, name = %removed.name, "removed staff member");
    Ok(Json(removed))
}

pub async fn list_holidays(State(state): State<AppState>) -> Json<Vec<Holiday>> {
    Json(state.read(|data| data.holidays.clone()).await)
}

pub async fn create_holiday(
    State(state): State<AppState>,
    AppJson(holiday): AppJson<Holiday>,
) -> Result<(StatusCode, Json<Holiday>), AppError> {
    let created = state.write(|data| data.add_holiday(holiday)).await?;
    info!(date = %created.date, name = %created.name, "declared holiday");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_holiday(
    State(state): State<AppState>,
    AppPath(date): AppPath<String>,
) -> Result<Json<Holiday>, AppError> {
    let date = parse_date_key(&date)?;
    let removed = state.write(|data| data.remove_holiday(date)).await?;
    info!(date = %removed.date, "removed holiday");
    Ok(Json(removed))
}
