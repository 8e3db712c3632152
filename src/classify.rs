use chrono::{DateTime, NaiveTime, Utc};
use tracing::debug;

use crate::models::{Appointment, TimeGroups};
use crate::timestamp::parse_schedule;

/// Midnight UTC of the day containing `reference`.
pub fn start_of_day_utc(reference: DateTime<Utc>) -> DateTime<Utc> {
    reference.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// An appointment is past when it starts strictly before the reference day.
/// Unparsable schedules count as past so they never show up as upcoming.
pub fn is_past(appointment: &Appointment, reference: DateTime<Utc>) -> bool {
    match parse_schedule(&appointment.schedule) {
        Some(schedule) => schedule < start_of_day_utc(reference),
        None => {
            debug!(
                id = %appointment.id,
                schedule = %appointment.schedule,
                "unparsable schedule classified as past"
            );
            true
        }
    }
}

pub fn filter_future(appointments: &[Appointment], reference: DateTime<Utc>) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|appointment| !is_past(appointment, reference))
        .cloned()
        .collect()
}

pub fn group_by_time(appointments: &[Appointment], reference: DateTime<Utc>) -> TimeGroups {
    let (past, future): (Vec<Appointment>, Vec<Appointment>) = appointments
        .iter()
        .cloned()
        .partition(|appointment| is_past(appointment, reference));
    TimeGroups { past, future }
}
