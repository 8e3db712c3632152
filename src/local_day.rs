//! Grouping of appointments by the calendar day the viewer experiences them.
//!
//! This is deliberately separate from the UTC day used by the Friday evening
//! logic in [`crate::friday`]: a 19:00 Pacific appointment is serialized as
//! 03:00Z the next day but must still be listed under the local Friday.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::models::{Appointment, LocalDayGroup};
use crate::timestamp::parse_schedule;

/// Calendar date of `instant` in the viewer's timezone.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Groups appointments by local calendar date, days in chronological order and
/// appointments ascending by start time within a day. Appointments with the
/// same start keep their input order. Unparsable schedules cannot be placed
/// on a day and are left out.
pub fn group_by_local_date(appointments: &[Appointment], tz: Tz) -> Vec<LocalDayGroup> {
    let mut parsed: Vec<(DateTime<Utc>, &Appointment)> = appointments
        .iter()
        .filter_map(|appointment| match parse_schedule(&appointment.schedule) {
            Some(instant) => Some((instant, appointment)),
            None => {
                debug!(id = %appointment.id, "skipping appointment with unparsable schedule");
                None
            }
        })
        .collect();
    parsed.sort_by_key(|(instant, _)| *instant);

    let mut days: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
    for (instant, appointment) in parsed {
        days.entry(local_date(instant, tz))
            .or_default()
            .push(appointment.clone());
    }

    days.into_iter()
        .map(|(date, appointments)| LocalDayGroup { date, appointments })
        .collect()
}
