//! Friday evening signups.
//!
//! The Friday evening slot is anchored to UTC so every member sees the same
//! evening regardless of where they are. Local display grouping lives in
//! [`crate::local_day`].

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use thiserror::Error;
use tracing::debug;

use crate::models::{Appointment, AttendanceLevel, FridayEvening, NewAppointment};
use crate::settings::Settings;
use crate::timestamp::parse_schedule;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignupError {
    #[error("{0} is not a Friday")]
    NotFriday(NaiveDate),
    #[error("{0} is in the past")]
    PastFriday(NaiveDate),
    #[error("Signups for {0} are closed")]
    Disabled(NaiveDate),
    #[error("User {user_id} is already signed up for {date}")]
    AlreadySignedUp { user_id: String, date: NaiveDate },
    #[error("Signup hour {0} is not a valid hour of day")]
    InvalidStartHour(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FridayRules {
    pub evening_start_hour: u32,
    pub signup_start_hour: u32,
    pub signup_duration_minutes: u32,
    pub min_attendance: usize,
    pub fridays_to_show: usize,
    pub disabled_fridays: Vec<NaiveDate>,
}

impl Default for FridayRules {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl FridayRules {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            evening_start_hour: settings.evening_start_hour,
            signup_start_hour: settings.signup_start_hour,
            signup_duration_minutes: settings.signup_duration_minutes,
            min_attendance: settings.min_attendance,
            fridays_to_show: settings.fridays_to_show,
            disabled_fridays: settings.disabled_fridays.clone(),
        }
    }

    /// Holiday closures: the Friday is shown but nobody can sign up.
    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        self.disabled_fridays.contains(&date)
    }
}

/// `count` Fridays starting from `today` (inclusive when today is a Friday).
pub fn next_fridays(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let days_until = (Weekday::Fri.num_days_from_monday() + 7
        - today.weekday().num_days_from_monday())
        % 7;
    let first = today + Duration::days(days_until.into());
    (0..count)
        .map(|i| first + Duration::weeks(i as i64))
        .collect()
}

/// True when the appointment falls on `friday` (UTC) at or after the evening start hour.
pub fn is_evening_slot(
    appointment: &Appointment,
    friday: NaiveDate,
    evening_start_hour: u32,
) -> bool {
    parse_schedule(&appointment.schedule)
        .is_some_and(|dt| dt.date_naive() == friday && dt.hour() >= evening_start_hour)
}

pub fn aggregate_attendance(
    appointments: &[Appointment],
    friday: NaiveDate,
    evening_start_hour: u32,
) -> BTreeSet<String> {
    appointments
        .iter()
        .filter(|appointment| is_evening_slot(appointment, friday, evening_start_hour))
        .map(|appointment| appointment.user_id.clone())
        .collect()
}

pub fn classify_attendance_level(count: usize, threshold: usize) -> AttendanceLevel {
    if count >= threshold {
        AttendanceLevel::Sufficient
    } else {
        AttendanceLevel::Insufficient
    }
}

/// One bucket per upcoming Friday. Without a known current user nobody is
/// reported as attending.
pub fn friday_evenings(
    appointments: &[Appointment],
    today: NaiveDate,
    current_user: Option<&str>,
    rules: &FridayRules,
) -> Vec<FridayEvening> {
    next_fridays(today, rules.fridays_to_show)
        .into_iter()
        .map(|date| {
            let attendees = aggregate_attendance(appointments, date, rules.evening_start_hour);
            let is_user_attending = current_user.is_some_and(|user| attendees.contains(user));
            FridayEvening {
                date,
                level: classify_attendance_level(attendees.len(), rules.min_attendance),
                is_user_attending,
                disabled: rules.is_disabled(date),
                attendees: attendees.into_iter().collect(),
            }
        })
        .collect()
}

pub fn find_user_evening_appointment<'a>(
    appointments: &'a [Appointment],
    friday: NaiveDate,
    user_id: &str,
    evening_start_hour: u32,
) -> Option<&'a Appointment> {
    appointments.iter().find(|appointment| {
        appointment.user_id == user_id && is_evening_slot(appointment, friday, evening_start_hour)
    })
}

/// Builds the appointment a signup for `friday` would create. The duplicate
/// check only covers what the caller has fetched; the backend has the final say.
pub fn plan_signup(
    appointments: &[Appointment],
    friday: NaiveDate,
    user_id: &str,
    today: NaiveDate,
    rules: &FridayRules,
) -> Result<NewAppointment, SignupError> {
    if friday.weekday() != Weekday::Fri {
        return Err(SignupError::NotFriday(friday));
    }
    if friday < today {
        return Err(SignupError::PastFriday(friday));
    }
    if rules.is_disabled(friday) {
        return Err(SignupError::Disabled(friday));
    }
    if let Some(existing) =
        find_user_evening_appointment(appointments, friday, user_id, rules.evening_start_hour)
    {
        debug!(id = %existing.id, %user_id, %friday, "rejecting duplicate signup");
        return Err(SignupError::AlreadySignedUp {
            user_id: user_id.to_string(),
            date: friday,
        });
    }

    let start = NaiveTime::from_hms_opt(rules.signup_start_hour, 0, 0)
        .ok_or(SignupError::InvalidStartHour(rules.signup_start_hour))?;
    Ok(NewAppointment {
        schedule: friday.and_time(start).and_utc(),
        duration: rules.signup_duration_minutes,
        user_id: user_id.to_string(),
    })
}
