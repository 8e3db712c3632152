use chrono::NaiveDate;

use crate::error::ApiError;

pub fn validate_count(value: usize) -> Result<usize, ApiError> {
    if (1..=12).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest("count must be between 1 and 12".into()))
    }
}

pub fn validate_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

pub fn validate_user_id(value: &str) -> Result<&str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::BadRequest("user_id must not be empty".into()))
    } else {
        Ok(trimmed)
    }
}
