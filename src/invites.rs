use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::{ActiveInvite, Invite};
use crate::timestamp::parse_schedule;

/// Invites with an unreadable expiry are treated as expired.
pub fn is_expired(invite: &Invite, reference: DateTime<Utc>) -> bool {
    parse_schedule(&invite.expires_at).is_none_or(|expires| expires <= reference)
}

pub fn active_invites(invites: &[Invite], reference: DateTime<Utc>) -> Vec<Invite> {
    invites
        .iter()
        .filter(|invite| !is_expired(invite, reference))
        .cloned()
        .collect()
}

pub fn display_expiry(invite: &Invite, tz: Tz) -> String {
    match parse_schedule(&invite.expires_at) {
        Some(expires) => expires.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
        None => "unknown".to_string(),
    }
}

pub fn to_active(invite: &Invite, tz: Tz) -> ActiveInvite {
    ActiveInvite {
        token: invite.token.clone(),
        email: invite.email.clone(),
        expires: display_expiry(invite, tz),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn invite(token: &str, expires_at: &str) -> Invite {
        Invite {
            token: token.to_string(),
            email: format!("{token}@example.com"),
            expires_at: expires_at.to_string(),
        }
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_is_expired_across_formats() {
        assert!(!is_expired(&invite("iso", "2025-01-20T00:00:00Z"), reference()));
        assert!(!is_expired(&invite("epoch", "1737140400000"), reference()));
        assert!(!is_expired(&invite("locale", "1/17/2025, 7:00:00 PM"), reference()));
        assert!(is_expired(&invite("old", "2025-01-01T00:00:00Z"), reference()));
        assert!(is_expired(&invite("exact", "2025-01-15T12:00:00Z"), reference()));
        assert!(is_expired(&invite("broken", "Invalid Date"), reference()));
    }

    #[test]
    fn test_active_invites_preserves_order() {
        let invites = vec![
            invite("b", "2025-02-01T00:00:00Z"),
            invite("old", "2024-12-01T00:00:00Z"),
            invite("a", "1737140400000"),
        ];
        let tokens: Vec<_> = active_invites(&invites, reference())
            .into_iter()
            .map(|i| i.token)
            .collect();
        assert_eq!(tokens, vec!["b", "a"]);
    }

    #[test]
    fn test_display_expiry() {
        assert_eq!(
            display_expiry(&invite("a", "1737140400000"), chrono_tz::UTC),
            "2025-01-17 19:00"
        );
        assert_eq!(
            display_expiry(&invite("a", "2025-01-18T03:00:00Z"), chrono_tz::America::Los_Angeles),
            "2025-01-17 19:00"
        );
        assert_eq!(display_expiry(&invite("a", "garbage"), chrono_tz::UTC), "unknown");
    }
}
