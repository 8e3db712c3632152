use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::models::{Appointment, Invite, NewAppointment};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend URL cannot carry a path: {0}")]
    BaseUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ClientError::Http(err) => err.status(),
            ClientError::BaseUrl(_) => None,
        }
    }
}

/// Typed client for the club backend. No retries: failures go straight back
/// to the handler that asked.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Arc<Url>,
    token: Option<Arc<str>>,
}

impl BackendClient {
    pub fn new(base_url: Url, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Arc::new(base_url),
            token: token.map(Arc::from),
        }
    }

    /// Appends `segments` to the base path, percent-encoding each one so an
    /// opaque id can never add path levels, a query or a fragment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = (*self.base_url).clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.endpoint(segments)?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        self.get_json(&["appointments"]).await
    }

    pub async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, ClientError> {
        let url = self.endpoint(&["appointments"])?;
        let response = self
            .authorize(self.client.post(url))
            .json(appointment)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn delete_appointment(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["appointments", id])?;
        self.authorize(self.client.delete(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn list_invites(&self) -> Result<Vec<Invite>, ClientError> {
        self.get_json(&["invites"]).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let client = BackendClient::new(Url::parse("https://club.example/api/").unwrap(), None);
        assert_eq!(
            client.endpoint(&["appointments"]).unwrap().as_str(),
            "https://club.example/api/appointments"
        );

        let bare = BackendClient::new(Url::parse("https://club.example").unwrap(), None);
        assert_eq!(
            bare.endpoint(&["invites"]).unwrap().as_str(),
            "https://club.example/invites"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let client = BackendClient::new(Url::parse("https://club.example/api/").unwrap(), None);
        let url = client.endpoint(&["appointments", "x?y=1"]).unwrap();
        assert_eq!(url.as_str(), "https://club.example/api/appointments/x%3Fy=1");
        assert_eq!(url.query(), None);

        let url = client.endpoint(&["appointments", "a/b#c"]).unwrap();
        assert_eq!(url.path(), "/api/appointments/a%2Fb%23c");
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn test_delete_with_reserved_characters_stays_on_its_resource() {
        let server = MockServer::start();
        let wrong_target = server.mock(|when, then| {
            when.method(DELETE).path("/appointments/x");
            then.status(204);
        });

        let client = BackendClient::new(Url::parse(&server.base_url()).unwrap(), None);
        let result = client.delete_appointment("x?y").await;

        assert_eq!(wrong_target.calls(), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_numeric_ids_are_accepted() {
        let appointments: Vec<Appointment> = serde_json::from_value(serde_json::json!([
            {"id": 5, "schedule": "2025-01-17T19:00:00Z", "duration": 120, "user_id": 7},
            {"id": "abc", "schedule": "2025-01-17T19:00:00Z", "duration": 120, "user_id": "u1"}
        ]))
        .unwrap();

        assert_eq!(appointments[0].id, "5");
        assert_eq!(appointments[0].user_id, "7");
        assert_eq!(appointments[1].id, "abc");
    }

    #[tokio::test]
    async fn test_list_appointments_forwards_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/appointments")
                .header("authorization", "Bearer backend-secret");
            then.status(200).json_body(serde_json::json!([
                {"id": "1", "schedule": "2025-01-17T19:00:00.000Z", "duration": 120, "user_id": "u1"},
                {"id": "2", "schedule": "invalid-date", "duration": 60, "user_id": "u2"}
            ]));
        });

        let client = BackendClient::new(
            Url::parse(&server.base_url()).unwrap(),
            Some("backend-secret".to_string()),
        );
        let appointments = client.list_appointments().await.unwrap();

        mock.assert();
        assert_eq!(appointments.len(), 2);
        assert_eq!(appointments[1].schedule, "invalid-date");
    }

    #[tokio::test]
    async fn test_backend_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/invites");
            then.status(500);
        });

        let client = BackendClient::new(Url::parse(&server.base_url()).unwrap(), None);
        let err = client.list_invites().await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    }
}
