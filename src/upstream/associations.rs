//! Contact → custom object association lookup.

use super::CrmClient;
use crate::config::Credential;
use crate::domain::wire::AssociationsResponse;
use crate::error::{OrderHistoryError, Result, UpstreamOperation};
use crate::http::{HttpClient, HttpRequest};

impl<H: HttpClient> CrmClient<H> {
    /// Resolve the ids of the custom-object records associated with a contact.
    ///
    /// Issues exactly one request. Ids come back in upstream order; an empty
    /// association set is a valid, empty result.
    #[tracing::instrument(skip(self, credential), fields(object_type_id = %self.config.object_type_id))]
    pub async fn resolve_associations(
        &self,
        contact_id: &str,
        credential: &Credential,
    ) -> Result<Vec<String>> {
        if contact_id.trim().is_empty() {
            return Err(OrderHistoryError::MissingParameter("contactId"));
        }

        let url = self.endpoint(&[
            "crm",
            "v3",
            "objects",
            "contacts",
            contact_id,
            "associations",
            self.config.object_type_id.as_str(),
        ])?;

        let body = self
            .send(
                UpstreamOperation::Associations,
                HttpRequest::get(url),
                credential,
            )
            .await?;

        let ids = serde_json::from_str::<AssociationsResponse>(&body)
            .map_err(|e| {
                tracing::error!(error = %e, body = %body, "Malformed associations response");
                e
            })?
            .into_ids();

        tracing::debug!(associated = ids.len(), "Resolved associations");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::CrmConfig;
    use crate::http::{HttpResponse, MockHttpClient};

    const ASSOC_PATH: &str = "GET /crm/v3/objects/contacts/42/associations/2-46785961";

    fn setup() -> (Arc<MockHttpClient>, CrmClient<MockHttpClient>) {
        let http = Arc::new(MockHttpClient::new());
        let client = CrmClient::new(http.clone(), CrmConfig::default());
        (http, client)
    }

    #[tokio::test]
    async fn test_resolve_returns_ids_in_upstream_order() {
        let (http, client) = setup();
        http.add_json_response(
            ASSOC_PATH,
            200,
            serde_json::json!({"results": [{"id": "9"}, {"id": "3"}, {"id": "5"}]}),
        );

        let ids = client
            .resolve_associations("42", &Credential::new("token"))
            .await
            .unwrap();
        assert_eq!(ids, vec!["9", "3", "5"]);

        let calls = http.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].token, "token");
        assert_eq!(calls[0].timeout_ms, 30_000);
        assert!(calls[0].body.is_none());
    }

    #[tokio::test]
    async fn test_resolve_empty_results_is_not_an_error() {
        let (http, client) = setup();
        http.add_json_response(ASSOC_PATH, 200, serde_json::json!({"results": []}));

        let ids = client
            .resolve_associations("42", &Credential::default())
            .await
            .unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_rejects_blank_contact_without_network() {
        let (http, client) = setup();

        for contact in ["", "   "] {
            let err = client
                .resolve_associations(contact, &Credential::default())
                .await
                .unwrap_err();
            assert!(matches!(err, OrderHistoryError::MissingParameter("contactId")));
        }
        assert_eq!(http.call_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_wraps_non_2xx_with_body() {
        let (http, client) = setup();
        http.add_response(
            ASSOC_PATH,
            Ok(HttpResponse {
                status: 403,
                body: r#"{"category":"MISSING_SCOPES"}"#.to_string(),
            }),
        );

        let err = client
            .resolve_associations("42", &Credential::new("token"))
            .await
            .unwrap_err();
        match err {
            OrderHistoryError::Upstream {
                operation,
                status,
                body,
            } => {
                assert_eq!(operation, UpstreamOperation::Associations);
                assert_eq!(status, 403);
                assert!(body.contains("MISSING_SCOPES"));
            }
            other => panic!("Expected Upstream error, got {:?}", other),
        }
        // No retry
        assert_eq!(http.call_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_malformed_body_is_serialization_error() {
        let (http, client) = setup();
        http.add_response(
            ASSOC_PATH,
            Ok(HttpResponse {
                status: 200,
                body: "<html>gateway</html>".to_string(),
            }),
        );

        let err = client
            .resolve_associations("42", &Credential::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderHistoryError::Serialization(_)));
        assert_eq!(err.status_code(), 500);
    }
}
