//! CADIN provider HTTP client
//!
//! One GET per lookup against whichever backend the request names:
//!
//! | Provider         | Path                          | Auth                     | Timeout |
//! |------------------|-------------------------------|--------------------------|---------|
//! | General gateway  | `/cadin/{digits}`             | `X-API-Key`              | 40s     |
//! | Direct (SERPRO)  | `/cadin/v1/consulta/{digits}` | `Authorization: Bearer`  | 40s     |
//! | Municipal PF     | `/cadin/pmspspf/{digits}`     | `X-API-Key`, `?dtnasc=`  | 45s     |
//! | Municipal PJ     | `/cadin/pmspspj/{digits}`     | `X-API-Key`              | 45s     |
//!
//! Bodies are returned as untyped JSON objects. Interpreting them is the
//! adapter's job, not ours.

use std::time::Duration;

use super::domain::{CadinError, CallFailure, Provider, ProviderRequest, RawPayload};
use super::settings::ProviderSettings;

const API_KEY_HEADER: &str = "X-API-Key";

/// Longest response body excerpt kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// HTTP client for every CADIN provider
pub struct HttpProviderClient {
    settings: ProviderSettings,
    http_client: reqwest::Client,
    timeout_override: Option<Duration>,
}

impl HttpProviderClient {
    /// Create a client for the endpoints in `settings`
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses
    /// - Send User-Agent header identifying the application
    pub fn new(settings: &ProviderSettings) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            settings: settings.clone(),
            http_client,
            timeout_override: None,
        })
    }

    /// Use a shorter deadline than the provider default (tests only)
    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_override = Some(timeout);
        self
    }

    /// Fetch the raw payload for `request`
    pub async fn fetch(&self, request: &ProviderRequest) -> Result<RawPayload, CadinError> {
        let provider = request.provider;
        let endpoint = self.settings.endpoint(provider);
        if !endpoint.is_configured() {
            return Err(CadinError::ProviderNotConfigured(provider));
        }

        let url = endpoint.url(&provider.path(request.document.digits()));
        let timeout = self.timeout_override.unwrap_or_else(|| provider.timeout());

        let mut builder = self.http_client.get(&url).timeout(timeout);
        builder = match provider {
            Provider::DirectBackend => builder.bearer_auth(&endpoint.credential),
            Provider::GeneralGateway | Provider::MunicipalPf | Provider::MunicipalPj => {
                builder.header(API_KEY_HEADER, &endpoint.credential)
            }
        };

        if provider == Provider::MunicipalPf {
            let birth_date = request
                .birth_date
                .as_ref()
                .ok_or_else(CadinError::missing_birth_date)?;
            builder = builder.query(&[("dtnasc", birth_date.as_str())]);
        }

        tracing::debug!(provider = %provider, url = %url, "Calling CADIN provider");

        let response = builder
            .send()
            .await
            .map_err(|e| CadinError::call_failed(provider, transport_failure(&e)))?;

        let status = response.status();
        if !status.is_success() {
            // Keep a bit of the body, gateways usually explain themselves
            let body = response.text().await.unwrap_or_default();
            return Err(CadinError::call_failed(
                provider,
                CallFailure::Status {
                    code: status.as_u16(),
                    body: body.chars().take(ERROR_BODY_LIMIT).collect(),
                },
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CadinError::call_failed(provider, transport_failure(&e)))?;

        serde_json::from_str::<RawPayload>(&body)
            .map_err(|e| CadinError::call_failed(provider, CallFailure::Parse(e.to_string())))
    }
}

/// Deadline expiry is reported separately; everything else is a network failure.
fn transport_failure(error: &reqwest::Error) -> CallFailure {
    if error.is_timeout() {
        CallFailure::Timeout
    } else {
        CallFailure::Network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadin::domain::BirthDate;
    use crate::cadin::settings::Endpoint;
    use crate::document::Document;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(base_url: &str) -> ProviderSettings {
        ProviderSettings {
            gateway: Endpoint::new(base_url, "gw-key"),
            direct: Endpoint::new(format!("{base_url}/"), "serpro-token"),
            municipal: Endpoint::new(base_url, "pmsp-key"),
            municipal_enabled: true,
            ..Default::default()
        }
    }

    fn request(provider: Provider, doc: &str) -> ProviderRequest {
        ProviderRequest::new(provider, Document::parse(doc).unwrap())
    }

    #[tokio::test]
    async fn test_gateway_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cadin/12345678909"))
            .and(header("X-API-Key", "gw-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nome": "Maria"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpProviderClient::new(&settings_for(&server.uri())).unwrap();
        let payload = client
            .fetch(&request(Provider::GeneralGateway, "123.456.789-09"))
            .await
            .unwrap();

        assert_eq!(payload["nome"], "Maria");
    }

    #[tokio::test]
    async fn test_direct_backend_uses_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cadin/v1/consulta/12345678000195"))
            .and(header("Authorization", "Bearer serpro-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"situacao": "REGULAR"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpProviderClient::new(&settings_for(&server.uri())).unwrap();
        let payload = client
            .fetch(&request(Provider::DirectBackend, "12345678000195"))
            .await
            .unwrap();

        assert_eq!(payload["situacao"], "REGULAR");
    }

    #[tokio::test]
    async fn test_municipal_pf_sends_birth_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cadin/pmspspf/12345678909"))
            .and(query_param("dtnasc", "01/01/1990"))
            .and(header("X-API-Key", "pmsp-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cpf": "12345678909"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpProviderClient::new(&settings_for(&server.uri())).unwrap();
        let req = request(Provider::MunicipalPf, "12345678909")
            .with_birth_date(BirthDate::parse("01/01/1990").unwrap());

        let payload = client.fetch(&req).await.unwrap();
        assert_eq!(payload["cpf"], "12345678909");
    }

    #[tokio::test]
    async fn test_municipal_pf_without_birth_date_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = HttpProviderClient::new(&settings_for(&server.uri())).unwrap();
        let result = client.fetch(&request(Provider::MunicipalPf, "12345678909")).await;

        assert!(matches!(result, Err(CadinError::MissingRequiredParameter(_))));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cadin/pmspspj/12345678000195"))
            .respond_with(ResponseTemplate::new(502).set_body_string("captcha solver offline"))
            .mount(&server)
            .await;

        let client = HttpProviderClient::new(&settings_for(&server.uri())).unwrap();
        let err = client
            .fetch(&request(Provider::MunicipalPj, "12345678000195"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CadinError::call_failed(
                Provider::MunicipalPj,
                CallFailure::Status {
                    code: 502,
                    body: "captcha solver offline".to_string(),
                }
            )
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = HttpProviderClient::new(&settings_for(&server.uri())).unwrap();
        let err = client
            .fetch(&request(Provider::GeneralGateway, "12345678909"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CadinError::ProviderCallFailed {
                cause: CallFailure::Parse(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_json_array_body_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;

        let client = HttpProviderClient::new(&settings_for(&server.uri())).unwrap();
        let err = client
            .fetch(&request(Provider::GeneralGateway, "12345678909"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CadinError::ProviderCallFailed {
                cause: CallFailure::Parse(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpProviderClient::new(&settings_for(&server.uri()))
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        let err = client
            .fetch(&request(Provider::GeneralGateway, "12345678909"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CadinError::call_failed(Provider::GeneralGateway, CallFailure::Timeout)
        );
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let client = HttpProviderClient::new(&ProviderSettings::default()).unwrap();
        let err = client
            .fetch(&request(Provider::DirectBackend, "12345678909"))
            .await
            .unwrap_err();

        assert_eq!(err, CadinError::ProviderNotConfigured(Provider::DirectBackend));
    }
}
