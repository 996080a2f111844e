//! # SenCare Client
//!
//! [`HttpPatientStore`] implements [`PatientStore`] against the SenCare REST API, so the core
//! services can run against a remote store exactly as they do against
//! [`MemoryStore`](sencare_core::MemoryStore).
//!
//! Every response is checked twice: the HTTP status, and the `status` field of the body
//! envelope. A 2xx response whose envelope is missing or not `"success"` is still a failure.
//! Bodies that do not decode are reported with the path of the offending field.

mod config;

pub use config::{ClientConfig, API_KEY_ENV, API_URL_ENV, DEFAULT_API_URL, TIMEOUT_ENV};

use api_shared::{Envelope, PatientBody, PatientInput, ReadingBody, ReadingInput, API_KEY_HEADER};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use sencare_core::{
    ClinicalReading, NewPatient, NewReading, PatientError, PatientRecord, PatientResult,
    PatientStore,
};
use serde::de::{DeserializeOwned, IgnoredAny};

#[derive(Clone, Debug)]
pub struct HttpPatientStore {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpPatientStore {
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidConfig`] if the base URL does not parse or the HTTP
    /// client cannot be built.
    pub fn new(config: &ClientConfig) -> PatientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| PatientError::InvalidConfig(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(PatientError::InvalidConfig(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| PatientError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> PatientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PatientError::InvalidConfig(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> PatientResult<RequestBuilder> {
        let builder = self.http.request(method, self.url(segments)?);
        Ok(match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        })
    }

    /// Sends a request and unwraps the envelope, returning its `data` if present.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> PatientResult<Option<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| PatientError::Transport(format!("{what}: {e}")))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PatientError::Transport(format!("{what}: {e}")))?;
        tracing::debug!("{} -> {} ({} bytes)", what, status, bytes.len());

        let envelope: Envelope<T> = match decode_envelope(&bytes) {
            Ok(envelope) => envelope,
            Err(detail) if status.is_success() => {
                return Err(PatientError::MalformedResponse(format!("{what}: {detail}")));
            }
            Err(_) => return Err(http_failure(status, what, None)),
        };

        if !status.is_success() {
            return Err(http_failure(status, what, envelope.message));
        }
        envelope.into_data()
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> PatientResult<T> {
        self.send(builder, what).await?.ok_or_else(|| {
            PatientError::MalformedResponse(format!("{what}: success response without data"))
        })
    }
}

fn http_failure(status: StatusCode, what: &str, message: Option<String>) -> PatientError {
    let message = message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned()
    });
    if status == StatusCode::NOT_FOUND {
        PatientError::NotFound(format!("{what}: {message}"))
    } else {
        PatientError::Rejected {
            status: status.as_u16().to_string(),
            message: format!("{what}: {message}"),
        }
    }
}

fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<Envelope<T>, String> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>"
        } else {
            path.as_str()
        };
        format!("unexpected body at {path}: {source}")
    })
}

#[async_trait]
impl PatientStore for HttpPatientStore {
    async fn list_patients(&self) -> PatientResult<Vec<PatientRecord>> {
        let bodies: Vec<PatientBody> = self
            .fetch(self.request(Method::GET, &["patients"])?, "list patients")
            .await?;
        Ok(bodies.into_iter().map(PatientRecord::from).collect())
    }

    async fn create_patient(&self, patient: &NewPatient) -> PatientResult<PatientRecord> {
        let body: PatientBody = self
            .fetch(
                self.request(Method::POST, &["patients"])?
                    .json(&PatientInput::from(patient)),
                "create patient",
            )
            .await?;
        Ok(body.into())
    }

    async fn get_patient(&self, patient_id: &str) -> PatientResult<PatientRecord> {
        let body: PatientBody = self
            .fetch(
                self.request(Method::GET, &["patients", patient_id])?,
                "get patient",
            )
            .await?;
        Ok(body.into())
    }

    async fn update_patient(&self, record: &PatientRecord) -> PatientResult<PatientRecord> {
        let body: PatientBody = self
            .fetch(
                self.request(Method::PUT, &["patients", record.id.as_str()])?
                    .json(&PatientInput::from(record)),
                "update patient",
            )
            .await?;
        Ok(body.into())
    }

    async fn delete_patient(&self, patient_id: &str) -> PatientResult<()> {
        self.send::<IgnoredAny>(
            self.request(Method::DELETE, &["patients", patient_id])?,
            "delete patient",
        )
        .await?;
        Ok(())
    }

    async fn list_readings(&self, patient_id: &str) -> PatientResult<Vec<ClinicalReading>> {
        let bodies: Vec<ReadingBody> = self
            .fetch(
                self.request(Method::GET, &["patients", patient_id, "clinical-data"])?,
                "list readings",
            )
            .await?;
        Ok(bodies.into_iter().map(ClinicalReading::from).collect())
    }

    async fn create_reading(
        &self,
        patient_id: &str,
        reading: &NewReading,
    ) -> PatientResult<ClinicalReading> {
        let body: ReadingBody = self
            .fetch(
                self.request(Method::POST, &["patients", patient_id, "clinical-data"])?
                    .json(&ReadingInput::from(reading)),
                "create reading",
            )
            .await?;
        Ok(body.into())
    }

    async fn update_reading(
        &self,
        patient_id: &str,
        reading_id: &str,
        reading: &NewReading,
    ) -> PatientResult<ClinicalReading> {
        let body: ReadingBody = self
            .fetch(
                self.request(
                    Method::PUT,
                    &["patients", patient_id, "clinical-data", reading_id],
                )?
                .json(&ReadingInput::from(reading)),
                "update reading",
            )
            .await?;
        Ok(body.into())
    }

    async fn delete_reading(&self, patient_id: &str, reading_id: &str) -> PatientResult<()> {
        self.send::<IgnoredAny>(
            self.request(
                Method::DELETE,
                &["patients", patient_id, "clinical-data", reading_id],
            )?,
            "delete reading",
        )
        .await?;
        Ok(())
    }
}
