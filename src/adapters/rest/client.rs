//! ClinicApiClient - reqwest implementation of every port against the
//! clinic records API.
//!
//! # Endpoints
//!
//! | Port method                   | Request                                        |
//! |-------------------------------|------------------------------------------------|
//! | `TreatmentReader::get_by_id`  | `GET treatment/{id}`                           |
//! | `CycleReader::list_by_treatment` | `GET treatment-cycles?treatmentId=&page=&size=` |
//! | `CycleReader::get_by_id`      | `GET treatment-cycles/{id}`                    |
//! | `StepIndexReader`             | `GET treatment-{iui,ivf}/current-step/{id}`    |
//! | `AgreementReader`             | `GET agreements?treatmentId=&size=1`           |
//! | `SampleReader`                | `GET samples?sampleType=&patientId=`           |
//! | `CycleRepository::update`     | `PUT treatment-cycles/{id}`                    |
//! | `CycleRepository::start`      | `POST treatment-cycles/{id}/start`             |
//! | `CycleRepository::complete`   | `POST treatment-cycles/{id}/complete`          |
//! | `CycleRepository::cancel`     | `POST treatment-cycles/{id}/cancel`            |
//!
//! # Status mapping
//!
//! - 404 → `None` on reads, `CycleNotFound` on mutations
//! - 409 / 412 → `ConcurrentModification`
//! - other 4xx → `ValidationFailed` carrying the response body
//! - 5xx and transport errors → `RemoteUnavailable`

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use super::dto::{
    AgreementDto, CancelBody, CompleteBody, CycleDto, Page, SampleDto, StartBody, StepIndexDto,
    TreatmentDto,
};
use crate::config::ApiConfig;
use crate::domain::foundation::{CycleId, DomainError, ErrorCode, PatientId, Protocol, TreatmentId};
use crate::domain::records::{Agreement, LabSample, SampleType, Treatment, TreatmentCycle};
use crate::ports::{
    AgreementReader, CancelCycleRequest, CompleteCycleRequest, CycleReader, CycleRepository,
    SampleReader, StartCycleRequest, StepIndexReader, TreatmentReader,
};

/// Upper bound on pages fetched for one listing.
const MAX_PAGES: u32 = 1000;

/// HTTP client for the clinic records API.
pub struct ClinicApiClient {
    config: ApiConfig,
    client: Client,
}

impl ClinicApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    fn with_version(request: RequestBuilder, version: Option<u64>) -> RequestBuilder {
        match version {
            Some(v) => request.header(reqwest::header::IF_MATCH, format!("\"{}\"", v)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, DomainError> {
        self.authorized(request).send().await.map_err(|e| {
            tracing::warn!(error = %e, request = what, "Clinic API request failed");
            let reason = if e.is_timeout() {
                "timed out".to_string()
            } else {
                e.to_string()
            };
            DomainError::new(
                ErrorCode::RemoteUnavailable,
                format!("{} failed: {}", what, reason),
            )
        })
    }

    /// GETs a resource; 404 yields `None`.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<Option<T>, DomainError> {
        let response = self.send(request, what).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, what).await?;
        parse_json(response, what).await.map(Some)
    }

    /// GETs a listing; 404 yields an empty list.
    async fn get_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<Vec<T>, DomainError> {
        Ok(self
            .get_optional::<Page<T>>(request, what)
            .await?
            .map(Page::into_items)
            .unwrap_or_default())
    }

    /// Sends a cycle mutation and reads back the stored cycle.
    async fn mutate_cycle(
        &self,
        id: &CycleId,
        request: RequestBuilder,
        what: &str,
    ) -> Result<TreatmentCycle, DomainError> {
        let response = self.send(request, what).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(cycle_not_found(id));
        }
        let response = check_status(response, what).await?;

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<CycleDto>(&body) {
            Ok(dto) => Ok(dto.into_cycle()),
            Err(_) => {
                // Some endpoints answer with an empty body; read the cycle back.
                tracing::debug!(cycle_id = %id, request = what, "Mutation returned no cycle, re-reading");
                CycleReader::get_by_id(self, id)
                    .await?
                    .ok_or_else(|| cycle_not_found(id))
            }
        }
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = match status {
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => DomainError::new(
            ErrorCode::ConcurrentModification,
            format!("{} rejected: record was modified concurrently", what),
        ),
        s if s.is_client_error() => DomainError::new(
            ErrorCode::ValidationFailed,
            format!("{} rejected ({}): {}", what, s.as_u16(), body),
        ),
        s => {
            tracing::warn!(status = s.as_u16(), request = what, "Clinic API server error");
            DomainError::new(
                ErrorCode::RemoteUnavailable,
                format!("{} failed with status {}", what, s.as_u16()),
            )
        }
    };
    Err(err.with_detail("status", status.as_u16().to_string()))
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, DomainError> {
    response.json::<T>().await.map_err(|e| {
        DomainError::new(
            ErrorCode::RemoteUnavailable,
            format!("Failed to parse {} response: {}", what, e),
        )
    })
}

fn cycle_not_found(id: &CycleId) -> DomainError {
    DomainError::new(ErrorCode::CycleNotFound, format!("Cycle not found: {}", id))
        .with_detail("cycle_id", id.to_string())
}

/// Path segment of the protocol-specific current-step endpoint.
pub fn step_index_path(protocol: Protocol, treatment_id: &TreatmentId) -> String {
    let segment = match protocol {
        Protocol::Iui => "treatment-iui",
        Protocol::Ivf => "treatment-ivf",
    };
    format!("{}/current-step/{}", segment, treatment_id)
}

#[async_trait]
impl TreatmentReader for ClinicApiClient {
    async fn get_by_id(&self, id: &TreatmentId) -> Result<Option<Treatment>, DomainError> {
        let request = self.client.get(self.url(&format!("treatment/{}", id)));
        Ok(self
            .get_optional::<TreatmentDto>(request, "treatment lookup")
            .await?
            .map(TreatmentDto::into_treatment))
    }
}

#[async_trait]
impl CycleReader for ClinicApiClient {
    async fn list_by_treatment(
        &self,
        treatment_id: &TreatmentId,
    ) -> Result<Vec<TreatmentCycle>, DomainError> {
        let size = self.config.page_size.max(1);
        let mut cycles = Vec::new();

        for page in 0..MAX_PAGES {
            let request = self.client.get(self.url("treatment-cycles")).query(&[
                ("treatmentId", treatment_id.to_string()),
                ("page", page.to_string()),
                ("size", size.to_string()),
            ]);
            let batch: Vec<CycleDto> = self.get_list(request, "cycle listing").await?;
            let short = (batch.len() as u32) < size;
            cycles.extend(
                batch
                    .into_iter()
                    .map(CycleDto::into_cycle)
                    // Servers that ignore the filter return every cycle.
                    .filter(|c| c.treatment_id == *treatment_id),
            );
            if short {
                break;
            }
        }

        tracing::debug!(treatment_id = %treatment_id, count = cycles.len(), "Fetched cycles");
        Ok(cycles)
    }

    async fn get_by_id(&self, id: &CycleId) -> Result<Option<TreatmentCycle>, DomainError> {
        let request = self.client.get(self.url(&format!("treatment-cycles/{}", id)));
        Ok(self
            .get_optional::<CycleDto>(request, "cycle lookup")
            .await?
            .map(CycleDto::into_cycle))
    }
}

#[async_trait]
impl StepIndexReader for ClinicApiClient {
    async fn current_step_index(
        &self,
        treatment_id: &TreatmentId,
        protocol: Protocol,
    ) -> Result<Option<i64>, DomainError> {
        let request = self
            .client
            .get(self.url(&step_index_path(protocol, treatment_id)));
        Ok(self
            .get_optional::<StepIndexDto>(request, "current step lookup")
            .await?
            .and_then(StepIndexDto::index))
    }
}

#[async_trait]
impl AgreementReader for ClinicApiClient {
    async fn latest_for_treatment(
        &self,
        treatment_id: &TreatmentId,
    ) -> Result<Option<Agreement>, DomainError> {
        let request = self.client.get(self.url("agreements")).query(&[
            ("treatmentId", treatment_id.to_string()),
            ("size", "1".to_string()),
        ]);
        let agreements: Vec<AgreementDto> = self.get_list(request, "agreement lookup").await?;
        Ok(agreements
            .into_iter()
            .map(AgreementDto::into_agreement)
            .find(|a| a.treatment_id == *treatment_id))
    }
}

#[async_trait]
impl SampleReader for ClinicApiClient {
    async fn list(
        &self,
        sample_type: SampleType,
        patient_id: &PatientId,
    ) -> Result<Vec<LabSample>, DomainError> {
        let request = self.client.get(self.url("samples")).query(&[
            ("sampleType", sample_type.as_str().to_string()),
            ("patientId", patient_id.to_string()),
        ]);
        let samples: Vec<SampleDto> = self.get_list(request, "sample listing").await?;
        Ok(samples
            .into_iter()
            .filter_map(SampleDto::into_sample)
            .filter(|s| s.sample_type == sample_type && s.patient_id == *patient_id)
            .collect())
    }
}

#[async_trait]
impl CycleRepository for ClinicApiClient {
    async fn update(&self, cycle: &TreatmentCycle) -> Result<TreatmentCycle, DomainError> {
        let request = self
            .client
            .put(self.url(&format!("treatment-cycles/{}", cycle.id)))
            .json(&CycleDto::from_cycle(cycle));
        let request = Self::with_version(request, cycle.version);
        self.mutate_cycle(&cycle.id, request, "cycle update").await
    }

    async fn start(
        &self,
        id: &CycleId,
        request: StartCycleRequest,
    ) -> Result<TreatmentCycle, DomainError> {
        let body = StartBody {
            start_date: request.start_date.to_rfc3339(),
        };
        let http = self
            .client
            .post(self.url(&format!("treatment-cycles/{}/start", id)))
            .json(&body);
        let http = Self::with_version(http, request.expected_version);
        self.mutate_cycle(id, http, "cycle start").await
    }

    async fn complete(
        &self,
        id: &CycleId,
        request: CompleteCycleRequest,
    ) -> Result<TreatmentCycle, DomainError> {
        let body = CompleteBody {
            end_date: request.end_date.to_rfc3339(),
            outcome: request.outcome,
            notes: request.notes,
        };
        let http = self
            .client
            .post(self.url(&format!("treatment-cycles/{}/complete", id)))
            .json(&body);
        let http = Self::with_version(http, request.expected_version);
        self.mutate_cycle(id, http, "cycle completion").await
    }

    async fn cancel(
        &self,
        id: &CycleId,
        request: CancelCycleRequest,
    ) -> Result<TreatmentCycle, DomainError> {
        let body = CancelBody {
            reason: request.reason,
            notes: request.notes,
        };
        let http = self
            .client
            .post(self.url(&format!("treatment-cycles/{}/cancel", id)))
            .json(&body);
        let http = Self::with_version(http, request.expected_version);
        self.mutate_cycle(id, http, "cycle cancellation").await
    }
}
