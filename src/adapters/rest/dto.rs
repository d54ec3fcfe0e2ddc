//! Wire DTOs for the clinic records API.
//!
//! The API speaks camelCase JSON and has accumulated alias fields over time
//! (`doctorSigned` vs `isSignedByDoctor`, `stepType` vs `step_type`). The DTOs
//! accept every spelling and the `into_*` conversions merge them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AgreementId, CycleId, PatientId, SampleId, Timestamp, TreatmentId, TreatmentType,
};
use crate::domain::records::{Agreement, LabSample, SampleType, Treatment, TreatmentCycle};
use crate::domain::status::RawStatus;

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// A listing, either a bare array or a page envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    Items(Vec<T>),
    Envelope {
        #[serde(alias = "items", alias = "data")]
        content: Vec<T>,
    },
}

impl<T> Page<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Page::Items(items) => items,
            Page::Envelope { content } => content,
        }
    }
}

/// Body of the current-step endpoints: a bare number, `null`, or an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StepIndexDto {
    Bare(Option<i64>),
    Wrapped {
        #[serde(
            rename = "currentStep",
            alias = "currentStepIndex",
            alias = "index",
            default
        )]
        current_step: Option<i64>,
    },
}

impl StepIndexDto {
    pub fn index(self) -> Option<i64> {
        match self {
            StepIndexDto::Bare(index) => index,
            StepIndexDto::Wrapped { current_step } => current_step,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentDto {
    pub id: TreatmentId,
    pub patient_id: PatientId,
    pub treatment_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub protocol_version: Option<u32>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub total_cost: Option<f64>,
}

impl TreatmentDto {
    pub fn into_treatment(self) -> Treatment {
        Treatment {
            id: self.id,
            patient_id: self.patient_id,
            treatment_type: TreatmentType::from(self.treatment_type),
            status: self.status,
            protocol_version: self.protocol_version,
            start_date: parse_date(self.start_date.as_deref()),
            end_date: parse_date(self.end_date.as_deref()),
            total_cost: self.total_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleDto {
    pub id: CycleId,
    pub treatment_id: TreatmentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<PatientId>,
    #[serde(default)]
    pub cycle_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_name: Option<String>,
    #[serde(default, alias = "step_type", skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(default)]
    pub completed_steps: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl CycleDto {
    pub fn into_cycle(self) -> TreatmentCycle {
        TreatmentCycle {
            id: self.id,
            treatment_id: self.treatment_id,
            patient_id: self.patient_id,
            cycle_number: self.cycle_number,
            cycle_name: self.cycle_name,
            step_type: self.step_type,
            current_step: self.current_step,
            completed_steps: self.completed_steps.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            order_index: self.order_index,
            start_date: parse_date(self.start_date.as_deref()),
            end_date: parse_date(self.end_date.as_deref()),
            cost: self.cost,
            notes: self.notes,
            outcome: self.outcome,
            version: self.version,
        }
    }

    /// Body for `PUT treatment-cycles/{id}`. The status is written in its
    /// canonical spelling whatever shape it was read in.
    pub fn from_cycle(cycle: &TreatmentCycle) -> Self {
        Self {
            id: cycle.id,
            treatment_id: cycle.treatment_id,
            patient_id: cycle.patient_id,
            cycle_number: cycle.cycle_number,
            cycle_name: cycle.cycle_name.clone(),
            step_type: cycle.step_type.clone(),
            current_step: cycle.current_step.clone(),
            completed_steps: Some(cycle.completed_steps.clone()),
            status: Some(RawStatus::Text(cycle.normalized_status().as_str().to_string())),
            order_index: cycle.order_index,
            start_date: cycle.start_date.map(|d| d.to_rfc3339()),
            end_date: cycle.end_date.map(|d| d.to_rfc3339()),
            cost: cycle.cost,
            notes: cycle.notes.clone(),
            outcome: cycle.outcome.clone(),
            version: cycle.version,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementDto {
    pub id: AgreementId,
    pub treatment_id: TreatmentId,
    #[serde(default)]
    pub signed_by_doctor: Option<bool>,
    #[serde(default)]
    pub signed_by_patient: Option<bool>,
    #[serde(default)]
    pub doctor_signed: Option<bool>,
    #[serde(default)]
    pub is_signed_by_doctor: Option<bool>,
    #[serde(default)]
    pub patient_signed: Option<bool>,
    #[serde(default)]
    pub is_signed_by_patient: Option<bool>,
}

impl AgreementDto {
    pub fn into_agreement(self) -> Agreement {
        Agreement {
            id: self.id,
            treatment_id: self.treatment_id,
            signed_by_doctor: [
                self.signed_by_doctor,
                self.doctor_signed,
                self.is_signed_by_doctor,
            ]
            .contains(&Some(true)),
            signed_by_patient: [
                self.signed_by_patient,
                self.patient_signed,
                self.is_signed_by_patient,
            ]
            .contains(&Some(true)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDto {
    pub id: SampleId,
    pub patient_id: PatientId,
    pub sample_type: String,
    #[serde(default)]
    pub quality_checked: Option<bool>,
    #[serde(default)]
    pub is_quality_checked: Option<bool>,
    #[serde(default, alias = "collectionDate")]
    pub collected_at: Option<String>,
}

impl SampleDto {
    /// `None` for sample types the engine does not track.
    pub fn into_sample(self) -> Option<LabSample> {
        let sample_type = parse_sample_type(&self.sample_type)?;
        Some(LabSample {
            id: self.id,
            patient_id: self.patient_id,
            sample_type,
            quality_checked: self.quality_checked.unwrap_or(false)
                || self.is_quality_checked.unwrap_or(false),
            collected_at: parse_date(self.collected_at.as_deref()),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Request bodies
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBody {
    pub start_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelBody {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn parse_date(raw: Option<&str>) -> Option<Timestamp> {
    let raw = raw?;
    let parsed = Timestamp::parse_lenient(raw);
    if parsed.is_none() {
        tracing::warn!(value = %raw, "Unparseable date from clinic API");
    }
    parsed
}

fn parse_sample_type(raw: &str) -> Option<SampleType> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "SPERM" | "SEMEN" => Some(SampleType::Sperm),
        "OOCYTE" | "EGG" | "OOCYTES" => Some(SampleType::Oocyte),
        "EMBRYO" => Some(SampleType::Embryo),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CycleStatus;
    use serde_json::json;

    #[test]
    fn cycle_accepts_legacy_field_spellings() {
        let id = CycleId::new();
        let treatment = TreatmentId::new();
        let dto: CycleDto = serde_json::from_value(json!({
            "id": id.to_string(),
            "treatmentId": treatment.to_string(),
            "cycleNumber": 2,
            "step_type": "IVF_OPU",
            "status": 2,
            "startDate": "2024-03-01",
        }))
        .unwrap();

        let cycle = dto.into_cycle();
        assert_eq!(cycle.id, id);
        assert_eq!(cycle.step_type.as_deref(), Some("IVF_OPU"));
        assert_eq!(cycle.normalized_status(), CycleStatus::InProgress);
        assert!(cycle.start_date.is_some());
        assert!(cycle.completed_steps.is_empty());
    }

    #[test]
    fn cycle_with_null_collections_deserializes() {
        let dto: CycleDto = serde_json::from_value(json!({
            "id": CycleId::new().to_string(),
            "treatmentId": TreatmentId::new().to_string(),
            "cycleNumber": 1,
            "completedSteps": null,
            "status": null,
        }))
        .unwrap();
        let cycle = dto.into_cycle();
        assert_eq!(cycle.normalized_status(), CycleStatus::Planned);
    }

    #[test]
    fn cycle_body_writes_canonical_status() {
        let cycle = TreatmentCycle::new(TreatmentId::new(), 1).with_status("Preg+");
        let body = serde_json::to_value(CycleDto::from_cycle(&cycle)).unwrap();
        assert_eq!(body["status"], "Completed");
        assert_eq!(body["cycleNumber"], 1);
        assert!(body.get("stepType").is_none());
    }

    #[test]
    fn agreement_signatures_merge_aliases() {
        let dto: AgreementDto = serde_json::from_value(json!({
            "id": AgreementId::new().to_string(),
            "treatmentId": TreatmentId::new().to_string(),
            "doctorSigned": false,
            "isSignedByDoctor": true,
            "patientSigned": true,
        }))
        .unwrap();
        let agreement = dto.into_agreement();
        assert!(agreement.signed_by_doctor);
        assert!(agreement.signed_by_patient);
    }

    #[test]
    fn agreement_reads_canonical_signature_keys() {
        let dto: AgreementDto = serde_json::from_value(json!({
            "id": AgreementId::new().to_string(),
            "treatmentId": TreatmentId::new().to_string(),
            "signedByDoctor": true,
            "signedByPatient": true,
        }))
        .unwrap();
        assert!(dto.into_agreement().is_fully_signed());
    }

    #[test]
    fn canonical_false_does_not_mask_legacy_true() {
        let dto: AgreementDto = serde_json::from_value(json!({
            "id": AgreementId::new().to_string(),
            "treatmentId": TreatmentId::new().to_string(),
            "signedByDoctor": true,
            "signedByPatient": false,
            "isSignedByPatient": true,
        }))
        .unwrap();
        assert!(dto.into_agreement().is_fully_signed());
    }

    #[test]
    fn agreement_missing_flags_are_unsigned() {
        let dto: AgreementDto = serde_json::from_value(json!({
            "id": AgreementId::new().to_string(),
            "treatmentId": TreatmentId::new().to_string(),
        }))
        .unwrap();
        assert!(!dto.into_agreement().is_fully_signed());
    }

    #[test]
    fn sample_quality_flag_aliases() {
        let dto: SampleDto = serde_json::from_value(json!({
            "id": SampleId::new().to_string(),
            "patientId": PatientId::new().to_string(),
            "sampleType": "oocyte",
            "isQualityChecked": true,
        }))
        .unwrap();
        let sample = dto.into_sample().unwrap();
        assert_eq!(sample.sample_type, SampleType::Oocyte);
        assert!(sample.quality_checked);
    }

    #[test]
    fn sample_reads_canonical_quality_key() {
        let dto: SampleDto = serde_json::from_value(json!({
            "id": SampleId::new().to_string(),
            "patientId": PatientId::new().to_string(),
            "sampleType": "SPERM",
            "qualityChecked": true,
        }))
        .unwrap();
        assert!(dto.into_sample().unwrap().quality_checked);
    }

    #[test]
    fn unknown_sample_type_is_dropped() {
        let dto: SampleDto = serde_json::from_value(json!({
            "id": SampleId::new().to_string(),
            "patientId": PatientId::new().to_string(),
            "sampleType": "TISSUE",
        }))
        .unwrap();
        assert!(dto.into_sample().is_none());
    }

    #[test]
    fn pages_accept_array_and_envelope() {
        let bare: Page<u32> = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(bare.into_items(), vec![1, 2]);

        let wrapped: Page<u32> = serde_json::from_value(json!({"content": [3]})).unwrap();
        assert_eq!(wrapped.into_items(), vec![3]);

        let items: Page<u32> = serde_json::from_value(json!({"items": [4, 5]})).unwrap();
        assert_eq!(items.into_items(), vec![4, 5]);
    }

    #[test]
    fn step_index_shapes() {
        let bare: StepIndexDto = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(bare.index(), Some(3));

        let null: StepIndexDto = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(null.index(), None);

        let wrapped: StepIndexDto = serde_json::from_value(json!({"currentStep": 1})).unwrap();
        assert_eq!(wrapped.index(), Some(1));
    }

    #[test]
    fn treatment_type_is_case_insensitive() {
        let dto: TreatmentDto = serde_json::from_value(json!({
            "id": TreatmentId::new().to_string(),
            "patientId": PatientId::new().to_string(),
            "treatmentType": "ivf",
            "protocolVersion": 1,
        }))
        .unwrap();
        let treatment = dto.into_treatment();
        assert_eq!(treatment.treatment_type, TreatmentType::Ivf);
        assert_eq!(treatment.protocol_version, Some(1));
    }
}
