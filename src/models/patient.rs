use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::gender::Gender;

/// Registration fields supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetails {
    /// Directory user owning this record.
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub current_medication: Option<String>,
    #[serde(default)]
    pub family_medical_history: Option<String>,
    #[serde(default)]
    pub past_medical_history: Option<String>,
    #[serde(default)]
    pub identification_type: Option<String>,
    #[serde(default)]
    pub identification_number: Option<String>,
    pub privacy_consent: bool,
    #[serde(default)]
    pub treatment_consent: bool,
    #[serde(default)]
    pub disclosure_consent: bool,
}

/// Payload of a registration request.
///
/// The identification document fields are accepted so that form payloads
/// deserialize as-is, but registration always stores them as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientParams {
    #[serde(flatten)]
    pub details: PatientDetails,
    #[serde(default)]
    pub identification_document_id: Option<String>,
    #[serde(default)]
    pub identification_document_url: Option<String>,
}

impl From<PatientDetails> for RegisterPatientParams {
    fn from(details: PatientDetails) -> Self {
        Self {
            details,
            identification_document_id: None,
            identification_document_url: None,
        }
    }
}

/// A stored patient document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub details: PatientDetails,
    #[serde(default)]
    pub identification_document_id: Option<String>,
    #[serde(default)]
    pub identification_document_url: Option<String>,
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.details;
        writeln!(f, "{} ({})", d.name, self.id)?;
        writeln!(f, "User: {}", d.user_id)?;
        writeln!(f, "Email: {}", d.email)?;
        writeln!(f, "Phone: {}", d.phone)?;
        writeln!(f, "Born: {}", d.birth_date.format("%Y-%m-%d"))?;
        writeln!(f, "Gender: {}", d.gender)?;
        writeln!(f, "Address: {}", d.address)?;
        writeln!(f, "Occupation: {}", d.occupation)?;
        writeln!(
            f,
            "Emergency contact: {} {}",
            d.emergency_contact_name, d.emergency_contact_number
        )?;
        writeln!(f, "Primary physician: {}", d.primary_physician)?;
        write!(
            f,
            "Insurance: {} {}",
            d.insurance_provider, d.insurance_policy_number
        )?;

        if let Some(allergies) = &d.allergies {
            write!(f, "\nAllergies: {}", allergies)?;
        }
        if let Some(medication) = &d.current_medication {
            write!(f, "\nCurrent medication: {}", medication)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn details(user_id: &str) -> PatientDetails {
        PatientDetails {
            user_id: user_id.to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+15550100".to_string(),
            birth_date: Utc.with_ymd_and_hms(1990, 12, 10, 0, 0, 0).unwrap(),
            gender: Gender::Female,
            address: "12 St James's Square, London".to_string(),
            occupation: "Mathematician".to_string(),
            emergency_contact_name: "Mary Somerville".to_string(),
            emergency_contact_number: "+15550101".to_string(),
            primary_physician: "Dr. Green".to_string(),
            insurance_provider: "BlueCross".to_string(),
            insurance_policy_number: "ABC123456".to_string(),
            allergies: Some("Peanuts".to_string()),
            current_medication: None,
            family_medical_history: None,
            past_medical_history: None,
            identification_type: Some("Passport".to_string()),
            identification_number: Some("P1234567".to_string()),
            privacy_consent: true,
            treatment_consent: true,
            disclosure_consent: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_params_from_form_payload() {
        let params: RegisterPatientParams = serde_json::from_value(json!({
            "userId": "u1",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "+15550100",
            "birthDate": "1990-12-10T00:00:00.000Z",
            "gender": "female",
            "address": "London",
            "occupation": "Mathematician",
            "emergencyContactName": "Mary",
            "emergencyContactNumber": "+15550101",
            "primaryPhysician": "Dr. Green",
            "insuranceProvider": "BlueCross",
            "insurancePolicyNumber": "ABC123456",
            "privacyConsent": true,
            "identificationDocumentId": "file-1"
        }))
        .unwrap();

        assert_eq!(params.details.user_id, "u1");
        assert_eq!(params.details.gender, Gender::Female);
        assert_eq!(params.details.allergies, None);
        assert!(!params.details.treatment_consent);
        assert_eq!(params.identification_document_id.as_deref(), Some("file-1"));
    }

    #[test]
    fn test_patient_from_stored_document() {
        let mut value = serde_json::to_value(fixtures::details("u1")).unwrap();
        let map = value.as_object_mut().unwrap();
        map.insert("$id".into(), json!("doc1"));
        map.insert("$collectionId".into(), json!("patients"));
        map.insert("identificationDocumentId".into(), json!(null));

        let patient: Patient = serde_json::from_value(value).unwrap();
        assert_eq!(patient.id, "doc1");
        assert_eq!(patient.details, fixtures::details("u1"));
        assert_eq!(patient.identification_document_id, None);
        assert_eq!(patient.identification_document_url, None);

        let text = patient.to_string();
        assert!(text.starts_with("Ada Lovelace (doc1)"));
        assert!(text.contains("Born: 1990-12-10"));
        assert!(text.contains("Allergies: Peanuts"));
    }
}
