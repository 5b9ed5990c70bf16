use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use super::OutputFormat;
use carepulse::{ActionContext, RegisterPatientParams};

#[derive(Args)]
pub struct PatientCommand {
    #[command(subcommand)]
    pub command: PatientSubcommand,
}

#[derive(Subcommand)]
pub enum PatientSubcommand {
    /// Register a patient from a YAML or JSON registration file
    Register {
        /// Path to the registration payload
        file: PathBuf,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the patient record of a user
    Show {
        /// Owning user ID
        user_id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check whether a user can read their patient record
    CanRead {
        /// User ID
        user_id: String,
    },
}

/// Reads a registration payload. YAML is a superset of JSON, so both parse.
fn read_registration(path: &Path) -> Result<RegisterPatientParams, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let params = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?;
    Ok(params)
}

impl PatientCommand {
    pub async fn run(&self, actions: &ActionContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PatientSubcommand::Register { file, format } => {
                let params = read_registration(file)?;
                let patient = actions.register_patient(&params).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&patient)?);
                    }
                    OutputFormat::Text => {
                        println!("Registered patient:");
                        println!("{}", patient);
                    }
                }
                Ok(())
            }

            PatientSubcommand::Show { user_id, format } => {
                match actions.get_patient(user_id).await? {
                    Some(patient) => match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&patient)?);
                        }
                        OutputFormat::Text => println!("{}", patient),
                    },
                    None => println!("No patient found for user {}", user_id),
                }
                Ok(())
            }

            PatientSubcommand::CanRead { user_id } => {
                if actions.verify_patient_read_permission(user_id).await {
                    println!("User {} can read their patient record", user_id);
                } else {
                    println!("User {} cannot read a patient record", user_id);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_registration_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("patient.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        for line in [
            "userId: u1",
            "name: Ada Lovelace",
            "email: ada@example.com",
            "phone: '+15550100'",
            "birthDate: 1990-12-10T00:00:00Z",
            "gender: female",
            "address: London",
            "occupation: Mathematician",
            "emergencyContactName: Mary",
            "emergencyContactNumber: '+15550101'",
            "primaryPhysician: Dr. Green",
            "insuranceProvider: BlueCross",
            "insurancePolicyNumber: ABC123456",
            "privacyConsent: true",
        ] {
            writeln!(file, "{}", line).unwrap();
        }

        let params = read_registration(&path).unwrap();
        assert_eq!(params.details.user_id, "u1");
        assert_eq!(params.details.phone, "+15550100");
    }

    #[test]
    fn test_read_registration_missing_file() {
        let temp_dir = tempdir().unwrap();
        let err = read_registration(&temp_dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
