mod gender;
mod patient;
mod user;

pub use gender::Gender;
#[cfg(test)]
pub(crate) use patient::fixtures;
pub use patient::{Patient, PatientDetails, RegisterPatientParams};
pub use user::{CreateUserParams, User};
