use clap::ValueEnum;

mod config_cmd;
mod patient;
mod user;

pub use config_cmd::ConfigCommand;
pub use patient::PatientCommand;
pub use user::UserCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
