use clap::{Args, Subcommand};

use super::OutputFormat;
use carepulse::{ActionContext, CreateUserParams};

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Create a user (returns the existing user if the email is taken)
    Create {
        /// Email address
        #[arg(long)]
        email: String,

        /// Phone number in E.164 form (e.g. +15550100)
        #[arg(long)]
        phone: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a user's details
    Show {
        /// User ID
        user_id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl UserCommand {
    pub async fn run(&self, actions: &ActionContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            UserSubcommand::Create {
                email,
                phone,
                name,
                format,
            } => {
                let mut params = CreateUserParams::new(email.trim(), phone.trim());
                if let Some(name) = name {
                    params = params.with_name(name.trim());
                }

                let user = actions.create_user(&params).await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
                    OutputFormat::Text => println!("{}", user),
                }
                Ok(())
            }

            UserSubcommand::Show { user_id, format } => {
                let user = actions.get_user(user_id).await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
                    OutputFormat::Text => println!("{}", user),
                }
                Ok(())
            }
        }
    }
}
