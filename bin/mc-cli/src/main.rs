//! Mailcast Operator CLI
//!
//! Terminal front end over the Mailcast crates:
//! - Sign in / out and account registration
//! - Contact directory management
//! - Message template
//! - Bulk dispatch with a per-recipient report

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use mc_client::{ApiClient, ClientConfig, MailApi};
use mc_common::{ContactUpdate, NewContact, RegisterRequest};
use mc_config::{AppConfig, ConfigLoader};
use mc_dispatch::DispatchController;

/// Mailcast - contact directory and bulk email from the terminal
#[derive(Parser, Debug)]
#[command(name = "mailcast")]
#[command(version, about = "Mailcast - contact directory and bulk email from the terminal")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// API base URL (overrides config and MAILCAST_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the access token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "MAILCAST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored access token
    Logout,

    /// Create an account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "MAILCAST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the API endpoint and whether a credential is stored
    Status,

    /// Manage the contact directory
    #[command(subcommand)]
    Contacts(ContactsCommand),

    /// Show or save the message template
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Send one message to the selected contacts
    Send(SendArgs),

    /// Configuration helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ContactsCommand {
    /// List every contact
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create a contact
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        company: Option<String>,
    },

    /// Change fields of an existing contact
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,
    },

    /// Delete a contact
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    /// Print the stored template
    Show,

    /// Replace the stored template
    Save {
        /// Template text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        body: Option<String>,

        /// Read the template text from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SendArgs {
    #[arg(long, short)]
    subject: String,

    /// Message text; defaults to the stored template
    #[arg(long, short, conflicts_with = "message_file")]
    message: Option<String>,

    /// Read the message text from a file
    #[arg(long)]
    message_file: Option<PathBuf>,

    /// Contact id to include (repeatable)
    #[arg(long = "to", value_name = "ID")]
    to: Vec<String>,

    /// Include every contact in the directory
    #[arg(long, conflicts_with = "to")]
    all: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print a documented example config file
    Example,

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    mc_common::logging::init_logging("mailcast");

    let cli = Cli::parse();

    if let Command::Config(ConfigCommand::Example) = cli.command {
        print!("{}", AppConfig::example_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    debug!(base_url = %config.api.base_url, "Configuration loaded");

    match cli.command {
        Command::Config(ConfigCommand::Show) => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Command::Config(ConfigCommand::Example) => Ok(()),
        command => {
            let client = build_client(&config)?;
            run(command, &client).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load().context("Failed to load configuration")?;

    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
        config.validate()?;
    }

    Ok(config)
}

fn build_client(config: &AppConfig) -> Result<ApiClient> {
    let credentials =
        mc_credentials::create_store(&config.credentials.backend, config.credentials_path())?;

    let mut client_config = ClientConfig::new(&config.api.base_url)
        .with_timeout(config.api.timeout())
        .with_connect_timeout(config.api.connect_timeout());
    if !config.api.user_agent.is_empty() {
        client_config = client_config.with_user_agent(&config.api.user_agent);
    }

    Ok(ApiClient::new(client_config, credentials)?)
}

async fn run(command: Command, client: &ApiClient) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            client.sign_in(&email, &password).await?;
            println!("Signed in as {}", email);
        }
        Command::Logout => {
            client.sign_out().await;
            println!("Signed out");
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            client
                .register(&RegisterRequest {
                    name,
                    email,
                    password,
                })
                .await?;
            println!("Registration successful. Sign in with `mailcast login`.");
        }
        Command::Status => {
            println!("API:         {}", client.base_url());
            println!("Credentials: {}", client.credentials().name());
            let state = if client.is_authenticated().await {
                "signed in"
            } else {
                "signed out"
            };
            println!("Session:     {}", state);
        }
        Command::Contacts(command) => run_contacts(command, client).await?,
        Command::Template(command) => run_template(command, client).await?,
        Command::Send(args) => run_send(args, client).await?,
        Command::Config(_) => {}
    }
    Ok(())
}

async fn run_contacts(command: ContactsCommand, client: &ApiClient) -> Result<()> {
    match command {
        ContactsCommand::List { json } => {
            let contacts = client.list_contacts().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&contacts)?);
            } else if contacts.is_empty() {
                println!("No contacts");
            } else {
                for contact in &contacts {
                    println!(
                        "{}\t{}\t{}\t{}",
                        contact.id,
                        contact.name,
                        contact.email,
                        contact.company.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        ContactsCommand::Add {
            name,
            email,
            company,
        } => {
            let created = client
                .create_contact(&NewContact {
                    name,
                    email,
                    company,
                })
                .await?;
            println!("Created contact {} ({})", created.id, created.name);
        }
        ContactsCommand::Update {
            id,
            name,
            email,
            company,
        } => {
            let update = ContactUpdate {
                name,
                email,
                company,
            };
            if update.is_empty() {
                bail!("Nothing to update; pass --name, --email or --company");
            }
            let updated = client.update_contact(&id, &update).await?;
            println!("Updated contact {} ({})", updated.id, updated.name);
        }
        ContactsCommand::Remove { id } => {
            client.delete_contact(&id).await?;
            println!("Removed contact {}", id);
        }
    }
    Ok(())
}

async fn run_template(command: TemplateCommand, client: &ApiClient) -> Result<()> {
    match command {
        TemplateCommand::Show => {
            let template = client.get_template().await?;
            if template.body.is_empty() {
                println!("(no template saved)");
            } else {
                println!("{}", template.body);
            }
        }
        TemplateCommand::Save { body, file } => {
            let body = match (body, file) {
                (Some(body), _) => body,
                (None, Some(path)) => read_text(&path)?,
                (None, None) => bail!("Pass --body or --file"),
            };

            let mut controller = DispatchController::new(Arc::new(client.clone()));
            controller.set_message(body);
            controller.save_template().await?;
            println!("Template saved");
        }
    }
    Ok(())
}

async fn run_send(args: SendArgs, client: &ApiClient) -> Result<()> {
    let mut controller = DispatchController::load(Arc::new(client.clone())).await?;

    if args.all {
        controller.select_all();
    }
    for id in &args.to {
        if !controller.set_selected(id, true) {
            bail!("Unknown contact id: {}", id);
        }
    }

    controller.set_subject(args.subject);
    if let Some(message) = args.message {
        controller.set_message(message);
    } else if let Some(path) = &args.message_file {
        controller.set_message(read_text(path)?);
    }

    info!(recipients = controller.selected_count(), "Sending");

    let report = controller.dispatch().await?;
    print!("{}", report);
    println!("{}", report.summary());
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
