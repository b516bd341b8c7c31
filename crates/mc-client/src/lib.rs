//! # Mailcast API Client
//!
//! Uniform gateway to the mail service: contacts, the message template,
//! authentication and bulk sending.
//!
//! - **Bearer auth**: the credential store is consulted for every request
//! - **Response normalization**: JSON when declared, text otherwise
//! - **Error normalization**: server `message` field, else the status reason
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mc_client::{ApiClient, ClientConfig, MailApi};
//! use mc_credentials::MemoryCredentialStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(
//!     ClientConfig::new("http://localhost:5000/api"),
//!     Arc::new(MemoryCredentialStore::new()),
//! )?;
//!
//! client.sign_in("ops@example.com", "secret").await?;
//! let contacts = client.list_contacts().await?;
//! println!("Found {} contacts", contacts.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod response;

pub use api::MailApi;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use response::ResponseBody;
