//! Remote service operations

use async_trait::async_trait;
use mc_common::{
    Contact, ContactUpdate, LoginRequest, LoginResponse, NewContact, RegisterRequest, SendReport,
    SendRequest, SendResponse, Template,
};
use reqwest::Method;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Result;
use crate::response::ResponseBody;

/// Operations the mail service exposes.
///
/// [`ApiClient`] is the HTTP implementation; the dispatch controller only
/// depends on this trait.
#[async_trait]
pub trait MailApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    /// `POST /auth/register`
    async fn register(&self, request: &RegisterRequest) -> Result<ResponseBody>;

    /// `GET /contacts`
    async fn list_contacts(&self) -> Result<Vec<Contact>>;

    /// `POST /contacts`
    async fn create_contact(&self, contact: &NewContact) -> Result<Contact>;

    /// `PUT /contacts/{id}`
    async fn update_contact(&self, id: &str, update: &ContactUpdate) -> Result<Contact>;

    /// `DELETE /contacts/{id}`
    async fn delete_contact(&self, id: &str) -> Result<ResponseBody>;

    /// `GET /template`. A 404 means no template yet and yields an empty one,
    /// as does a success body without a string `body` field.
    async fn get_template(&self) -> Result<Template>;

    /// `PUT /template`
    async fn save_template(&self, template: &Template) -> Result<Template>;

    /// `POST /send-email`
    async fn send_bulk_email(&self, request: &SendRequest) -> Result<SendReport>;
}

fn contact_path(id: &str) -> String {
    format!("/contacts/{}", urlencoding::encode(id))
}

#[async_trait]
impl MailApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.request(Method::POST, "/auth/login", Some(request))
            .await?
            .into_json()
    }

    async fn register(&self, request: &RegisterRequest) -> Result<ResponseBody> {
        self.request(Method::POST, "/auth/register", Some(request)).await
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>> {
        let contacts: Option<Vec<Contact>> = self
            .request(Method::GET, "/contacts", None::<&()>)
            .await?
            .into_json()?;
        Ok(contacts.unwrap_or_default())
    }

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        self.request(Method::POST, "/contacts", Some(contact))
            .await?
            .into_json()
    }

    async fn update_contact(&self, id: &str, update: &ContactUpdate) -> Result<Contact> {
        self.request(Method::PUT, &contact_path(id), Some(update))
            .await?
            .into_json()
    }

    async fn delete_contact(&self, id: &str) -> Result<ResponseBody> {
        self.request(Method::DELETE, &contact_path(id), None::<&()>).await
    }

    async fn get_template(&self) -> Result<Template> {
        match self.request(Method::GET, "/template", None::<&()>).await {
            Ok(ResponseBody::Json(value)) => Ok(Template::new(
                value.get("body").and_then(|b| b.as_str()).unwrap_or_default(),
            )),
            Ok(ResponseBody::Text(_)) => {
                debug!("Template response carried no JSON body");
                Ok(Template::default())
            }
            Err(e) if e.is_not_found() => {
                debug!("No template stored yet");
                Ok(Template::default())
            }
            Err(e) => Err(e),
        }
    }

    async fn save_template(&self, template: &Template) -> Result<Template> {
        self.request(Method::PUT, "/template", Some(template))
            .await?
            .into_json()
    }

    async fn send_bulk_email(&self, request: &SendRequest) -> Result<SendReport> {
        let response: SendResponse = self
            .request(Method::POST, "/send-email", Some(request))
            .await?
            .into_json()?;
        Ok(response.report)
    }
}
