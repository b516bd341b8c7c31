//! Dispatch Controller
//!
//! Owns the operator's composing inputs (contact directory, selection,
//! subject, message) and runs one bulk send at a time against a [`MailApi`].
//!
//! ```text
//!   Composing ──dispatch()──▶ Sending ──ok──▶ Reported
//!       ▲                        │               │
//!       └────────── err ─────────┘               │
//!       └──────────────── any mutation ──────────┘
//! ```
//!
//! [`DispatchController::dispatch`] takes `&mut self`, so nothing else can
//! touch the controller (including a second dispatch) while a send is pending:
//!
//! ```compile_fail
//! # use mc_dispatch::DispatchController;
//! # fn twice(controller: &mut DispatchController) {
//! let first = controller.dispatch();
//! let second = controller.dispatch();
//! drop((first, second));
//! # }
//! ```

use mc_client::{ClientError, MailApi};
use mc_common::{Contact, SendReport, SendRequest, Template, ValidationError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{DispatchError, Result};
use crate::selection::SelectionSet;

/// Where the controller is in the compose/send cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Inputs are being edited
    Composing,
    /// One bulk-send request is in flight
    Sending,
    /// The last dispatch succeeded and its report has not been superseded
    Reported,
}

/// Clonable read-only view of the in-flight flag.
///
/// The controller is exclusively borrowed while a dispatch is pending, so
/// observers (a spinner, a status line) hold one of these instead.
#[derive(Debug, Clone)]
pub struct InFlightIndicator {
    flag: Arc<AtomicBool>,
}

impl InFlightIndicator {
    pub fn is_in_flight(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Raises the in-flight flag for its lifetime
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag: flag.clone() }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct DispatchController {
    api: Arc<dyn MailApi>,
    contacts: Vec<Contact>,
    selection: SelectionSet,
    subject: String,
    message: String,
    /// Never `Sending`; that state is derived from `in_flight`
    phase: DispatchState,
    in_flight: Arc<AtomicBool>,
    last_report: Option<SendReport>,
    last_error: Option<String>,
}

impl DispatchController {
    /// Empty directory, empty inputs
    pub fn new(api: Arc<dyn MailApi>) -> Self {
        Self {
            api,
            contacts: Vec::new(),
            selection: SelectionSet::new(),
            subject: String::new(),
            message: String::new(),
            phase: DispatchState::Composing,
            in_flight: Arc::new(AtomicBool::new(false)),
            last_report: None,
            last_error: None,
        }
    }

    /// Fetch the contact directory and the stored template concurrently.
    ///
    /// The message starts as the template body; nothing is selected.
    pub async fn load(api: Arc<dyn MailApi>) -> std::result::Result<Self, ClientError> {
        let (contacts, template) = tokio::try_join!(api.list_contacts(), api.get_template())?;

        info!(
            contacts = contacts.len(),
            has_template = !template.body.is_empty(),
            "Dispatch controller loaded"
        );

        let mut controller = Self::new(api);
        controller.contacts = contacts;
        controller.message = template.body;
        Ok(controller)
    }

    // ------------------------------------------------------------------
    // Directory
    // ------------------------------------------------------------------

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    fn is_known(&self, id: &str) -> bool {
        self.contacts.iter().any(|c| c.id == id)
    }

    /// Replace the whole directory, dropping selections of vanished contacts
    pub fn replace_contacts(&mut self, contacts: Vec<Contact>) {
        self.contacts = contacts;
        self.prune_selection();
        self.touch();
    }

    /// Insert a contact at the top, or replace the one with the same id in place
    pub fn add_contact(&mut self, contact: Contact) {
        match self.contacts.iter_mut().find(|c| c.id == contact.id) {
            Some(existing) => *existing = contact,
            None => self.contacts.insert(0, contact),
        }
        self.touch();
    }

    /// Returns the removed contact, if it was present
    pub fn remove_contact(&mut self, id: &str) -> Option<Contact> {
        let index = self.contacts.iter().position(|c| c.id == id)?;
        let removed = self.contacts.remove(index);
        self.selection.set(id, false);
        self.touch();
        Some(removed)
    }

    /// Re-fetch the directory from the service
    pub async fn refresh_contacts(&mut self) -> std::result::Result<(), ClientError> {
        let contacts = self.api.list_contacts().await?;
        self.replace_contacts(contacts);
        Ok(())
    }

    fn prune_selection(&mut self) {
        let contacts = &self.contacts;
        self.selection.retain(|id| contacts.iter().any(|c| c.id == id));
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Flip one contact's flag. Returns the new flag; unknown ids are ignored
    /// and report `false`.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.is_known(id) {
            debug!(id, "Ignoring toggle of unknown contact");
            return false;
        }
        let selected = self.selection.toggle(id);
        self.touch();
        selected
    }

    /// Returns whether the id was known and the flag applied
    pub fn set_selected(&mut self, id: &str, flag: bool) -> bool {
        if !self.is_known(id) {
            debug!(id, "Ignoring selection of unknown contact");
            return false;
        }
        self.selection.set(id, flag);
        self.touch();
        true
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(self.contacts.iter().map(|c| c.id.as_str()));
        self.touch();
    }

    pub fn clear_all(&mut self) {
        self.selection.clear();
        self.touch();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    /// Selected ids in ascending order
    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.iter().map(str::to_string).collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// True only for a non-empty directory with every contact selected
    pub fn all_selected(&self) -> bool {
        !self.contacts.is_empty()
            && self
                .contacts
                .iter()
                .all(|c| self.selection.is_selected(&c.id))
    }

    // ------------------------------------------------------------------
    // Subject / message
    // ------------------------------------------------------------------

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
        self.touch();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.touch();
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn state(&self) -> DispatchState {
        if self.in_flight() {
            DispatchState::Sending
        } else {
            self.phase
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn in_flight_indicator(&self) -> InFlightIndicator {
        InFlightIndicator {
            flag: self.in_flight.clone(),
        }
    }

    /// Report of the last successful dispatch, until the next attempt
    pub fn last_report(&self) -> Option<&SendReport> {
        self.last_report.as_ref()
    }

    /// Message of the last failed dispatch, until the next attempt
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether `dispatch` would issue a request right now
    pub fn readiness(&self) -> std::result::Result<(), ValidationError> {
        self.build_request().map(|_| ())
    }

    fn build_request(&self) -> std::result::Result<SendRequest, ValidationError> {
        SendRequest::new(self.selection.to_ids(), &self.subject, &self.message)
    }

    fn touch(&mut self) {
        if self.phase == DispatchState::Reported {
            self.phase = DispatchState::Composing;
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Send the composed message to every selected contact.
    ///
    /// A failed guard returns [`DispatchError::Validation`] without issuing a
    /// request or changing any state. Otherwise exactly one request is made:
    /// on success the inputs are reset and the report is stored, on failure
    /// the inputs are kept and the message is retained as [`last_error`].
    ///
    /// Dropping the returned future before completion resets the in-flight
    /// flag and leaves the inputs untouched.
    ///
    /// [`last_error`]: Self::last_error
    pub async fn dispatch(&mut self) -> Result<&SendReport> {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                debug!(reason = %e, "Dispatch rejected");
                return Err(DispatchError::Validation(e));
            }
        };

        self.last_report = None;
        self.last_error = None;
        self.phase = DispatchState::Composing;

        info!(recipients = request.contact_ids().len(), "Dispatching bulk email");

        let result = {
            let _guard = InFlightGuard::engage(&self.in_flight);
            self.api.send_bulk_email(&request).await
        };

        match result {
            Ok(report) => {
                let summary = report.summary();
                info!(
                    sent = summary.sent,
                    failed = summary.failed,
                    "Bulk email dispatched"
                );

                self.selection.clear();
                self.subject.clear();
                self.message.clear();
                self.phase = DispatchState::Reported;
                let report: &SendReport = self.last_report.insert(report);
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "Bulk email dispatch failed");
                self.last_error = Some(e.message());
                Err(DispatchError::Request(e))
            }
        }
    }

    /// Persist the current message as the stored template
    pub async fn save_template(&self) -> Result<Template> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::BlankMessage.into());
        }

        let saved = self.api.save_template(&Template::new(&self.message)).await?;
        info!("Template saved");
        Ok(saved)
    }
}

impl std::fmt::Debug for DispatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchController")
            .field("contacts", &self.contacts.len())
            .field("selected", &self.selection.len())
            .field("state", &self.state())
            .finish()
    }
}
