//! Multi-step listing creation wizard.
//!
//! ```text
//! BasicInfo → Location → Features → Images → Submitting → Completed
//!     ▲                                          │            │
//!     │                                 failure  ▼            │ reset delay
//!     │                                       Images          │
//!     └───────────────────────────────────────────────────────┘
//! ```
//!
//! Only `SubmitRequested` produces IO. Everything else is a synchronous,
//! total transition on the draft.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::draft::{Draft, DraftEdit};
use crate::machine::Machine;
use crate::notify::Notification;
use crate::types::{ImageRef, NewListing, PropertyListing};
use crate::validation::{first_invalid_step, validate_step, FieldErrors, WizardStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Completed,
}

/// Identifies one submission attempt. Outcomes for any other ticket are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SubmissionTicket(pub u64);

impl fmt::Display for SubmissionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    FieldEdited(DraftEdit),
    FeatureToggled(String),
    ImagesAdded(Vec<ImageRef>),
    ImageRemoved(usize),
    Advanced,
    Retreated,
    SubmitRequested,
    SubmitSucceeded {
        ticket: SubmissionTicket,
        listing: PropertyListing,
    },
    SubmitFailed {
        ticket: SubmissionTicket,
        message: String,
    },
    ResetElapsed { ticket: SubmissionTicket },
    Unmounted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    CreateListing {
        ticket: SubmissionTicket,
        listing: NewListing,
    },
    /// Announce success and schedule the reset.
    ListingCreated {
        ticket: SubmissionTicket,
        listing: PropertyListing,
    },
    Notify(Notification),
}

#[derive(Debug, Clone, Default)]
pub struct ListingWizard {
    draft: Draft,
    step: WizardStep,
    errors: FieldErrors,
    status: SubmissionStatus,
    submission_error: Option<String>,
    ticket: SubmissionTicket,
}

impl ListingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Message of the last failed submission, until the next edit or submit.
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn ticket(&self) -> SubmissionTicket {
        self.ticket
    }

    fn editable(&self, action: &str) -> bool {
        if self.status == SubmissionStatus::Idle {
            return true;
        }
        debug!(action, status = ?self.status, "wizard locked, ignoring input");
        false
    }

    /// Write a field and clear its error, valid or not.
    pub fn update_field(&mut self, edit: DraftEdit) {
        if !self.editable("update_field") {
            return;
        }
        let field = self.draft.apply(edit);
        self.errors.clear(field);
        self.submission_error = None;
    }

    pub fn toggle_feature(&mut self, name: &str) {
        if self.editable("toggle_feature") {
            self.draft.toggle_feature(name);
        }
    }

    pub fn add_images(&mut self, images: Vec<ImageRef>) {
        if self.editable("add_images") {
            self.draft.add_images(images);
        }
    }

    pub fn remove_image(&mut self, index: usize) {
        if self.editable("remove_image") {
            self.draft.remove_image(index);
        }
    }

    /// Validate the current step and move forward if it passes.
    /// Returns whether the step changed or was already last and valid.
    pub fn advance(&mut self) -> bool {
        if !self.editable("advance") {
            return false;
        }
        let errors = validate_step(self.step, &self.draft);
        if errors.is_empty() {
            self.step = self.step.next();
            true
        } else {
            debug!(step = self.step.number(), errors = errors.len(), "step invalid");
            self.errors.merge(errors);
            false
        }
    }

    /// Move back one step. Never validates and keeps every value and error.
    pub fn retreat(&mut self) {
        if self.editable("retreat") {
            self.step = self.step.previous();
        }
    }

    /// Start a submission from the last step.
    pub fn submit(&mut self) -> Option<WizardCommand> {
        if self.status != SubmissionStatus::Idle {
            debug!(status = ?self.status, "submit ignored");
            return None;
        }
        if self.step != WizardStep::LAST {
            debug!(step = self.step.number(), "submit before last step ignored");
            return None;
        }

        let step_errors = validate_step(self.step, &self.draft);
        if !step_errors.is_empty() {
            self.errors.merge(step_errors);
            return None;
        }

        // Earlier steps may have been edited after they were passed.
        if let Some((step, errors)) = first_invalid_step(&self.draft) {
            self.step = step;
            self.errors.merge(errors);
            return None;
        }

        let listing = match self.draft.to_new_listing() {
            Ok(listing) => listing,
            Err(errors) => {
                self.errors.merge(errors);
                return None;
            }
        };

        self.ticket = SubmissionTicket(self.ticket.0 + 1);
        self.status = SubmissionStatus::Submitting;
        self.submission_error = None;
        info!(ticket = %self.ticket, title = %listing.title, "submitting listing");

        Some(WizardCommand::CreateListing {
            ticket: self.ticket,
            listing,
        })
    }

    fn is_current(&self, ticket: SubmissionTicket, expected: SubmissionStatus) -> bool {
        if ticket == self.ticket && self.status == expected {
            return true;
        }
        debug!(
            ticket = %ticket,
            current = %self.ticket,
            status = ?self.status,
            "ignoring outdated submission event"
        );
        false
    }

    fn reset(&mut self) {
        *self = Self {
            ticket: self.ticket,
            ..Self::default()
        };
    }
}

impl Machine for ListingWizard {
    type Event = WizardEvent;
    type Command = WizardCommand;

    fn decide(&mut self, event: WizardEvent) -> Option<WizardCommand> {
        match event {
            WizardEvent::FieldEdited(edit) => {
                self.update_field(edit);
                None
            }
            WizardEvent::FeatureToggled(name) => {
                self.toggle_feature(&name);
                None
            }
            WizardEvent::ImagesAdded(images) => {
                self.add_images(images);
                None
            }
            WizardEvent::ImageRemoved(index) => {
                self.remove_image(index);
                None
            }
            WizardEvent::Advanced => {
                self.advance();
                None
            }
            WizardEvent::Retreated => {
                self.retreat();
                None
            }
            WizardEvent::SubmitRequested => self.submit(),
            WizardEvent::SubmitSucceeded { ticket, listing } => {
                if !self.is_current(ticket, SubmissionStatus::Submitting) {
                    return None;
                }
                info!(ticket = %ticket, property = %listing.id, "listing created");
                self.status = SubmissionStatus::Completed;
                Some(WizardCommand::ListingCreated { ticket, listing })
            }
            WizardEvent::SubmitFailed { ticket, message } => {
                if !self.is_current(ticket, SubmissionStatus::Submitting) {
                    return None;
                }
                warn!(ticket = %ticket, error = %message, "listing submission failed");
                self.status = SubmissionStatus::Idle;
                self.step = WizardStep::LAST;
                self.submission_error = Some(message.clone());
                Some(WizardCommand::Notify(Notification::error(format!(
                    "Failed to create listing: {}",
                    message
                ))))
            }
            WizardEvent::ResetElapsed { ticket } => {
                if self.is_current(ticket, SubmissionStatus::Completed) {
                    self.reset();
                }
                None
            }
            WizardEvent::Unmounted => {
                // Orphan any in-flight submission.
                self.ticket = SubmissionTicket(self.ticket.0 + 1);
                self.reset();
                None
            }
        }
    }
}
