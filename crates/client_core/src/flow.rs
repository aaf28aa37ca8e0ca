//! The contribution flow controller.
//!
//! One [`ContributionFlow`] drives a single payment modal: it opens the modal for a
//! gift, keeps the typed form in sync with the configured variant, submits the
//! contribution through a [`ContributionGateway`], and reports every UI change to the
//! caller's [`Presenter`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::{
    domain::{format_amount, ContributionId, Gift, GiftId, PaymentMethod},
    protocol::ContributionRequest,
};
use tracing::{error, info, warn};

use crate::{
    clipboard::ClipboardSink,
    config::FlowConfig,
    error::FlowError,
    events::{FlowEvent, MethodUi, Presenter},
    form::{parse_amount, ContributionForm},
    gateway::ContributionGateway,
};

const GIFT_ID_ATTR: &str = "presente-id";
const GIFT_NAME_ATTR: &str = "presente-nome";
const GIFT_AMOUNT_ATTR: &str = "presente-valor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    ModalOpen,
    Submitting,
    ConfirmationShown,
    Redirecting,
    ErrorShown,
}

/// Data attributes carried by a gift's "contribute" button (`data-presente-*`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerDataset {
    attributes: HashMap<String, String>,
}

impl TriggerDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `presente-id`, `data-presente-id` or the camel-cased `presenteId`.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(normalize_key(key), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(&normalize_key(key)).map(String::as_str)
    }

    /// Dataset for a gift as listed by the backend; the amount offered is what remains.
    pub fn for_gift(gift: &Gift) -> Self {
        Self::new()
            .with(GIFT_ID_ATTR, gift.id.to_string())
            .with(GIFT_NAME_ATTR, gift.name.clone())
            .with(GIFT_AMOUNT_ATTR, gift.remaining().to_string())
    }
}

fn normalize_key(key: &str) -> String {
    let key = key.trim().strip_prefix("data-").unwrap_or(key.trim());
    let mut out = String::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftTrigger {
    pub gift_id: GiftId,
    pub gift_name: String,
    pub amount: Decimal,
}

impl GiftTrigger {
    pub fn parse(dataset: &TriggerDataset) -> Result<Self, FlowError> {
        let gift_id = dataset
            .get(GIFT_ID_ATTR)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(GiftId)
            .ok_or_else(|| FlowError::MissingElement(format!("data-{GIFT_ID_ATTR}")))?;
        let gift_name = dataset
            .get(GIFT_NAME_ATTR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| FlowError::MissingElement(format!("data-{GIFT_NAME_ATTR}")))?
            .to_string();
        let amount = dataset
            .get(GIFT_AMOUNT_ATTR)
            .and_then(parse_amount)
            .ok_or_else(|| FlowError::MissingElement(format!("data-{GIFT_AMOUNT_ATTR}")))?;

        Ok(Self {
            gift_id,
            gift_name,
            amount,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    PixConfirmed {
        amount: String,
        pix_key: String,
        contribution_id: Option<ContributionId>,
        copied_to_clipboard: bool,
    },
    Redirect {
        url: String,
        contribution_id: Option<ContributionId>,
    },
}

pub struct ContributionFlow<G, P, C> {
    config: FlowConfig,
    gateway: G,
    presenter: P,
    clipboard: C,
    form: ContributionForm,
    state: FlowState,
    selected_method: PaymentMethod,
    max_amount: Option<Decimal>,
}

impl<G, P, C> ContributionFlow<G, P, C>
where
    G: ContributionGateway,
    P: Presenter,
    C: ClipboardSink,
{
    pub fn new(config: FlowConfig, gateway: G, presenter: P, clipboard: C) -> Self {
        let selected_method = config.default_method();
        Self {
            config,
            gateway,
            presenter,
            clipboard,
            form: ContributionForm::default(),
            state: FlowState::Idle,
            selected_method,
            max_amount: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn form(&self) -> &ContributionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContributionForm {
        &mut self.form
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn selected_method(&self) -> PaymentMethod {
        self.selected_method
    }

    pub fn open_payment_modal(&mut self, trigger: &TriggerDataset) -> Result<(), FlowError> {
        if self.state == FlowState::Submitting {
            return Err(FlowError::InvalidState {
                operation: "open the payment modal",
                state: self.state,
            });
        }

        let trigger = match GiftTrigger::parse(trigger) {
            Ok(trigger) => trigger,
            Err(err) => {
                error!(error = %err, "payment modal elements not found; not opening");
                return Err(err);
            }
        };

        let amount = format_amount(trigger.amount);
        self.form.reset();
        self.form.gift_name = trigger.gift_name.clone();
        self.form.gift_id.set_value(trigger.gift_id.to_string());
        self.form.amount_display = amount.clone();
        self.form.amount.set_value(amount.clone());
        self.max_amount = self.config.amount_editable.then_some(trigger.amount);
        self.selected_method = self.config.default_method();
        self.state = FlowState::ModalOpen;

        info!(
            gift_id = %trigger.gift_id,
            amount = %amount,
            editable = self.config.amount_editable,
            "opening payment modal"
        );
        self.presenter.present(FlowEvent::ShowPaymentModal {
            gift_id: trigger.gift_id,
            gift_name: trigger.gift_name,
            amount,
            amount_editable: self.config.amount_editable,
        });
        self.configure_payment_method();
        Ok(())
    }

    /// Input handler for the amount field: stores the value and re-runs [`Self::validate_amount`].
    pub fn set_amount(&mut self, input: &str) -> bool {
        if !self.config.amount_editable {
            return true;
        }
        self.form.amount.set_value(input);
        self.validate_amount()
    }

    /// Checks the entered amount against the gift's maximum and the configured minimum,
    /// updating the amount field's custom validity. Always valid when the price is fixed.
    pub fn validate_amount(&mut self) -> bool {
        if !self.config.amount_editable {
            return true;
        }

        let Some(amount) = self.form.amount_value() else {
            self.form.amount.set_custom_validity("");
            return true;
        };

        if let Some(max) = self.max_amount.filter(|max| amount > *max) {
            self.form
                .amount
                .set_custom_validity(format!("maximum value: {}", format_amount(max)));
            return false;
        }
        if let Some(min) = self.config.minimum_amount.filter(|min| amount < *min) {
            self.form
                .amount
                .set_custom_validity(format!("minimum value: {}", format_amount(min)));
            return false;
        }

        self.form.amount.set_custom_validity("");
        true
    }

    pub fn configure_payment_method(&mut self) -> MethodUi {
        let method = self
            .config
            .single_method()
            .unwrap_or(self.selected_method);
        let ui = MethodUi {
            pix_info: method == PaymentMethod::Pix,
            pix_button: method == PaymentMethod::Pix,
            card_button: method == PaymentMethod::Card,
            method_choice: self.config.single_method().is_none(),
        };
        self.presenter.present(FlowEvent::PaymentMethodConfigured(ui));
        ui
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) -> Result<MethodUi, FlowError> {
        if !self.config.is_enabled(method) {
            return Err(FlowError::MethodDisabled(method));
        }
        self.selected_method = method;
        Ok(self.configure_payment_method())
    }

    pub async fn submit_pix(&mut self) -> Result<SubmissionOutcome, FlowError> {
        self.submit(PaymentMethod::Pix).await
    }

    pub async fn submit_card(&mut self) -> Result<SubmissionOutcome, FlowError> {
        self.submit(PaymentMethod::Card).await
    }

    /// Submits with the currently selected method.
    pub async fn submit_selected(&mut self) -> Result<SubmissionOutcome, FlowError> {
        let method = self
            .config
            .single_method()
            .unwrap_or(self.selected_method);
        self.submit(method).await
    }

    pub async fn submit(&mut self, method: PaymentMethod) -> Result<SubmissionOutcome, FlowError> {
        if !matches!(self.state, FlowState::ModalOpen | FlowState::ErrorShown) {
            return Err(FlowError::InvalidState {
                operation: "submit a contribution",
                state: self.state,
            });
        }
        if !self.config.is_enabled(method) {
            return Err(FlowError::MethodDisabled(method));
        }

        self.validate_amount();
        let request = match self.form.to_request(method, &self.config.fields) {
            Ok(request) => request,
            Err(errors) => {
                self.presenter
                    .present(FlowEvent::ReportValidity(errors.clone()));
                return Err(FlowError::Validation(errors));
            }
        };

        self.state = FlowState::Submitting;
        self.presenter.present(FlowEvent::ShowLoading);
        info!(
            gift_id = %request.gift_id,
            method = %method,
            amount = %request.amount,
            "submitting contribution"
        );

        let response = match self.gateway.submit_contribution(&request).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(FlowError::Transport(err.to_string()))),
        };
        if !response.success {
            return Err(self.fail(FlowError::Rejected(response.rejection())));
        }

        match method {
            PaymentMethod::Pix => Ok(self.confirm_pix(&request, response.contribution_id)),
            PaymentMethod::Card => match response.redirect_url() {
                Some(url) => {
                    let url = url.to_string();
                    self.presenter.present(FlowEvent::HideLoading);
                    self.state = FlowState::Redirecting;
                    info!(gift_id = %request.gift_id, %url, "redirecting to card payment");
                    self.presenter
                        .present(FlowEvent::Navigate { url: url.clone() });
                    Ok(SubmissionOutcome::Redirect {
                        url,
                        contribution_id: response.contribution_id,
                    })
                }
                None => Err(self.fail(FlowError::MissingPaymentUrl)),
            },
        }
    }

    /// Closes the modal and forgets the current gift.
    pub fn close(&mut self) {
        self.form.reset();
        self.max_amount = None;
        self.state = FlowState::Idle;
        self.presenter.present(FlowEvent::HidePaymentModal);
    }

    fn confirm_pix(
        &mut self,
        request: &ContributionRequest,
        contribution_id: Option<ContributionId>,
    ) -> SubmissionOutcome {
        let amount = format_amount(request.amount);
        let pix_key = self.config.pix_key.clone();

        self.presenter.present(FlowEvent::HideLoading);
        self.presenter.present(FlowEvent::HidePaymentModal);

        let copied_to_clipboard = match self.clipboard.write_text(&pix_key) {
            Ok(()) => {
                info!("pix key copied to clipboard");
                true
            }
            Err(err) => {
                error!(error = %err, "failed to copy pix key");
                false
            }
        };

        self.state = FlowState::ConfirmationShown;
        self.presenter.present(FlowEvent::ShowPixConfirmation {
            amount: amount.clone(),
            pix_key: pix_key.clone(),
        });

        SubmissionOutcome::PixConfirmed {
            amount,
            pix_key,
            contribution_id,
            copied_to_clipboard,
        }
    }

    fn fail(&mut self, err: FlowError) -> FlowError {
        warn!(error = %err, "contribution failed");
        self.presenter.present(FlowEvent::HideLoading);
        self.presenter.present(FlowEvent::ShowError {
            message: err.to_string(),
        });
        self.state = FlowState::ErrorShown;
        err
    }
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
