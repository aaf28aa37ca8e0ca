//! Presentation events emitted by the contribution flow.

use shared::domain::GiftId;

use crate::form::FieldError;

/// Visibility of the method-specific parts of the payment modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodUi {
    pub pix_info: bool,
    pub pix_button: bool,
    pub card_button: bool,
    /// Radio group for choosing a method; hidden when only one method is offered.
    pub method_choice: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    ShowPaymentModal {
        gift_id: GiftId,
        gift_name: String,
        amount: String,
        amount_editable: bool,
    },
    HidePaymentModal,
    PaymentMethodConfigured(MethodUi),
    ReportValidity(Vec<FieldError>),
    ShowLoading,
    HideLoading,
    ShowPixConfirmation {
        amount: String,
        pix_key: String,
    },
    Navigate {
        url: String,
    },
    ShowError {
        message: String,
    },
}

pub trait Presenter {
    fn present(&mut self, event: FlowEvent);
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn present(&mut self, event: FlowEvent) {
        (**self).present(event);
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn present(&mut self, event: FlowEvent) {
        (**self).present(event);
    }
}

/// Keeps every event in order; used by embedders that render after the fact and by tests.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Vec<FlowEvent>,
}

impl RecordingPresenter {
    pub fn events(&self) -> &[FlowEvent] {
        &self.events
    }

    pub fn navigation_target(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            FlowEvent::Navigate { url } => Some(url.as_str()),
            _ => None,
        })
    }

    pub fn last_error(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            FlowEvent::ShowError { message } => Some(message.as_str()),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, event: FlowEvent) {
        self.events.push(event);
    }
}
