//! Renders flow events on the terminal.

use client_core::{FlowEvent, Presenter};

#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn present(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::ShowPaymentModal {
                gift_id,
                gift_name,
                amount,
                amount_editable,
            } => {
                let note = if amount_editable {
                    "up to"
                } else {
                    "fixed at"
                };
                println!("Contributing to '{gift_name}' (#{gift_id}), {note} R$ {amount}");
            }
            FlowEvent::PaymentMethodConfigured(ui) => {
                if ui.pix_button {
                    println!("Payment method: PIX");
                } else if ui.card_button {
                    println!("Payment method: card");
                }
            }
            FlowEvent::ReportValidity(errors) => {
                eprintln!("Please fix the form:");
                for err in errors {
                    eprintln!("  - {err}");
                }
            }
            FlowEvent::ShowLoading => println!("Sending contribution..."),
            FlowEvent::HideLoading | FlowEvent::HidePaymentModal => {}
            FlowEvent::ShowPixConfirmation { amount, pix_key } => {
                println!("Thank you! Send R$ {amount} via PIX to the key below.");
                println!("PIX key: {pix_key}");
            }
            FlowEvent::Navigate { url } => {
                println!("Continue the card payment at:");
                println!("{url}");
            }
            FlowEvent::ShowError { message } => eprintln!("Erro: {message}"),
        }
    }
}
