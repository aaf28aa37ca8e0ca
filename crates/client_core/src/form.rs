//! Typed view-model for the contribution form.
//!
//! Each input mirrors what the page's `<form>` exposes: a raw string value plus an
//! optional custom validity message. [`ContributionForm::check_validity`] reproduces
//! native constraint validation so the controller never submits a form the browser
//! would have refused.

use std::fmt;

use rust_decimal::Decimal;
use shared::{
    domain::{GiftId, PaymentMethod},
    protocol::ContributionRequest,
};
use validator::ValidateEmail;

use crate::config::{FieldRequirement, FieldSet};

const REQUIRED_MESSAGE: &str = "Please fill out this field.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    GiftId,
    Name,
    Email,
    Cpf,
    Phone,
    Amount,
    Message,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormField::GiftId => "presente_id",
            FormField::Name => "nome",
            FormField::Email => "email",
            FormField::Cpf => "cpf",
            FormField::Phone => "telefone",
            FormField::Amount => "valor",
            FormField::Message => "mensagem",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    value: String,
    custom_validity: Option<String>,
}

impl InputField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// An empty message clears the custom error, as `setCustomValidity("")` does.
    pub fn set_custom_validity(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.custom_validity = if message.is_empty() {
            None
        } else {
            Some(message)
        };
    }

    pub fn custom_validity(&self) -> Option<&str> {
        self.custom_validity.as_deref()
    }

    fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    fn clear(&mut self) {
        self.value.clear();
        self.custom_validity = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionForm {
    /// Gift name shown in the modal header.
    pub gift_name: String,
    /// Read-only amount label used when the price is fixed.
    pub amount_display: String,
    pub gift_id: InputField,
    pub name: InputField,
    pub email: InputField,
    pub cpf: InputField,
    pub phone: InputField,
    pub amount: InputField,
    pub message: InputField,
}

impl ContributionForm {
    pub fn reset(&mut self) {
        self.gift_name.clear();
        self.amount_display.clear();
        for field in self.inputs_mut() {
            field.clear();
        }
    }

    pub fn field(&self, field: FormField) -> &InputField {
        match field {
            FormField::GiftId => &self.gift_id,
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Cpf => &self.cpf,
            FormField::Phone => &self.phone,
            FormField::Amount => &self.amount,
            FormField::Message => &self.message,
        }
    }

    /// Parsed amount, accepting either `.` or `,` as decimal separator.
    pub fn amount_value(&self) -> Option<Decimal> {
        parse_amount(self.amount.value())
    }

    pub fn check_validity(&self, fields: &FieldSet) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.gift_id.value().trim().parse::<i64>().is_err() {
            errors.push(FieldError::new(FormField::GiftId, "no gift selected"));
        }

        require(&mut errors, FormField::Name, &self.name);

        if self.email.is_blank() {
            errors.push(FieldError::new(FormField::Email, REQUIRED_MESSAGE));
        } else if !self.email.value().trim().to_string().validate_email() {
            errors.push(FieldError::new(
                FormField::Email,
                "Please enter a valid email address.",
            ));
        }

        if self.amount.is_blank() {
            errors.push(FieldError::new(FormField::Amount, REQUIRED_MESSAGE));
        } else {
            match self.amount_value() {
                Some(amount) if amount > Decimal::ZERO => {}
                Some(_) => errors.push(FieldError::new(
                    FormField::Amount,
                    "Please enter an amount greater than zero.",
                )),
                None => errors.push(FieldError::new(
                    FormField::Amount,
                    "Please enter a number.",
                )),
            }
        }

        for (field, requirement) in [
            (FormField::Cpf, fields.cpf),
            (FormField::Phone, fields.phone),
            (FormField::Message, fields.message),
        ] {
            if requirement == FieldRequirement::Required {
                require(&mut errors, field, self.field(field));
            }
        }

        for field in [
            FormField::Name,
            FormField::Email,
            FormField::Cpf,
            FormField::Phone,
            FormField::Amount,
            FormField::Message,
        ] {
            if let Some(message) = self.field(field).custom_validity() {
                if !errors.iter().any(|err| err.field == field) {
                    errors.push(FieldError::new(field, message));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Builds the payload for one submission. Fields the page does not collect are sent empty.
    pub fn to_request(
        &self,
        method: PaymentMethod,
        fields: &FieldSet,
    ) -> Result<ContributionRequest, Vec<FieldError>> {
        self.check_validity(fields)?;

        let gift_id = self
            .gift_id
            .value()
            .trim()
            .parse::<i64>()
            .map_err(|_| vec![FieldError::new(FormField::GiftId, "no gift selected")])?;
        let amount = self.amount_value().ok_or_else(|| {
            vec![FieldError::new(FormField::Amount, "Please enter a number.")]
        })?;

        let collected = |requirement: FieldRequirement, field: &InputField| {
            if requirement.is_collected() {
                field.value().trim().to_string()
            } else {
                String::new()
            }
        };

        Ok(ContributionRequest {
            gift_id: GiftId(gift_id),
            gift_name: self.gift_name.clone(),
            name: self.name.value().trim().to_string(),
            email: self.email.value().trim().to_string(),
            cpf: collected(fields.cpf, &self.cpf),
            phone: collected(fields.phone, &self.phone),
            amount,
            message: collected(fields.message, &self.message),
            method,
        })
    }

    fn inputs_mut(&mut self) -> [&mut InputField; 7] {
        [
            &mut self.gift_id,
            &mut self.name,
            &mut self.email,
            &mut self.cpf,
            &mut self.phone,
            &mut self.amount,
            &mut self.message,
        ]
    }
}

fn require(errors: &mut Vec<FieldError>, field: FormField, input: &InputField) {
    if input.is_blank() {
        errors.push(FieldError::new(field, REQUIRED_MESSAGE));
    }
}

pub(crate) fn parse_amount(raw: &str) -> Option<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ContributionForm {
        let mut form = ContributionForm {
            gift_name: "Liquidificador".to_string(),
            ..Default::default()
        };
        form.gift_id.set_value("4");
        form.name.set_value("Carla");
        form.email.set_value("carla@example.com");
        form.amount.set_value("80.00");
        form
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = ContributionForm::default()
            .check_validity(&FieldSet::default())
            .expect_err("must be invalid");
        let fields: Vec<FormField> = errors.iter().map(|err| err.field).collect();
        assert_eq!(
            fields,
            vec![
                FormField::GiftId,
                FormField::Name,
                FormField::Email,
                FormField::Amount
            ]
        );
    }

    #[test]
    fn rejects_malformed_email() {
        let mut form = filled_form();
        form.email.set_value("carla-at-example");
        let errors = form
            .check_validity(&FieldSet::default())
            .expect_err("must be invalid");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, FormField::Email);
    }

    #[test]
    fn required_optional_fields_are_enforced() {
        let fields = FieldSet {
            cpf: FieldRequirement::Required,
            ..Default::default()
        };
        let errors = filled_form()
            .check_validity(&fields)
            .expect_err("cpf is required");
        assert_eq!(errors, vec![FieldError::new(FormField::Cpf, REQUIRED_MESSAGE)]);
    }

    #[test]
    fn custom_validity_blocks_submission_until_cleared() {
        let mut form = filled_form();
        form.amount.set_custom_validity("maximum value: 50.00");
        let errors = form
            .check_validity(&FieldSet::default())
            .expect_err("custom error");
        assert_eq!(errors[0].message, "maximum value: 50.00");

        form.amount.set_custom_validity("");
        assert!(form.check_validity(&FieldSet::default()).is_ok());
    }

    #[test]
    fn accepts_comma_decimal_separator() {
        let mut form = filled_form();
        form.amount.set_value("150,75");
        assert_eq!(form.amount_value(), Some(Decimal::new(15075, 2)));
    }

    #[test]
    fn zero_amount_is_invalid() {
        let mut form = filled_form();
        form.amount.set_value("0");
        let errors = form
            .check_validity(&FieldSet::default())
            .expect_err("zero amount");
        assert_eq!(errors[0].field, FormField::Amount);
    }

    #[test]
    fn hidden_fields_are_sent_empty() {
        let mut form = filled_form();
        form.cpf.set_value("123.456.789-00");
        form.message.set_value("  Parabéns!  ");
        let fields = FieldSet {
            cpf: FieldRequirement::Hidden,
            ..Default::default()
        };

        let request = form
            .to_request(PaymentMethod::Card, &fields)
            .expect("valid form");
        assert_eq!(request.gift_id, GiftId(4));
        assert_eq!(request.gift_name, "Liquidificador");
        assert_eq!(request.cpf, "");
        assert_eq!(request.message, "Parabéns!");
        assert_eq!(request.amount, Decimal::new(80, 0));
        assert_eq!(request.method, PaymentMethod::Card);
    }

    #[test]
    fn reset_clears_values_and_custom_validity() {
        let mut form = filled_form();
        form.amount.set_custom_validity("maximum value: 1.00");
        form.reset();
        assert_eq!(form, ContributionForm::default());
    }
}
