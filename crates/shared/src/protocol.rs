use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{ContributionId, Gift, GiftId, PaymentMethod};

/// Body of `POST /api/contribuir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRequest {
    #[serde(rename = "presente_id")]
    pub gift_id: GiftId,
    #[serde(rename = "presente_nome")]
    pub gift_name: String,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "valor", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "metodo_pagamento")]
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(
        rename = "contribuicao_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contribution_id: Option<ContributionId>,
    #[serde(rename = "metodo", default, skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContributionResponse {
    /// Non-empty card redirect target, if the backend supplied one.
    pub fn redirect_url(&self) -> Option<&str> {
        self.payment_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Error text for a rejected contribution; falls back to a generic message when the
    /// backend omitted one.
    pub fn rejection(&self) -> String {
        self.error
            .clone()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "contribution was not accepted".to_string())
    }
}

/// Body of `GET /api/presentes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiftListResponse {
    pub success: bool,
    #[serde(rename = "presentes", default)]
    pub gifts: Vec<Gift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /api/presentes/<id>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiftResponse {
    pub success: bool,
    #[serde(rename = "presente", default, skip_serializing_if = "Option::is_none")]
    pub gift: Option<Gift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
