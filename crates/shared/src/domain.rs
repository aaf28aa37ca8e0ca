use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(GiftId);
id_newtype!(ContributionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "pix")]
    Pix,
    #[serde(rename = "cartao")]
    Card,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Card => "cartao",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment method '{0}' (expected 'pix' or 'cartao')")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pix" => Ok(PaymentMethod::Pix),
            "cartao" | "card" => Ok(PaymentMethod::Card),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// A registry item as listed by `GET /api/presentes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    pub id: GiftId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "valor_total", with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(
        rename = "valor_arrecadado",
        with = "rust_decimal::serde::float",
        default
    )]
    pub raised: Decimal,
    #[serde(rename = "progresso_porcentagem", default)]
    pub progress_percent: f64,
    #[serde(rename = "esta_completo", default)]
    pub complete: bool,
    #[serde(
        rename = "imagem_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
}

impl Gift {
    /// Amount still missing to fund the gift, never negative.
    pub fn remaining(&self) -> Decimal {
        (self.total - self.raised).max(Decimal::ZERO)
    }
}

/// Formats a currency amount the way the registry displays it: two decimals, dot separator.
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
