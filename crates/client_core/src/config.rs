use std::{collections::HashMap, fmt, fs, path::Path, str::FromStr, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::domain::PaymentMethod;
use tracing::warn;

pub const DEFAULT_PIX_KEY: &str = "83991314075";
pub const SETTINGS_FILE: &str = "registry.toml";

/// Which contribution page layout the flow reproduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowVariant {
    /// PIX only, gift price fixed and not editable.
    #[default]
    PixFixed,
    /// PIX or card, contributor chooses the amount up to the gift's maximum.
    PixAndCard,
    /// Card only, contributor chooses the amount.
    Contribution,
}

impl FromStr for FlowVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pix_fixed" => Ok(FlowVariant::PixFixed),
            "pix_and_card" => Ok(FlowVariant::PixAndCard),
            "contribution" => Ok(FlowVariant::Contribution),
            other => Err(format!(
                "unknown flow variant '{other}' (expected pix_fixed, pix_and_card or contribution)"
            )),
        }
    }
}

impl fmt::Display for FlowVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowVariant::PixFixed => "pix_fixed",
            FlowVariant::PixAndCard => "pix_and_card",
            FlowVariant::Contribution => "contribution",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldRequirement {
    Hidden,
    #[default]
    Optional,
    Required,
}

impl FieldRequirement {
    pub fn is_collected(self) -> bool {
        self != FieldRequirement::Hidden
    }
}

/// Optional contributor fields; name, email and amount are always collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSet {
    pub cpf: FieldRequirement,
    pub phone: FieldRequirement,
    pub message: FieldRequirement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowConfig {
    pub enabled_methods: Vec<PaymentMethod>,
    pub amount_editable: bool,
    pub fields: FieldSet,
    pub pix_key: String,
    pub minimum_amount: Option<Decimal>,
}

impl FlowConfig {
    pub fn for_variant(variant: FlowVariant) -> Self {
        match variant {
            FlowVariant::PixFixed => Self {
                enabled_methods: vec![PaymentMethod::Pix],
                amount_editable: false,
                fields: FieldSet::default(),
                pix_key: DEFAULT_PIX_KEY.to_string(),
                minimum_amount: None,
            },
            FlowVariant::PixAndCard => Self {
                enabled_methods: vec![PaymentMethod::Pix, PaymentMethod::Card],
                amount_editable: true,
                fields: FieldSet::default(),
                pix_key: DEFAULT_PIX_KEY.to_string(),
                minimum_amount: None,
            },
            FlowVariant::Contribution => Self {
                enabled_methods: vec![PaymentMethod::Card],
                amount_editable: true,
                fields: FieldSet {
                    cpf: FieldRequirement::Hidden,
                    phone: FieldRequirement::Hidden,
                    message: FieldRequirement::Optional,
                },
                pix_key: DEFAULT_PIX_KEY.to_string(),
                minimum_amount: None,
            },
        }
    }

    pub fn is_enabled(&self, method: PaymentMethod) -> bool {
        self.enabled_methods.contains(&method)
    }

    /// The only method on offer, when the page has no method choice.
    pub fn single_method(&self) -> Option<PaymentMethod> {
        match self.enabled_methods.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    pub fn default_method(&self) -> PaymentMethod {
        self.enabled_methods
            .first()
            .copied()
            .unwrap_or(PaymentMethod::Pix)
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::for_variant(FlowVariant::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub variant: FlowVariant,
    pub pix_key: String,
    pub minimum_amount: Option<Decimal>,
    pub request_timeout_seconds: u64,
    pub gift_refresh_seconds: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            variant: FlowVariant::default(),
            pix_key: DEFAULT_PIX_KEY.into(),
            minimum_amount: None,
            request_timeout_seconds: 15,
            gift_refresh_seconds: None,
        }
    }
}

impl Settings {
    pub fn flow_config(&self) -> FlowConfig {
        let mut config = FlowConfig::for_variant(self.variant);
        config.pix_key = self.pix_key.clone();
        config.minimum_amount = self.minimum_amount;
        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    /// `None` keeps the gift list refresh disabled.
    pub fn gift_refresh_interval(&self) -> Option<Duration> {
        self.gift_refresh_seconds
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "server_url" => self.server_url = value.trim().to_string(),
            "variant" => match value.parse() {
                Ok(variant) => self.variant = variant,
                Err(err) => warn!(%err, "ignoring flow variant setting"),
            },
            "pix_key" => self.pix_key = value.trim().to_string(),
            "minimum_amount" => match value.trim().parse::<Decimal>() {
                Ok(min) => self.minimum_amount = Some(min),
                Err(err) => warn!(value, %err, "ignoring minimum_amount setting"),
            },
            "request_timeout_seconds" => match value.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_seconds = secs,
                Err(err) => warn!(value, %err, "ignoring request_timeout_seconds setting"),
            },
            "gift_refresh_seconds" => match value.trim().parse::<u64>() {
                Ok(secs) => self.gift_refresh_seconds = Some(secs),
                Err(err) => warn!(value, %err, "ignoring gift_refresh_seconds setting"),
            },
            other => warn!(key = other, "ignoring unknown registry setting"),
        }
    }

    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let table: toml::Table = toml::from_str(raw).context("registry settings are not valid TOML")?;
        for (key, value) in &table {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    warn!(key = key.as_str(), value = %other, "ignoring non-scalar registry setting");
                    continue;
                }
            };
            self.apply(key, &value);
        }
        Ok(())
    }

    fn apply_env(&mut self, vars: &HashMap<String, String>) {
        if let Some(v) = vars.get("REGISTRY_SERVER_URL") {
            self.apply("server_url", v);
        }
        for key in [
            "server_url",
            "variant",
            "pix_key",
            "minimum_amount",
            "request_timeout_seconds",
            "gift_refresh_seconds",
        ] {
            if let Some(v) = vars.get(&format!("APP__{}", key.to_ascii_uppercase())) {
                self.apply(key, v);
            }
        }
    }
}

/// Defaults, then `registry.toml` in the working directory, then environment overrides.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        if let Err(err) = settings.apply_file(&raw) {
            warn!(file = SETTINGS_FILE, error = %err, "ignoring registry settings file");
        }
    }

    settings.apply_env(&std::env::vars().collect());
    settings
}

/// Like [`load_settings`] but the file is mandatory and its errors are reported.
pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with_env(path, &std::env::vars().collect())
}

fn load_settings_with_env(
    path: &Path,
    vars: &HashMap<String, String>,
) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read registry settings '{}'", path.display()))?;
    let mut settings = Settings::default();
    settings
        .apply_file(&raw)
        .with_context(|| format!("failed to parse registry settings '{}'", path.display()))?;
    settings.apply_env(vars);
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
