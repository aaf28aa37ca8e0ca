//! Client-side contribution flow for the gift registry.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod events;
pub mod flow;
pub mod form;
pub mod gateway;
pub mod refresh;

pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use config::{
    load_settings, load_settings_from, FieldRequirement, FieldSet, FlowConfig, FlowVariant,
    Settings,
};
pub use error::FlowError;
pub use events::{FlowEvent, MethodUi, Presenter, RecordingPresenter};
pub use flow::{ContributionFlow, FlowState, GiftTrigger, SubmissionOutcome, TriggerDataset};
pub use form::{ContributionForm, FieldError, FormField, InputField};
pub use gateway::{ContributionGateway, GatewayError, RegistryClient};
pub use refresh::{spawn_gift_refresh, GiftListUpdate, ZeroRefreshInterval};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
