//! In-memory gateway shared by the flow and refresh tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    domain::{Gift, GiftId},
    error::{ApiException, ErrorCode},
    protocol::{ContributionRequest, ContributionResponse},
};

use crate::gateway::{ContributionGateway, GatewayError};

pub(crate) enum Reply {
    Respond(ContributionResponse),
    Unreachable(String),
}

#[derive(Default)]
pub(crate) struct ScriptedGateway {
    replies: Mutex<VecDeque<Reply>>,
    submitted: Mutex<Vec<ContributionRequest>>,
    gifts: Vec<Gift>,
    list_calls: AtomicUsize,
    failing_list: bool,
}

impl ScriptedGateway {
    pub(crate) fn replying(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    pub(crate) fn with_gifts(gifts: Vec<Gift>) -> Self {
        Self {
            gifts,
            ..Default::default()
        }
    }

    pub(crate) fn failing_list() -> Self {
        Self {
            failing_list: true,
            ..Default::default()
        }
    }

    pub(crate) fn submitted(&self) -> Vec<ContributionRequest> {
        self.submitted.lock().expect("submitted lock").clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContributionGateway for ScriptedGateway {
    async fn submit_contribution(
        &self,
        request: &ContributionRequest,
    ) -> Result<ContributionResponse, GatewayError> {
        self.submitted
            .lock()
            .expect("submitted lock")
            .push(request.clone());
        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .expect("unexpected contribution submission");
        match reply {
            Reply::Respond(response) => Ok(response),
            Reply::Unreachable(detail) => Err(GatewayError::UnexpectedResponse {
                url: "http://registry.test/api/contribuir".to_string(),
                status: 503,
                detail,
            }),
        }
    }

    async fn list_gifts(&self) -> Result<Vec<Gift>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_list {
            return Err(ApiException::new(ErrorCode::Rejected, "database offline").into());
        }
        Ok(self.gifts.clone())
    }

    async fn fetch_gift(&self, gift_id: GiftId) -> Result<Gift, GatewayError> {
        self.gifts
            .iter()
            .find(|gift| gift.id == gift_id)
            .cloned()
            .ok_or_else(|| ApiException::new(ErrorCode::NotFound, "Presente não encontrado").into())
    }
}

pub(crate) fn gift(id: i64, name: &str, total: Decimal, raised: Decimal) -> Gift {
    Gift {
        id: GiftId(id),
        name: name.to_string(),
        description: String::new(),
        total,
        raised,
        progress_percent: 0.0,
        complete: raised >= total,
        image_url: None,
    }
}
