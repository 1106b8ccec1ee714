use std::env;

use log::*;
use serde::{Deserialize, Serialize};
use urbannook_common::parse_boolean_flag;

use crate::db_types::OrderStatusType;

const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;
const DEFAULT_OUTBOX_BUFFER: usize = 256;

/// Which status changes `update_order_status` accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionPolicy {
    /// Any of the eight statuses may be set at any time. Administrators rely on this to correct mistakes.
    #[default]
    Permissive,
    /// Only forward moves along the lifecycle. Terminal orders are frozen, apart from `FAILED → PAID/CONFIRMED`, which
    /// is how a retried payment recovers an order.
    Strict,
}

impl TransitionPolicy {
    pub fn allows(&self, from: OrderStatusType, to: OrderStatusType) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => {
                from.is_forward_transition(to) ||
                    (from == OrderStatusType::Failed &&
                        matches!(to, OrderStatusType::Paid | OrderStatusType::Confirmed))
            },
        }
    }

    /// The statuses a gateway-reported payment failure may move an order out of. Only orders still waiting for their
    /// payment qualify, and the policy has the final say.
    pub fn payment_failure_sources(&self) -> Vec<OrderStatusType> {
        [OrderStatusType::Created, OrderStatusType::Paid, OrderStatusType::Failed]
            .into_iter()
            .filter(|from| self.allows(*from, OrderStatusType::Failed))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub transition_policy: TransitionPolicy,
    /// How many times a read-modify-write is retried after losing an optimistic concurrency race.
    pub max_conflict_retries: u32,
    pub outbox_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            transition_policy: TransitionPolicy::default(),
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            outbox_buffer: DEFAULT_OUTBOX_BUFFER,
        }
    }
}

impl EngineConfig {
    pub fn from_env_or_default() -> Self {
        let strict = parse_boolean_flag(env::var("UN_STRICT_TRANSITIONS").ok(), false);
        let transition_policy = if strict {
            info!("🪛️ Strict status transitions are enabled");
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        };
        let outbox_buffer = env::var("UN_OUTBOX_BUFFER")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .map_err(|e| warn!("🪛️ Invalid value for UN_OUTBOX_BUFFER ({s}): {e}. Using the default."))
                    .ok()
            })
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_OUTBOX_BUFFER);
        Self { transition_policy, max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES, outbox_buffer }
    }

    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }
}
