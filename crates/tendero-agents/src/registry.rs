use std::sync::Arc;

use tendero_core::Lane;

use crate::agent::LaneAgent;
use crate::agents::{CommerceAgent, InfoAgent, OrderStatusAgent, ProductAgent, SupportAgent};

/// Lane → agent map. One shared, re-entrant instance per lane for the
/// lifetime of the process; per-turn state lives in [`crate::TurnContext`],
/// never in the agents.
pub struct AgentRegistry {
    info: Arc<dyn LaneAgent>,
    product: Arc<dyn LaneAgent>,
    commerce: Arc<dyn LaneAgent>,
    support: Arc<dyn LaneAgent>,
    order_status: Arc<dyn LaneAgent>,
}

impl AgentRegistry {
    /// The stock lineup: the five production agents.
    pub fn new() -> Self {
        Self {
            info: Arc::new(InfoAgent),
            product: Arc::new(ProductAgent),
            commerce: Arc::new(CommerceAgent),
            support: Arc::new(SupportAgent),
            order_status: Arc::new(OrderStatusAgent),
        }
    }

    /// Replace the agent for its own lane. Used by tests to inject stubs.
    pub fn with_agent(mut self, agent: Arc<dyn LaneAgent>) -> Self {
        match agent.lane() {
            Lane::Info => self.info = agent,
            Lane::Product => self.product = agent,
            Lane::Commerce => self.commerce = agent,
            Lane::Support => self.support = agent,
            Lane::OrderStatus => self.order_status = agent,
        }
        self
    }

    pub fn for_lane(&self, lane: Lane) -> Arc<dyn LaneAgent> {
        match lane {
            Lane::Info => self.info.clone(),
            Lane::Product => self.product.clone(),
            Lane::Commerce => self.commerce.clone(),
            Lane::Support => self.support.clone(),
            Lane::OrderStatus => self.order_status.clone(),
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_lane_resolves_to_its_agent() {
        let registry = AgentRegistry::new();
        for lane in Lane::ALL {
            assert_eq!(registry.for_lane(lane).lane(), lane);
        }
    }

    #[test]
    fn override_replaces_only_its_lane() {
        struct StubInfo;
        impl LaneAgent for StubInfo {
            fn lane(&self) -> Lane {
                Lane::Info
            }
            fn system_instructions(&self) -> String {
                String::new()
            }
            fn build_tools(
                &self,
                _ctx: &std::sync::Arc<crate::TurnContext>,
            ) -> Vec<Box<dyn tendero_llm::Tool>> {
                Vec::new()
            }
            fn error_message(&self) -> String {
                "stub".to_string()
            }
        }

        let registry = AgentRegistry::new().with_agent(Arc::new(StubInfo));
        assert_eq!(registry.for_lane(Lane::Info).error_message(), "stub");
        assert_ne!(registry.for_lane(Lane::Commerce).error_message(), "stub");
    }
}
