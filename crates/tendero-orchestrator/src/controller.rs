use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use tendero_agents::{AgentRegistry, AgentRunner};
use tendero_core::{Lane, OutgoingMessage, TenderoConfig, Turn, TurnResult};
use tendero_llm::{ChatOptions, ChatProvider};
use tendero_router::Router;
use tendero_session::{builder, validator, Session};
use tendero_store::{keys, SessionStore};

use crate::error::Result;
use crate::events;

/// Drives one inbound turn end to end. Re-entrant and safe to share: many
/// turns for different sessions run concurrently, while the per-session
/// lock keeps each session single-writer.
pub struct TurnController {
    store: Arc<dyn SessionStore>,
    router: Router,
    registry: AgentRegistry,
    runner: AgentRunner,
    config: TenderoConfig,
}

impl TurnController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn ChatProvider>,
        registry: AgentRegistry,
        config: TenderoConfig,
    ) -> Self {
        let router = Router::new(Some(provider.clone()), config.llm.clone())
            .with_max_dialogue_text(config.dispatch.max_dialogue_text);
        let runner = AgentRunner::new(
            provider,
            ChatOptions {
                temperature: config.llm.temperature,
                timeout_ms: config.llm.timeout_ms,
                max_tokens: 1024,
                cancel: None,
            },
        );
        Self {
            store,
            router,
            registry,
            runner,
            config,
        }
    }

    /// Process one turn. Never panics on downstream faults; the result's
    /// `success`/`error` pair tells the caller what happened.
    pub async fn handle_turn(&self, turn: &Turn) -> TurnResult {
        let session_key = keys::session(&turn.tenant_id, &turn.wa_id);
        let lock_key = keys::session_lock(&turn.tenant_id, &turn.wa_id);
        let idem_key = keys::turn_processed(&turn.message_id);

        // 1. Idempotency: a replayed message has no effects at all.
        match self.store.exists(&idem_key).await {
            Ok(true) => {
                events::duplicate_turn(turn);
                return TurnResult::duplicate();
            }
            Ok(false) => {}
            Err(e) => return TurnResult::failed(format!("{}: {}", e.kind(), e)),
        }

        // 2. Per-session lock with a random holder token.
        let token = Uuid::new_v4().to_string();
        let acquired = match self
            .store
            .try_acquire_lock(&lock_key, &token, self.config.session.lock_ttl_seconds)
            .await
        {
            Ok(acquired) => acquired,
            Err(e) => return TurnResult::failed(format!("{}: {}", e.kind(), e)),
        };
        if !acquired {
            events::lock_unavailable(turn);
            return TurnResult::lock_unavailable();
        }

        let result = self.locked_turn(turn, &session_key, &idem_key).await;

        if let Err(e) = self.store.release_lock(&lock_key, &token).await {
            warn!(err = %e, "failed to release session lock; TTL will reclaim it");
        }
        result
    }

    /// Steps 3-12, run while holding the session lock.
    async fn locked_turn(&self, turn: &Turn, session_key: &str, idem_key: &str) -> TurnResult {
        // 3. Load or create.
        let stored = match self.store.get(session_key).await {
            Ok(stored) => stored,
            Err(e) => return TurnResult::failed(format!("{}: {}", e.kind(), e)),
        };
        let mut session = match stored {
            Some(bytes) => builder::from_json(Some(&bytes)),
            None => {
                events::session_created(&turn.tenant_id, &turn.wa_id);
                builder::new_session(&turn.tenant_id, &turn.wa_id, None, None)
            }
        };

        // 4. Validate; a corrupt session heals itself with a reset. Marking
        // the message processed here prevents retry storms against the same
        // bad state.
        if let Err(e) = validator::validate(&session) {
            events::validation_error(turn, &e);
            let fresh = builder::new_session(&turn.tenant_id, &turn.wa_id, None, None);
            if let Err(e) = self.persist_session(session_key, &fresh).await {
                return TurnResult::failed(format!("{}: {}", e.kind(), e));
            }
            self.mark_processed(idem_key).await;
            return TurnResult::failed("state validation failed");
        }

        // 5. Append the user entry and persist NOW: the user's words must
        // survive any downstream fault. The lock serialises writers, so a
        // plain setex is safe here.
        if let Err(e) = session.push_user_entry(&turn.text, &turn.message_id, &turn.timestamp) {
            return TurnResult::failed(format!("Turn processing failed: {}", e));
        }
        if let Err(e) = self.persist_session(session_key, &session).await {
            return TurnResult::failed(format!("{}: {}", e.kind(), e));
        }
        let dialogue_checkpoint = session.clone();

        // 6-8. Route and run the agent chain; any residual error lands in
        // the error path below with the checkpoint intact.
        match self.dispatch(turn, &mut session).await {
            Ok((messages, final_lane)) => {
                // 9. Persist the finished session (lock-serialised setex).
                if let Err(e) = self.persist_session(session_key, &session).await {
                    events::turn_error(turn, &e);
                    self.mark_processed(idem_key).await;
                    return TurnResult::failed(format!("Turn processing failed: {}", e));
                }
                // 10. Mark processed.
                self.mark_processed(idem_key).await;
                events::turn_completed(turn, final_lane, messages.len());
                TurnResult::ok(messages, final_lane)
            }
            Err(e) => {
                // 11. Error path: the dialogue already contains the user
                // turn; persist that checkpoint, mark processed, report.
                events::turn_error(turn, &e);
                if let Err(persist_err) = self
                    .persist_session(session_key, &dialogue_checkpoint)
                    .await
                {
                    warn!(err = %persist_err, "failed to persist dialogue checkpoint");
                }
                self.mark_processed(idem_key).await;
                TurnResult::failed(format!("Turn processing failed: {}", e))
            }
        }
    }

    /// Steps 6-8: route, run the baton chain, finalise the session.
    async fn dispatch(
        &self,
        turn: &Turn,
        session: &mut Session,
    ) -> Result<(Vec<OutgoingMessage>, Lane)> {
        // 6. Route.
        let decision = self.router.route(turn, session).await;
        session.set_current_lane(decision.lane);
        events::turn_routed(turn, &decision);

        // 7. Agent baton chain.
        let mut accumulated: Vec<OutgoingMessage> = Vec::new();
        let mut hops: u32 = 0;
        let mut current_lane = decision.lane;
        let mut current_intent = decision.intent.clone();
        let mut carry: Map<String, Value> = Map::new();

        loop {
            if !carry.is_empty() {
                session.apply_patch(&carry);
            }
            let agent = self.registry.for_lane(current_lane);
            let response = self
                .runner
                .run(agent.as_ref(), turn, session, &current_intent)
                .await;

            session.apply_patch(&response.state_patch);
            session.push_assistant_entry(current_lane, &response.messages, &now())?;
            accumulated.extend(response.messages);

            let Some(baton) = response.baton else { break };
            if baton.to_lane == current_lane {
                events::baton_stop(turn, current_lane, "same_lane_handoff");
                break;
            }
            if hops >= self.config.dispatch.max_baton_hops {
                events::baton_stop(turn, current_lane, "hop_limit");
                break;
            }
            current_lane = baton.to_lane;
            current_intent = baton.intent;
            carry = baton.carry_state;
            hops += 1;
        }

        // 8. Finalise and re-validate before anything is persisted.
        session.set_current_lane(current_lane);
        session.touch(&now());
        validator::validate(session)?;

        Ok((accumulated, current_lane))
    }

    async fn persist_session(
        &self,
        session_key: &str,
        session: &Session,
    ) -> Result<()> {
        let bytes = session.to_bytes()?;
        self.store
            .setex(
                session_key,
                self.config.session.session_ttl_seconds,
                &bytes,
            )
            .await?;
        Ok(())
    }

    /// Best effort: a failed marker write degrades idempotency, not the
    /// turn itself.
    async fn mark_processed(&self, idem_key: &str) {
        if let Err(e) = self
            .store
            .setex(
                idem_key,
                self.config.session.idempotency_ttl_seconds,
                b"1",
            )
            .await
        {
            warn!(err = %e, "failed to write idempotency marker");
        }
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
