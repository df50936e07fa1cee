use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use futures::StreamExt;
use muse_llm::{Message, StreamEvent};
use muse_persist::{AssistantContext, ConversationLog, PersistenceClient, DEFAULT_HISTORY_TURNS};
use muse_types::{AccessPolicy, Agent, Caller, RelayEvent};
use tokio::sync::mpsc;

use crate::accumulator::ReplyAccumulator;
use crate::error::{RelayError, Result};
use crate::failure;
use crate::generator::Generator;
use crate::locks::ConversationLocks;
use crate::model::{ModelProvider, ModelResolution, ResolvedModel};
use crate::preamble::build_preamble;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub history_turns: usize,
    /// Deadline for the whole generation, opening the stream included
    pub generation_timeout: Duration,
    pub channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            history_turns: DEFAULT_HISTORY_TURNS,
            generation_timeout: Duration::from_secs(120),
            channel_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Received,
    HistoryLoaded,
    Generating,
    Streaming,
    Completed,
    Failed,
}

/// How a relayed exchange ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Reply streamed and the turn persisted
    Completed { turn_id: String },
    /// Generation failed; the error text was persisted as the reply
    Failed { turn_id: String },
    /// Model configuration missing; nothing persisted
    Unconfigured,
    /// The consumer went away mid-stream; nothing persisted
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct SendMessage {
    pub conversation_id: String,
    pub message: String,
    /// Overrides the agent attached to the conversation
    pub agent: Option<Agent>,
}

/// Streams an assistant reply for one user message and records the turn
#[derive(Clone)]
pub struct ResponseRelay {
    log: ConversationLog,
    client: Arc<dyn PersistenceClient>,
    models: Arc<dyn ModelProvider>,
    generator: Arc<dyn Generator>,
    access: Arc<dyn AccessPolicy>,
    locks: Arc<ConversationLocks>,
    config: RelayConfig,
}

enum Generation {
    Finished,
    Failed(String),
    Cancelled,
}

impl ResponseRelay {
    pub fn new(
        client: Arc<dyn PersistenceClient>,
        models: Arc<dyn ModelProvider>,
        generator: Arc<dyn Generator>,
        access: Arc<dyn AccessPolicy>,
        config: RelayConfig,
    ) -> Self {
        Self {
            log: ConversationLog::new(client.clone()),
            client,
            models,
            generator,
            access,
            locks: Arc::new(ConversationLocks::new()),
            config,
        }
    }

    pub fn conversation_log(&self) -> &ConversationLog {
        &self.log
    }

    /// Spawn the exchange in the background and return its event receiver.
    ///
    /// Dropping the receiver cancels generation.
    pub fn spawn_send(&self, caller: Caller, request: SendMessage) -> mpsc::Receiver<RelayEvent> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let relay = self.clone();

        tokio::spawn(async move {
            if let Err(e) = relay.send(&caller, request, tx.clone()).await {
                tracing::error!(error = %e, "relay failed");
                let _ = tx
                    .send(RelayEvent::Error {
                        message: format!("I apologize, but I encountered an error: {}", e),
                    })
                    .await;
            }
        });

        rx
    }

    /// Run one exchange to the end, feeding events into `tx`
    pub async fn send(
        &self,
        caller: &Caller,
        request: SendMessage,
        tx: mpsc::Sender<RelayEvent>,
    ) -> Result<RelayOutcome> {
        let started = Instant::now();
        let conversation_id = request.conversation_id.as_str();
        let mut state = RelayState::Received;
        tracing::debug!(conversation_id, ?state, "relay");

        let _lease = self.locks.acquire(conversation_id).await;

        let conversation = self
            .log
            .get_owned(conversation_id, &caller.user_id)
            .await
            .map_err(|e| RelayError::from_lookup(e, conversation_id))?;

        let agent = match request.agent {
            Some(agent) => Some(agent),
            None => match &conversation.agent_id {
                Some(agent_id) => Some(
                    self.client
                        .get_agent(agent_id)
                        .await?
                        .ok_or_else(|| RelayError::AgentNotFound(agent_id.clone()))?,
                ),
                None => None,
            },
        };
        if let Some(agent) = &agent {
            if !self.access.can_use_agent(agent, caller) {
                return Err(RelayError::AgentForbidden(agent.slug.clone()));
            }
        }

        let model = match self.models.resolve(agent.as_ref()).await? {
            ModelResolution::Ready(model) => model,
            ModelResolution::Missing(gap) => {
                tracing::warn!(conversation_id, ?gap, "chat model not configured");
                let _ = tx
                    .send(RelayEvent::Chunk {
                        text: gap.user_message().to_string(),
                    })
                    .await;
                let _ = tx.send(RelayEvent::Done { turn_id: None }).await;
                return Ok(RelayOutcome::Unconfigured);
            }
        };

        let history = self
            .log
            .history_for_prompt(conversation_id, self.config.history_turns)
            .await?;
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(build_preamble(agent.as_ref(), &Local::now())));
        messages.extend(history);
        messages.push(Message::human(request.message.clone()));
        state = RelayState::HistoryLoaded;
        tracing::debug!(conversation_id, ?state, history = messages.len() - 2, "relay");

        let mut reply = ReplyAccumulator::new();
        let generation = self.generate(&model, messages, &tx, &mut reply, &mut state).await;

        let context = AssistantContext {
            chat_model_id: Some(model.chat_model.id.clone()),
            agent_id: agent.as_ref().map(|a| a.id.clone()),
            ..AssistantContext::default()
        };

        let outcome = match generation {
            Generation::Cancelled => {
                tracing::info!(conversation_id, fragments = reply.fragments(), "client disconnected, reply discarded");
                return Ok(RelayOutcome::Cancelled);
            }
            Generation::Finished => {
                state = RelayState::Completed;
                let turn_id = self.persist(conversation_id, &request.message, reply.finish(), context).await?;
                RelayOutcome::Completed { turn_id }
            }
            Generation::Failed(_) if tx.is_closed() => {
                tracing::info!(conversation_id, "client left before the failure was reported, reply discarded");
                return Ok(RelayOutcome::Cancelled);
            }
            Generation::Failed(message) => {
                state = RelayState::Failed;
                let _ = tx.send(RelayEvent::Error { message: message.clone() }).await;
                reply.push(&message);
                let turn_id = self.persist(conversation_id, &request.message, reply.finish(), context).await?;
                RelayOutcome::Failed { turn_id }
            }
        };

        let turn_id = match &outcome {
            RelayOutcome::Completed { turn_id } | RelayOutcome::Failed { turn_id } => Some(turn_id.clone()),
            _ => None,
        };
        let _ = tx.send(RelayEvent::Done { turn_id }).await;

        tracing::info!(
            conversation_id,
            ?state,
            model = %model.model_name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "relay finished"
        );
        Ok(outcome)
    }

    async fn generate(
        &self,
        model: &ResolvedModel,
        messages: Vec<Message>,
        tx: &mpsc::Sender<RelayEvent>,
        reply: &mut ReplyAccumulator,
        state: &mut RelayState,
    ) -> Generation {
        let timeout = self.config.generation_timeout;
        let deadline = tokio::time::Instant::now() + timeout;
        *state = RelayState::Generating;

        let request = tokio::select! {
            _ = tx.closed() => return Generation::Cancelled,
            request = tokio::time::timeout_at(deadline, self.generator.generate(model, messages)) => request,
        };
        let mut stream = match request {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::warn!(model = %model.model_name, error = %e, "generation request failed");
                return Generation::Failed(failure::describe(&e, &model.model_name));
            }
            Err(_) => return Generation::Failed(failure::timed_out(timeout)),
        };

        loop {
            let next = tokio::select! {
                _ = tx.closed() => return Generation::Cancelled,
                next = tokio::time::timeout_at(deadline, stream.next()) => next,
            };
            let next = match next {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!(model = %model.model_name, "generation deadline exceeded");
                    return Generation::Failed(failure::timed_out(timeout));
                }
            };

            match next {
                Some(Ok(StreamEvent::Message { content })) => {
                    *state = RelayState::Streaming;
                    reply.push(&content);
                    if tx.send(RelayEvent::Chunk { text: content }).await.is_err() {
                        return Generation::Cancelled;
                    }
                }
                Some(Ok(StreamEvent::Done { .. })) | None => return Generation::Finished,
                Some(Err(e)) => {
                    tracing::warn!(model = %model.model_name, error = %e, "generation stream failed");
                    return Generation::Failed(failure::describe(&e, &model.model_name));
                }
            }
        }
    }

    async fn persist(
        &self,
        conversation_id: &str,
        user_message: &str,
        reply: String,
        context: AssistantContext,
    ) -> Result<String> {
        let turn_id = self.log.append_user_turn(conversation_id, user_message).await?;
        self.log
            .append_assistant_turn(conversation_id, &turn_id, &reply, context)
            .await?;
        Ok(turn_id)
    }
}
