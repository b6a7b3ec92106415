//! Chat assistant transcript.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::api::models::ChatExchange;
use crate::api::CvApi;
use crate::cache::Clock;
use crate::panel::LoadState;

const EMOJI: &[(&str, &str)] = &[
    ("[CV]", "📄"),
    ("[Email]", "📧"),
    ("[Briefcase]", "💼"),
    ("[Target]", "🎯"),
    ("[Star]", "⭐"),
    ("[Chart]", "📊"),
    ("[Person]", "👤"),
    ("[Memo]", "📝"),
    ("[Graduation Cap]", "🎓"),
    ("[Tools]", "🛠️"),
    ("[Trophy]", "🏆"),
    ("[Chart Up]", "📈"),
    ("[Light Bulb]", "💡"),
];

/// Replaces the assistant's bracket tokens, e.g. `[CV]`, with emoji.
pub fn render_emoji(text: &str) -> String {
    EMOJI
        .iter()
        .fold(text.to_string(), |acc, (token, emoji)| acc.replace(token, emoji))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn assistant(content: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            content: render_emoji(content),
            timestamp,
        }
    }
}

/// Flattens latest-first history into a chronological transcript.
pub fn transcript(history: Vec<ChatExchange>) -> Vec<ChatMessage> {
    history
        .into_iter()
        .rev()
        .flat_map(|exchange| {
            [
                ChatMessage {
                    role: Role::User,
                    content: exchange.message,
                    timestamp: exchange.created_at,
                },
                ChatMessage::assistant(&exchange.response, exchange.created_at),
            ]
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub messages: Vec<ChatMessage>,
    pub history: LoadState,
    pub sending: bool,
    pub error: Option<String>,
}

struct ChatState {
    messages: Vec<ChatMessage>,
    /// Bumped by every change to `messages`; a history load that started
    /// before the change must not replace the transcript.
    generation: u64,
    history: LoadState,
    sending: bool,
    error: Option<String>,
}

pub struct ChatView {
    api: Arc<dyn CvApi>,
    clock: Arc<dyn Clock>,
    state: Mutex<ChatState>,
}

impl ChatView {
    pub fn new(api: Arc<dyn CvApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            state: Mutex::new(ChatState {
                messages: Vec::new(),
                generation: 0,
                history: LoadState::Idle,
                sending: false,
                error: None,
            }),
        }
    }

    pub async fn load_history(&self) {
        let generation = {
            let mut st = self.lock();
            st.history = LoadState::Loading;
            st.generation += 1;
            st.generation
        };
        let result = self.api.chat_history().await;
        let mut st = self.lock();
        match result {
            Ok(history) => {
                if st.generation == generation {
                    st.messages = transcript(history.history);
                }
                st.history = LoadState::Loaded;
                st.error = None;
            }
            Err(e) => {
                warn!("loading chat history failed: {e}");
                st.history = LoadState::Error;
                st.error = Some("Failed to load chat history".to_string());
            }
        }
    }

    /// Sends `input`. Returns `false` when nothing was sent: blank input or a
    /// message already in flight.
    pub async fn send(&self, input: &str) -> bool {
        let message = input.trim();
        if message.is_empty() {
            return false;
        }
        {
            let mut st = self.lock();
            if st.sending {
                return false;
            }
            st.sending = true;
            st.generation += 1;
            st.error = None;
            st.messages.push(ChatMessage {
                role: Role::User,
                content: message.to_string(),
                timestamp: self.clock.now(),
            });
        }

        let result = self.api.send_chat(message).await;
        let mut st = self.lock();
        st.sending = false;
        match result {
            Ok(reply) => {
                let now = self.clock.now();
                st.messages.push(ChatMessage::assistant(&reply.response, now));
            }
            Err(e) => {
                warn!("sending chat message failed: {e}");
                st.error = Some(e.user_message());
            }
        }
        true
    }

    /// Clears the stored conversation; the transcript is emptied only on success.
    pub async fn clear_history(&self) -> bool {
        match self.api.clear_chat_history().await {
            Ok(()) => {
                let mut st = self.lock();
                st.messages.clear();
                st.generation += 1;
                st.error = None;
                true
            }
            Err(e) => {
                warn!("clearing chat history failed: {e}");
                self.lock().error = Some(e.user_message());
                false
            }
        }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let st = self.lock();
        ChatSnapshot {
            messages: st.messages.clone(),
            history: st.history,
            sending: st.sending,
            error: st.error.clone(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
