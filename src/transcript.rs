use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A single utterance in the session transcript.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: String,
}

impl ChatTurn {
    fn new(text: String, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            is_user,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// In-memory, append-only chat history. Lives for the process lifetime
/// and is never persisted.
#[derive(Default)]
pub struct Transcript {
    turns: Mutex<Vec<ChatTurn>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, text: impl Into<String>, is_user: bool) -> ChatTurn {
        let turn = ChatTurn::new(text.into(), is_user);
        self.turns.lock().await.push(turn.clone());
        turn
    }

    pub async fn all(&self) -> Vec<ChatTurn> {
        self.turns.lock().await.clone()
    }

    /// Empties the transcript, returning how many turns were dropped.
    pub async fn clear(&self) -> usize {
        let mut turns = self.turns.lock().await;
        let dropped = turns.len();
        turns.clear();
        dropped
    }

    pub async fn len(&self) -> usize {
        self.turns.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.lock().await.is_empty()
    }
}
