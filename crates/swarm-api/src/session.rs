//! Chat session state, passed in and handed back on every turn
use serde::{Deserialize, Serialize};
use swarm_core::PipelineRunner;

pub const USER: &str = "User";
pub const AI: &str = "AI";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub ai: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSession {
    /// `(speaker, text)` pairs as shown in the chat widget
    pub history: Vec<(String, String)>,
    pub conversation: Vec<Exchange>,
    pub first_launch: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            conversation: Vec::new(),
            first_launch: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub session: ChatSession,
    pub reply: String,
    /// True only for the first turn of a session
    pub share: bool,
    /// Whether the pipeline produced the reply
    pub ok: bool,
}

impl ChatSession {
    /// Runs `input` through the pipeline once and records the exchange.
    /// A failed run becomes an `Error: …` reply; the session stays usable.
    pub async fn turn(self, input: &str, pipeline: &PipelineRunner) -> TurnOutcome {
        let (reply, ok) = match pipeline.run(input).await {
            Ok(out) => (out.output, true),
            Err(failure) => (format!("Error: {failure}"), false),
        };
        self.record(input, reply, ok)
    }

    fn record(mut self, input: &str, reply: String, ok: bool) -> TurnOutcome {
        self.history.push((USER.to_string(), input.to_string()));
        self.history.push((AI.to_string(), reply.clone()));
        self.conversation.push(Exchange {
            user: input.to_string(),
            ai: reply.clone(),
        });

        let share = self.first_launch;
        self.first_launch = false;

        TurnOutcome {
            session: self,
            reply,
            share,
            ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_core::{FnStage, StageError};

    fn upper() -> PipelineRunner {
        PipelineRunner::builder()
            .stage(FnStage::new("upper", |x| Ok(x.to_uppercase())))
            .build()
            .unwrap()
    }

    #[test]
    fn share_flag_only_on_first_turn() {
        let first = ChatSession::default().record("hi", "HI".into(), true);
        assert!(first.share);
        assert!(!first.session.first_launch);

        let second = first.session.record("again", "AGAIN".into(), true);
        assert!(!second.share);
        assert_eq!(second.session.history.len(), 4);
        assert_eq!(second.session.conversation.len(), 2);
    }

    #[test]
    fn history_pairs_user_then_ai() {
        let outcome = ChatSession::default().record("q", "a".into(), true);
        assert_eq!(
            outcome.session.history,
            vec![("User".to_string(), "q".to_string()), ("AI".to_string(), "a".to_string())]
        );
        assert_eq!(
            outcome.session.conversation,
            vec![Exchange { user: "q".into(), ai: "a".into() }]
        );
    }

    #[tokio::test]
    async fn turn_runs_pipeline_once() {
        let outcome = ChatSession::default().turn("monitor the river", &upper()).await;
        assert_eq!(outcome.reply, "MONITOR THE RIVER");
        assert!(outcome.share);
        assert!(outcome.ok);
    }

    #[tokio::test]
    async fn failed_run_becomes_error_reply() {
        let pipeline = PipelineRunner::builder()
            .stage(FnStage::new("sensor", |_| Err(StageError::execution("offline"))))
            .build()
            .unwrap();

        let outcome = ChatSession::default().turn("status?", &pipeline).await;
        assert!(outcome.reply.starts_with("Error: stage 'sensor'"));
        assert!(outcome.reply.contains("offline"));
        assert!(!outcome.ok);
        assert_eq!(outcome.session.history.len(), 2);
    }

    #[test]
    fn missing_fields_default() {
        let session: ChatSession = serde_json::from_str("{}").unwrap();
        assert_eq!(session, ChatSession::default());
    }
}
