//! The enforcement loop

use crate::error::AgentError;
use crate::events::AgentEvent;
use crate::types::{Message, ToolChoice, ToolResult};

use super::validate::{
    catalog_correction, generic_correction, looks_like_internal_payload,
    looks_like_tool_call_attempt,
};
use super::Agent;

const MESSAGING_REMINDER: &str = "\nReminder: the messaging tool is for short plain-text \
updates to the user. Put long or formatted content in a file with the write_file tool \
and send a short message pointing to it.";

impl Agent {
    /// Run one user turn to completion.
    ///
    /// Appends the user message to the transcript, then loops: call the
    /// model with tool use required, correct it when it answers in prose,
    /// execute its tool calls strictly in order, and stop when a batch ends
    /// in successful user-facing output. That trailing run of user-facing
    /// results, concatenated in call order, is the returned response.
    ///
    /// # Errors
    ///
    /// - `Provider` — the model backend failed
    /// - `ToolUseNotEnforced` — the model never produced a tool call within
    ///   the correction budget
    /// - `MalformedResponse` — same, but the last output looked like an
    ///   internal payload that must not be shown raw
    /// - `IterationLimit` — the turn did not converge within the model-call cap
    /// - `Cancelled` — the cancellation token fired
    pub async fn run(&self, user_message: &str) -> Result<String, AgentError> {
        self.emit(AgentEvent::RunStarted {
            input: user_message.to_string(),
        })
        .await;

        self.history.write().push(Message::user(user_message));

        let definitions = self.catalog.definitions().to_vec();
        let mut outgoing = self.history.read().snapshot();
        let mut correction_attempts: u32 = 0;

        for _ in 0..self.max_iterations {
            self.emit(AgentEvent::ModelCallStarted {
                messages: outgoing.len(),
            })
            .await;

            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.emit(AgentEvent::RunFailed {
                        error: "cancelled".to_string(),
                    })
                    .await;
                    return Err(AgentError::Cancelled);
                }
                result = self.provider.generate(&outgoing, &definitions, ToolChoice::Required) => {
                    result?
                }
            };

            self.emit(AgentEvent::ModelCallCompleted {
                tool_calls: response.tool_calls.len(),
            })
            .await;

            if response.tool_calls.is_empty() {
                self.emit(AgentEvent::ProtocolViolation {
                    detail: format!("{} bytes of freeform text", response.content.len()),
                })
                .await;

                correction_attempts += 1;
                if correction_attempts > self.max_correction_attempts {
                    let error = if looks_like_internal_payload(&response.content, &definitions) {
                        // Never surface a raw internal payload to the user.
                        AgentError::MalformedResponse(
                            "the model produced a response format issue".to_string(),
                        )
                    } else {
                        AgentError::ToolUseNotEnforced {
                            attempts: self.max_correction_attempts,
                        }
                    };
                    self.emit(AgentEvent::RunFailed {
                        error: error.to_string(),
                    })
                    .await;
                    return Err(error);
                }

                let correction = if looks_like_tool_call_attempt(&response.content, &definitions)
                {
                    catalog_correction(&definitions)
                } else {
                    generic_correction()
                };
                self.emit(AgentEvent::CorrectionIssued {
                    attempt: correction_attempts,
                })
                .await;

                // Retry with a minimal transcript: the violating turn and
                // any earlier ones are withheld so the model cannot anchor
                // on its own bad output.
                outgoing = vec![
                    self.history.read().system_message().clone(),
                    Message::user(user_message),
                    Message::system(correction),
                ];
                continue;
            }

            self.history.write().push(Message::assistant_with_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            // One at a time, in the order the model asked. Tools mutate
            // shared state; concurrency here would reorder effects.
            let mut results: Vec<ToolResult> = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                self.emit(AgentEvent::ToolDispatched { call: call.clone() }).await;
                let result = self.dispatcher.dispatch(call).await;

                let mut transcript = result.transcript_text();
                if !result.success && result.user_facing {
                    transcript.push_str(MESSAGING_REMINDER);
                }
                self.history.write().push(Message::tool(transcript, call.id.clone()));

                self.emit(AgentEvent::ToolCompleted {
                    result: result.clone(),
                })
                .await;
                results.push(result);
            }

            // A batch ending in successful user-facing output is the turn's
            // answer; gather the whole trailing run in call order.
            let trailing: Vec<&ToolResult> = results
                .iter()
                .rev()
                .take_while(|r| r.success && r.user_facing)
                .collect();
            if !trailing.is_empty() {
                let response_text = trailing
                    .into_iter()
                    .rev()
                    .filter_map(|r| r.content.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                self.emit(AgentEvent::RunCompleted {
                    response: response_text.clone(),
                })
                .await;
                return Ok(response_text);
            }

            outgoing = self.history.read().snapshot();
        }

        let error = AgentError::IterationLimit(self.max_iterations);
        self.emit(AgentEvent::RunFailed {
            error: error.to_string(),
        })
        .await;
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use crate::box_tools;
    use crate::error::AgentError;
    use crate::events::AgentEvent;
    use crate::test_utils::{MockProvider, RecordingHook};
    use crate::tool::{Tool, ToolError, ToolOutput};
    use crate::types::{Role, ToolCall};

    use super::super::Agent;

    #[derive(serde::Deserialize, schemars::JsonSchema)]
    struct SendInput {
        message: String,
    }

    struct SendTool;

    impl Tool for SendTool {
        type Input = SendInput;

        fn name(&self) -> &str {
            "send_message"
        }

        fn description(&self) -> &str {
            "Send a message to the user"
        }

        fn user_facing(&self) -> bool {
            true
        }

        async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(input.message))
        }
    }

    #[derive(serde::Deserialize, schemars::JsonSchema)]
    struct TouchInput {
        name: String,
    }

    struct TouchTool {
        calls: Arc<AtomicUsize>,
    }

    impl Tool for TouchTool {
        type Input = TouchInput;

        fn name(&self) -> &str {
            "touch"
        }

        fn description(&self) -> &str {
            "Record a name"
        }

        async fn execute(&self, input: Self::Input) -> Result<ToolOutput, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ToolOutput::text(format!("touched {}", input.name)))
        }
    }

    fn agent_with(provider: MockProvider) -> Agent {
        Agent::builder()
            .provider(provider)
            .with_tools(box_tools![SendTool])
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_user_facing_result_ends_the_turn() {
        let provider = MockProvider::new().with_tool_call(
            "c1",
            "send_message",
            json!({"message": "hello there"}),
        );
        let agent = agent_with(provider);

        let response = agent.run("say hi").await.unwrap();
        assert_eq!(response, "hello there");
    }

    #[tokio::test]
    async fn test_correction_then_compliance() {
        let provider = MockProvider::new()
            .with_text("Sure, I'll just answer directly: hello!")
            .with_tool_call("c1", "send_message", json!({"message": "hello"}));
        let agent = agent_with(provider);
        let hook = RecordingHook::new();
        agent.add_hook_arc(hook.clone());

        let response = agent.run("say hi").await.unwrap();
        assert_eq!(response, "hello");

        let events = hook.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, AgentEvent::CorrectionIssued { attempt: 1 })));
    }

    #[tokio::test]
    async fn test_correction_rebuilds_minimal_transcript() {
        // Keep a handle on the provider to inspect the transcripts it saw.
        let provider = Arc::new(
            MockProvider::new()
                .with_text("plain prose")
                .with_tool_call("c1", "send_message", json!({"message": "ok"})),
        );
        let agent = Agent::builder()
            .provider_arc(provider.clone())
            .with_tools(box_tools![SendTool])
            .build()
            .unwrap();

        agent.run("first request").await.unwrap();

        let requests = provider.requests();
        // Second call: exactly system, original user, correction.
        let retry = &requests[1];
        assert_eq!(retry.len(), 3);
        assert_eq!(retry[0].role, Role::System);
        assert_eq!(retry[1].role, Role::User);
        assert_eq!(retry[1].content, "first request");
        assert_eq!(retry[2].role, Role::System);
        assert!(retry[2].content.contains("tool calls"));
    }

    #[tokio::test]
    async fn test_tool_syntax_in_text_gets_catalog_correction() {
        let provider = Arc::new(
            MockProvider::new()
                .with_text("send_message(\"hi\")")
                .with_tool_call("c1", "send_message", json!({"message": "hi"})),
        );
        let agent = Agent::builder()
            .provider_arc(provider.clone())
            .with_tools(box_tools![SendTool])
            .build()
            .unwrap();

        agent.run("say hi").await.unwrap();

        let requests = provider.requests();
        let correction = &requests[1][2].content;
        assert!(correction.contains("send_message("));
        assert!(correction.contains("Send a message to the user"));
    }

    #[tokio::test]
    async fn test_persistent_refusal_is_terminal() {
        let mut provider = MockProvider::new();
        for _ in 0..12 {
            provider = provider.with_text("I refuse to call tools");
        }
        let agent = Agent::builder()
            .provider(provider)
            .with_tools(box_tools![SendTool])
            .max_correction_attempts(10)
            .max_iterations(20)
            .build()
            .unwrap();

        let err = agent.run("do something").await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::ToolUseNotEnforced { attempts: 10 }
        ));
    }

    #[tokio::test]
    async fn test_internal_payload_failure_is_generic() {
        let mut provider = MockProvider::new();
        for _ in 0..12 {
            provider = provider
                .with_text(r#"{"name": "send_message", "arguments": {"message": "hi"}}"#);
        }
        let agent = Agent::builder()
            .provider(provider)
            .with_tools(box_tools![SendTool])
            .max_correction_attempts(10)
            .build()
            .unwrap();

        let err = agent.run("do something").await.unwrap_err();
        match err {
            AgentError::MalformedResponse(text) => {
                assert!(!text.contains("arguments"));
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tool_calls_dispatch_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = MockProvider::new()
            .with_tool_calls(vec![
                ToolCall::new("c1", "touch", json!({"name": "first"})),
                ToolCall::new("c2", "touch", json!({"name": "second"})),
            ])
            .with_tool_call("c3", "send_message", json!({"message": "done"}));
        let agent = Agent::builder()
            .provider(provider)
            .with_tools(box_tools![
                TouchTool {
                    calls: calls.clone()
                },
                SendTool
            ])
            .build()
            .unwrap();

        let response = agent.run("touch both").await.unwrap();
        assert_eq!(response, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Transcript interleaves assistant calls with linked tool results.
        let history = agent.history();
        let tool_messages: Vec<_> = history
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("c2"));
        assert!(tool_messages[0].content.contains("first"));
    }

    #[tokio::test]
    async fn test_failed_tool_feeds_back_instead_of_erroring() {
        let provider = MockProvider::new()
            .with_tool_call("c1", "touch", json!({"wrong_param": true}))
            .with_tool_call("c2", "send_message", json!({"message": "recovered"}));
        let agent = Agent::builder()
            .provider(provider)
            .with_tools(box_tools![
                TouchTool {
                    calls: Arc::new(AtomicUsize::new(0))
                },
                SendTool
            ])
            .build()
            .unwrap();

        let response = agent.run("touch it").await.unwrap();
        assert_eq!(response, "recovered");

        let history = agent.history();
        let failure = history
            .iter()
            .find(|m| m.role == Role::Tool && m.content.starts_with("Error:"))
            .expect("failed tool result recorded in transcript");
        assert!(failure.content.contains("name"));
    }

    #[tokio::test]
    async fn test_trailing_user_facing_run_is_concatenated() {
        let provider = MockProvider::new().with_tool_calls(vec![
            ToolCall::new("c1", "send_message", json!({"message": "part one"})),
            ToolCall::new("c2", "send_message", json!({"message": "part two"})),
        ]);
        let agent = agent_with(provider);

        let response = agent.run("two parts").await.unwrap();
        assert_eq!(response, "part one\n\npart two");
    }

    #[tokio::test]
    async fn test_iteration_limit_terminates_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider = MockProvider::new();
        for i in 0..5 {
            provider = provider.with_tool_call(
                &format!("c{i}"),
                "touch",
                json!({"name": format!("loop {i}")}),
            );
        }
        let agent = Agent::builder()
            .provider(provider)
            .with_tools(box_tools![
                TouchTool {
                    calls: calls.clone()
                },
                SendTool
            ])
            .max_iterations(3)
            .build()
            .unwrap();

        let err = agent.run("loop forever").await.unwrap_err();
        assert!(matches!(err, AgentError::IterationLimit(3)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_run() {
        let provider = MockProvider::new().with_tool_call(
            "c1",
            "send_message",
            json!({"message": "never sent"}),
        );
        let agent = agent_with(provider);
        agent.cancellation_token().cancel();

        let err = agent.run("anything").await.unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
    }

    #[tokio::test]
    async fn test_clear_history_preserves_system_message() {
        let provider = MockProvider::new().with_tool_call(
            "c1",
            "send_message",
            json!({"message": "hi"}),
        );
        let agent = agent_with(provider);
        agent.run("say hi").await.unwrap();
        assert!(agent.history().len() > 1);

        agent.clear_history();
        let history = agent.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::System);
    }
}
