use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use super::args::normalize_args;
use super::message::{AiMessage, Conversation, Message, ToolCallResult};
use super::prompt;
use super::tools::{ToolSet, UnknownTool};

/// Boundary the loop uses to ask the model for its next turn.
///
/// `invoke` is a long-latency suspension point. Failures are transient and
/// counted against the loop's error budget, never propagated raw.
pub trait ModelClient: Send + Sync {
    fn invoke<'a>(
        &'a self,
        conversation: &'a Conversation,
        tools: &'a ToolSet,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<AiMessage>> + Send + 'a>>;
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Hard bound on model round-trips inside the loop. The one finalization
    /// call sits outside this budget.
    pub max_iterations: u32,
    /// Global budget of transient model/tool failures before forced finalization.
    pub max_errors: u32,
    /// System message opening the conversation; `None` starts with the prompt alone.
    pub system_prompt: Option<String>,
    /// Case-insensitive substring marking a text answer as uncertain and
    /// therefore insufficient. Replaceable policy; empty disables the check.
    pub uncertainty_marker: String,
    /// Whether a cancelled run exposes a partial answer through
    /// [`ToolLoop::partial_answer`].
    pub partial_on_cancel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            max_errors: 3,
            system_prompt: Some(prompt::SYSTEM_PROMPT.to_string()),
            uncertainty_marker: prompt::UNCERTAINTY_MARKER.to_string(),
            partial_on_cancel: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The model produced a confident final answer.
    Completed,
    /// Iterations or the error budget ran out; the answer is best-effort.
    Exhausted,
}

/// Outcome of one loop execution. Always a string answer; the only `Err`
/// a run produces is the fatal [`UnknownTool`] configuration error.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub answer: String,
    pub termination: Termination,
    pub iterations: u32,
    pub errors: u32,
}

/// State of one loop execution: the conversation, the counters, and the raw
/// tool outputs accumulated for fallback synthesis.
///
/// Owning the state outside the `run` future means a caller that cancels the
/// run at a suspension point can still read what was accumulated so far.
#[derive(Debug)]
pub struct ToolLoop {
    cfg: RunConfig,
    conversation: Conversation,
    iteration: u32,
    errors: u32,
    accumulated: Vec<String>,
}

impl ToolLoop {
    pub fn new(prompt_text: &str, cfg: RunConfig) -> Self {
        let conversation = Conversation::start(cfg.system_prompt.as_deref(), prompt_text);
        Self {
            cfg,
            conversation,
            iteration: 0,
            errors: 0,
            accumulated: Vec::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Raw tool outputs collected so far, in execution order.
    pub fn accumulated(&self) -> &[String] {
        &self.accumulated
    }

    pub fn iterations(&self) -> u32 {
        self.iteration
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    /// Best-effort answer after the caller cancelled `run` mid-flight.
    ///
    /// Returns `None` unless `partial_on_cancel` is set and at least one tool
    /// result was accumulated before cancellation.
    pub fn partial_answer(&self) -> Option<String> {
        if !self.cfg.partial_on_cancel || self.accumulated.is_empty() {
            return None;
        }
        Some(degraded_answer(&self.accumulated))
    }

    /// Drives the loop to a terminal state.
    ///
    /// Per iteration: ask the model for a turn; execute any requested tool
    /// calls strictly in order, folding results back into the conversation;
    /// absorb transient failures as corrective guidance until the error
    /// budget runs out. A tool name missing from `tools` is a configuration
    /// error and fails the whole run immediately.
    pub async fn run(
        &mut self,
        model: &dyn ModelClient,
        tools: &ToolSet,
    ) -> anyhow::Result<RunReport> {
        'turns: while self.iteration < self.cfg.max_iterations {
            self.iteration += 1;
            debug!(iteration = self.iteration, "model turn");

            let ai = match model.invoke(&self.conversation, tools).await {
                Ok(ai) => ai,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "model invocation failed");
                    if self.note_error() {
                        break 'turns;
                    }
                    self.push_corrective();
                    continue;
                }
            };
            self.conversation.push(Message::Ai(ai.clone()));

            if ai.tool_calls.is_empty() {
                let content = ai.content.trim();
                if content.is_empty() {
                    // The model has nothing further to offer; non-error stop.
                    break;
                }
                if !self.accumulated.is_empty() && !self.is_uncertain(content) {
                    return Ok(self.report(content.to_string(), Termination::Completed));
                }
                // Insufficient answer: nudge and retry. Not charged as an error.
                self.push_corrective();
                continue;
            }

            for call in &ai.tool_calls {
                let Some(tool) = tools.get(&call.name) else {
                    return Err(anyhow::Error::new(UnknownTool(call.name.clone())));
                };

                let args = normalize_args(&call.arguments);
                debug!(tool = tool.name(), "invoking tool");
                match tool.invoke(args).await {
                    Ok(content) => {
                        self.accumulated.push(content.clone());
                        self.conversation.push(Message::ToolResult(ToolCallResult {
                            name: tool.name().to_string(),
                            content,
                        }));
                        self.conversation
                            .push(Message::Human(prompt::ANALYZE_RESULT.to_string()));
                    }
                    Err(err) => {
                        warn!(
                            tool = tool.name(),
                            error = %format!("{err:#}"),
                            "tool invocation failed"
                        );
                        if self.note_error() {
                            break 'turns;
                        }
                        self.push_corrective();
                    }
                }
            }
        }

        self.finalize(model, tools).await
    }

    /// Exhaustion path: one best-effort summarization over everything
    /// accumulated, degrading to plain concatenation if that call fails too.
    async fn finalize(
        &mut self,
        model: &dyn ModelClient,
        tools: &ToolSet,
    ) -> anyhow::Result<RunReport> {
        if self.accumulated.is_empty() {
            return Ok(self.report(prompt::NO_INFORMATION.to_string(), Termination::Exhausted));
        }

        self.conversation
            .push(Message::Human(prompt::SUMMARIZE_RESULTS.to_string()));
        match model.invoke(&self.conversation, tools).await {
            Ok(ai) if !ai.content.trim().is_empty() => {
                let answer = ai.content.trim().to_string();
                self.conversation.push(Message::Ai(ai));
                Ok(self.report(answer, Termination::Exhausted))
            }
            Ok(_) => Ok(self.report(degraded_answer(&self.accumulated), Termination::Exhausted)),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "finalization call failed");
                Ok(self.report(degraded_answer(&self.accumulated), Termination::Exhausted))
            }
        }
    }

    /// Counts one transient failure. Returns true once the budget is spent.
    fn note_error(&mut self) -> bool {
        self.errors += 1;
        if self.errors >= self.cfg.max_errors {
            warn!(errors = self.errors, "error budget exhausted");
            return true;
        }
        false
    }

    fn push_corrective(&mut self) {
        self.conversation
            .push(Message::Human(prompt::RETRY_SIMPLER.to_string()));
    }

    fn is_uncertain(&self, content: &str) -> bool {
        let marker = self.cfg.uncertainty_marker.trim();
        !marker.is_empty()
            && content
                .to_lowercase()
                .contains(&marker.to_lowercase())
    }

    fn report(&self, answer: String, termination: Termination) -> RunReport {
        RunReport {
            answer,
            termination,
            iterations: self.iteration,
            errors: self.errors,
        }
    }
}

fn degraded_answer(results: &[String]) -> String {
    format!("{}\n{}", prompt::DEGRADED_ANSWER_PREFIX, results.join("\n"))
}

/// Runs one full loop execution for `prompt_text` against the given model and
/// tool set.
pub async fn run_with_tools(
    model: &dyn ModelClient,
    tools: &ToolSet,
    prompt_text: &str,
    cfg: RunConfig,
) -> anyhow::Result<RunReport> {
    ToolLoop::new(prompt_text, cfg).run(model, tools).await
}
