//! Conversational policy data: the system prompt and the fixed strings the
//! loop injects between turns. Content here steers the model; the loop's
//! structure does not depend on any particular wording.

/// Default system prompt for search-style tool use.
pub const SYSTEM_PROMPT: &str = "You are a capable assistant that answers questions by using the available tools.

Important:
1. Tool-call arguments must be strict JSON.
2. Search for one simple query at a time.
3. Avoid special characters in search terms.

Strategy:
1. Use the simplest, most essential phrase.
2. Look up one fact per call.
3. If results are poor, retry with an even simpler term.

For example, to answer \"how old was the actor in the film\":
1. First search: just the actor's name.
2. Second search: just the film's name.
3. Extract what you need from the results; search more specifically only if something is missing.

Remember:
1. Keep queries simple.
2. Avoid compound queries.
3. Every tool call's arguments must be valid JSON.";

/// Corrective guidance after a transient failure or an insufficient answer.
pub const RETRY_SIMPLER: &str =
    "Please retry with a simpler query. Search for one simple phrase at a time.";

/// Instruction appended after a successful tool call, following its result.
pub const ANALYZE_RESULT: &str =
    "Analyze this result. If you need more information, continue with simpler queries; \
     otherwise give the final answer.";

/// Instruction for the one finalization call over accumulated results.
pub const SUMMARIZE_RESULTS: &str =
    "Based on all the results gathered so far, give your final answer. \
     If the information is insufficient, say so.";

/// Framing for the synthesized answer when even finalization failed.
pub const DEGRADED_ANSWER_PREFIX: &str =
    "Some errors occurred along the way, but based on what was found:";

/// Fixed answer when the loop ends with nothing accumulated.
pub const NO_INFORMATION: &str =
    "Sorry, no relevant information could be found. Please try rephrasing the question.";

/// Default marker flagging an uncertain or apologetic answer as insufficient.
///
/// A fragile, content-specific heuristic kept as replaceable policy; override
/// it through [`crate::agent::run::RunConfig::uncertainty_marker`].
pub const UNCERTAINTY_MARKER: &str = "sorry";
