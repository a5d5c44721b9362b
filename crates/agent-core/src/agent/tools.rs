use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::{error::Error, fmt};

use serde::Serialize;
use serde_json::{Map, Value, json};

/// A named capability the loop can invoke on the model's behalf.
///
/// `name` is case-sensitive as declared; the loop resolves requests against it
/// case-insensitively. `invoke` is a long-latency suspension point; failures
/// are transient and counted against the loop's error budget.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// JSON schema for the argument map, forwarded to the model when binding.
    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    fn invoke<'a>(
        &'a self,
        args: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}

/// Declared shape of a tool, as handed to the model boundary for binding.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Signals a tool-call request naming a tool absent from the bound set.
///
/// This is a configuration error: the loop aborts immediately instead of
/// retrying. Callers discriminate it with `err.is::<UnknownTool>()`.
#[derive(Debug)]
pub struct UnknownTool(pub String);

impl fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tool: {}", self.0)
    }
}

impl Error for UnknownTool {}

/// The fixed set of tools bound for one loop execution, resolved by
/// case-folded name lookup.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolSet {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut by_name = HashMap::new();
        for (idx, tool) in tools.iter().enumerate() {
            by_name.insert(tool.name().to_ascii_lowercase(), idx);
        }
        Self { tools, by_name }
    }

    /// Case-insensitive lookup by requested name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.by_name
            .get(&name.trim().to_ascii_lowercase())
            .map(|&idx| self.tools[idx].as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "Echo"
        }

        fn invoke<'a>(
            &'a self,
            args: Map<String, Value>,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
            Box::pin(async move { Ok(Value::Object(args).to_string()) })
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let set = ToolSet::new(vec![Arc::new(EchoTool) as Arc<dyn Tool>]);
        assert!(set.get("echo").is_some());
        assert!(set.get("ECHO").is_some());
        assert!(set.get(" Echo ").is_some());
        assert!(set.get("other").is_none());
    }

    #[test]
    fn specs_carry_declared_names() {
        let set = ToolSet::new(vec![Arc::new(EchoTool) as Arc<dyn Tool>]);
        let specs = set.specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "Echo");
    }
}
