use serde::{Deserialize, Serialize};

/// Where exception and log lines go while a call is still open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventPlacement {
    /// Emitted the moment they are observed
    #[default]
    Immediate,
    /// Held with the innermost open call and released after its summary line.
    /// Only meaningful for merging renderers.
    Nested,
}

/// How content under a suppressed call is re-indented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscapePolicy {
    /// One indent level removed per suppressed ancestor
    #[default]
    Collapse,
    /// Everything under a suppressed call lands on the level that call would have used
    Flatten,
}

/// How the driver indents a batch of lines released by one exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentStrategy {
    /// Use the indent delta computed by the engine
    #[default]
    Engine,
    /// Increase the indent after every line the renderer flags as a nested call
    NestedCallHint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub placement: EventPlacement,
    pub escape: EscapePolicy,
    pub indent: IndentStrategy,
}
