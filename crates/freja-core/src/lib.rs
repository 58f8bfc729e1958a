pub mod browser;
mod definition;
mod events;
mod executor;

pub use definition::{
    browser_blueprint, visual_blueprint, AgentBlueprint, AgentDefinition, AgentKind, RunLimits,
    BROWSER_AGENT_NAME, VISUAL_AGENT_NAME,
};
pub use events::{BuildEvent, BuildProgress};
pub use executor::{AgentExecutor, NullExecutor, TaskOutcome};
