//! Serde types for blueprints, parameter schemas and alert definitions.
//!
//! Defines the data model shared by the editor and the stores:
//! - `ParameterSpec` / `BlueprintSpec`: loose wire forms served by the definition service
//! - `ParameterSchema` / `Blueprint`: validated forms the structured editor renders
//! - `AlertDefinition` / `LogicSpec`: the persisted definition payload

mod blueprint;
mod definition;
mod parameter;

pub use blueprint::*;
pub use definition::*;
pub use parameter::*;

#[cfg(test)]
mod tests;
