#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod head;
pub mod models;
pub mod plugin;
pub mod preload;
pub mod registry;
pub mod request;

pub use config::{ConfigError, ConfigSource, OptionStore};
pub use engine::ScriptRuleEngine;
pub use models::{CriticalScriptRule, LoadGroup, PreloadLinkRule, PreloadType};
pub use plugin::{HookPoint, Optimizer, RenderPass, RenderedPage};
pub use preload::PreloadEmitter;
pub use registry::{RegisteredScript, ResourceRegistry, ScriptRegistry};
pub use request::RequestContext;
