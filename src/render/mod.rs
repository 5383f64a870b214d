//! Tool invocation rendering.
//!
//! `ToolRenderRegistry` maps tool names to renderers; renderers coerce
//! results through `parser` and produce typed `Fragment`s, which `html`
//! turns into markup for the dashboard.

pub mod format;
pub mod fragment;
pub mod html;
pub mod market_card;
pub mod parser;
pub mod registry;
pub mod tools;

pub use fragment::Fragment;
pub use parser::{parse_list, parse_object, Parsed};
pub use registry::{ParamSpec, ToolRenderRegistry, ToolRenderer, ToolSpec};
