//! Analysis environment: variable scopes, lexical contexts, and the
//! session facade owning every process-wide cache.

mod context;
mod global_env;
mod scope;

pub use context::{Context, ContextDecodeError, FileRef};
pub use global_env::{GlobalEnv, Options};
pub use scope::{new_global_variable_map, variable_flags, GlobalVariableMap, Scope, Variable};
