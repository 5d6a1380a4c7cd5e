pub mod context;
pub mod motion_value;
pub mod scope;

pub use context::{
    expect_context, has_context, provide_context, reset_contexts, use_context, with_context,
};
pub use motion_value::{MotionValue, SubscriberId, Subscription, motion_value};
pub use scope::{
    ScopeId, current_scope, dispose_scope, is_disposed, on_cleanup, reset_scopes, run_in_scope,
    with_scope,
};
