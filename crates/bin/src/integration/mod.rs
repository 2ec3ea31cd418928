//! Glue between the command line and the churn service.
//!
//! Locates the model artifact and reads request bodies from files or stdin.

pub(crate) mod input;
pub(crate) mod model_store;
