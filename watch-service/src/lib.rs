pub mod compose;
pub mod dispatch;
pub mod merge;
pub mod run;

#[cfg(test)]
pub(crate) mod testutil;

pub use compose::{compose_message, sentinel_message};
pub use dispatch::{DeliveryOutcome, DispatchReport, Dispatcher};
pub use merge::{merge_batches, truncate_first_run};
pub use run::run_once;
