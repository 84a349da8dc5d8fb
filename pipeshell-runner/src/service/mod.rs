//! Service layer
//!
//! Services hold the forwarding logic of the runner: framing written bytes
//! into records and dispatching each record through a [`Delivery`]
//! repository.
//!
//! [`Delivery`]: crate::repository::Delivery

mod dispatch;
mod framer;

pub use dispatch::DispatchWriter;
pub use framer::{RecordFramer, Records};
