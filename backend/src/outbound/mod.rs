//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM.
//! - **memory**: an in-process store with the same atomic semantics, used
//!   without a database and by the test suites.
//! - **notifier**: checkout webhook and logging notifiers.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod memory;
pub mod notifier;
pub mod persistence;
