//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are what inbound adapters call.
//! Driven ports (`*Repository`, `LifecycleNotifier`) are what services call
//! and outbound adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod bid_command;
mod bid_query;
mod commission_command;
mod commission_query;
mod commission_repository;
mod lifecycle_notifier;
mod profile_command;
mod profile_query;
mod profile_repository;

#[cfg(test)]
pub use bid_command::MockBidCommand;
pub use bid_command::{AcceptBidResponse, BidCommand, SubmitBidRequest};
#[cfg(test)]
pub use bid_query::MockBidQuery;
pub use bid_query::BidQuery;
#[cfg(test)]
pub use commission_command::MockCommissionCommand;
pub use commission_command::{
    CommissionChanges, CommissionCommand, TransitionKind, TransitionResponse,
};
#[cfg(test)]
pub use commission_query::MockCommissionQuery;
pub use commission_query::{CommissionQuery, Dashboard, ListCommissionsRequest};
#[cfg(test)]
pub use commission_repository::MockCommissionRepository;
pub use commission_repository::{
    CommissionCommit, CommissionRepository, CommissionRepositoryError,
    FixtureCommissionRepository,
};
#[cfg(test)]
pub use lifecycle_notifier::MockLifecycleNotifier;
pub use lifecycle_notifier::{
    FixtureLifecycleNotifier, LifecycleEvent, LifecycleNotifier, LifecycleNotifierError,
};
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::{ProfileChanges, ProfileCommand, SignUpRequest};
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::ProfileQuery;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
