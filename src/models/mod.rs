//! Project scheduling domain models.
//!
//! Provides the data types describing an RCPSP-GPR instance and its
//! solution. Activities, resources and time slots are addressed by
//! 0-based index.
//!
//! # Domain Mappings
//!
//! | rcpsp-sat | Construction | Software | Manufacturing |
//! |-----------|--------------|----------|---------------|
//! | Activity | Work package | Ticket | Operation |
//! | ActivitySequence | Trade ordering | Dependency | Routing step |
//! | Resource | Crew/Crane | Team | Machine pool |
//! | Schedule | Site plan | Sprint plan | Production plan |

mod activity;
mod project;
mod resource;
mod schedule;
mod sequence;

pub use activity::{Activity, ResolvedTimes, TimeBounds};
pub use project::Project;
pub use resource::Resource;
pub use schedule::{Assignment, Schedule};
pub use sequence::{ActivitySequence, Event, SequenceKind};
