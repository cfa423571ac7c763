//! Teams and team memberships.

pub mod members;
pub mod service;

pub use members::{AddMemberRequest, MemberService};
pub use service::{CreateTeamRequest, TeamService};
