//! Team domain entities.

pub mod membership;
pub mod model;
pub mod role;

pub use membership::{TeamMember, TeamMembership};
pub use model::{CreateTeam, Team};
pub use role::TeamRole;
