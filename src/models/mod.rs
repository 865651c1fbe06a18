// Models module - Database entity representations

pub mod credential;
pub mod family;
pub mod member;
pub mod ministry;
pub mod ministry_request;
pub mod role;
pub mod zone;

pub use credential::Credential;
pub use family::{Child, Family};
pub use member::Member;
pub use ministry::{Ministry, MinistryAdmin, MinistryMember};
pub use ministry_request::MinistryRequest;
pub use role::{MemberRole, Role};
pub use zone::Zone;
