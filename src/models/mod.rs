pub mod enums;
pub mod care_plan;
pub mod chat;
pub mod profile;
pub mod symptom;
pub mod user;
pub mod vital_sign;

pub use care_plan::*;
pub use chat::*;
pub use profile::*;
pub use symptom::*;
pub use user::*;
pub use vital_sign::*;
