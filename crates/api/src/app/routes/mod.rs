pub mod auth;
pub mod collaborators;
pub mod posts;
pub mod system;
