pub mod audit;
pub mod health;
pub mod permissions;
pub mod roles;
pub mod user_roles;
