pub mod flash;
pub mod rbac;
pub mod user;
pub mod vendor;
