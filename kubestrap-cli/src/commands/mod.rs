pub mod bootstrap;
pub mod inventory;
pub mod join_command;
pub mod stages;
