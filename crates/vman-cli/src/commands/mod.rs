pub mod dump;
pub mod exec;
pub mod inspector;
pub mod loader;
pub mod run_common;
pub mod trace;

#[cfg(test)]
mod exec_tests;
#[cfg(test)]
mod inspector_tests;
#[cfg(test)]
mod loader_tests;
