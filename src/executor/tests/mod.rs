mod basic_tests;
mod control_flow_tests;
mod error_tests;
mod helpers;
mod stdlib_tests;
