//! Campus Intake - conversational incident reporting for campus facilities.
//!
//! A student or staff member identifies themselves, describes a problem,
//! and the dialogue routes it to a service area, collects location and
//! photo evidence, confirms, and files a structured submission.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
