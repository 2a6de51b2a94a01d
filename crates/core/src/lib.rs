//! Core business logic for Edupace.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through traits the db crate implements.
//!
//! # Modules
//!
//! - `access` - Role resolution and permission guards
//! - `auth` - Password hashing and display names
//! - `course` - Course and outcome field validation
//! - `grading` - Spreadsheet grade ingestion
//! - `reports` - Grade report tables, CSV and PDF rendering

pub mod access;
pub mod auth;
pub mod course;
pub mod grading;
pub mod reports;
