pub mod atom;
pub mod basis;
pub mod config;
pub mod diis;
pub mod error;
pub mod geometry;
pub mod hf;
pub mod integrals;
pub mod periodic_table;
