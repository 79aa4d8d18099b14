//! HTTP routes

pub mod municipios;
