//! Core rust implementation of kornet, a crate for building metabolic reaction networks from
//! KEGG Ortholog annotations using the KEGG and ModelSEED reference databases.

pub mod builder;
pub mod configuration;
pub mod io;
pub mod network;
pub mod reference;
pub mod stoichiometry;
pub mod summary;
pub mod utils;
pub mod workflow;
