//! Module providing the structs that make up a metabolic reaction network.

pub mod compound;
pub mod entity;
pub mod grouping;
pub mod ko;
pub mod model;
pub mod reaction;
