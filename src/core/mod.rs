pub mod dotplot;
pub mod engine;
pub mod error;
pub mod hist;
pub mod io;
pub mod maf;
pub mod model;
pub mod samples;
pub mod table;
