// Adapters layer: concrete implementations of the domain ports for the local Python environment.

pub mod pip;
pub mod python;

pub use pip::{PipDistributionLookup, PipInstaller};
pub use python::PythonRunner;
