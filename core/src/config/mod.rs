pub use geometry::ConfigGeometry;
pub use integrals::ConfigIntegrals;
pub use scf::ScfConfig;

mod geometry;
mod integrals;
mod scf;
