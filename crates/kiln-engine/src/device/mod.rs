//! GPU device and surface management.
//!
//! [`Gpu`] owns the wgpu device, queue and the window
//! surface. The 2D renderer reaches the device through cloned handles and
//! never touches the surface directly.

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
