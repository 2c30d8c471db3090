//! Architecture support

pub mod arm64;

pub use arm64::LocalCpu;

#[cfg(target_arch = "aarch64")]
pub use arm64::CurrentCpu;
