//! Test harness


pub use kernel_manager::TestKernelManager;
