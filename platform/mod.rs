//! SoC support
//!
//! - `a8k`: Marvell Armada-8K (AP806 application processor)

pub mod a8k;
