//! Build script for a8k-pm
//!
//! Generates the compile-time platform constants consumed by `config`.

use std::env;
use std::fs;
use std::path::Path;

/// AP806 register window on Armada-8K.
const DEFAULT_REGS_BASE: u64 = 0xF000_0000;
/// BL1 lives at the start of the trusted ROM.
const DEFAULT_CPU_ENTRY_ADDR: u64 = 0x0;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=A8K_REGS_BASE");
    println!("cargo:rerun-if-env-changed=A8K_CPU_ENTRY_ADDR");

    generate_config();
}

fn parse_addr(var: &str, default: u64) -> u64 {
    match env::var(var) {
        Ok(value) => {
            let digits = value.trim_start_matches("0x").trim_start_matches("0X");
            u64::from_str_radix(digits, 16)
                .unwrap_or_else(|_| panic!("{} must be a hex address, got {:?}", var, value))
        }
        Err(_) => default,
    }
}

fn generate_config() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("config.rs");

    let regs_base = parse_addr("A8K_REGS_BASE", DEFAULT_REGS_BASE);
    let entry_addr = parse_addr("A8K_CPU_ENTRY_ADDR", DEFAULT_CPU_ENTRY_ADDR);

    let mut config = String::new();
    config.push_str("// Auto-generated configuration file\n\n");

    config.push_str("/// Base of the AP806 register window.\n");
    config.push_str(&format!("pub const REGS_BASE: usize = {:#x};\n", regs_base));
    config.push_str("/// Address secondary cores start executing from after release.\n");
    config.push_str(&format!("pub const CPU_ENTRY_ADDR: u64 = {:#x};\n", entry_addr));

    // Feature flags
    config.push_str("\n// Feature configuration\n");
    config.push_str(&format!(
        "pub const SCP_IMAGE: bool = {};\n",
        env::var_os("CARGO_FEATURE_SCP").is_some()
    ));

    fs::write(&dest_path, config).unwrap();
}
