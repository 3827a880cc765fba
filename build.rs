#[allow(dead_code)]
#[path = "src/backend.rs"]
mod backend;

use backend::Backend;
use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/backend.rs");

    let names: Vec<String> = Backend::ALL
        .iter()
        .map(|b| format!("\"{}\"", b.name()))
        .collect();
    println!(
        "cargo:rustc-check-cfg=cfg(cyclecount_backend, values({}))",
        names.join(", ")
    );

    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let fallback = env::var_os("CARGO_FEATURE_FALLBACK").is_some();

    match Backend::for_target(&arch, fallback) {
        Some(backend) => {
            if !backend.is_hardware() {
                println!(
                    "cargo:warning=cyclecount: no counter instruction on `{arch}`, using the monotonic clock fallback"
                );
            }
            println!("cargo:rustc-cfg=cyclecount_backend=\"{}\"", backend.name());
        }
        None => {
            panic!(
                "UnsupportedPlatform: target architecture `{arch}` lacks a user-readable \
                 cycle or time counter instruction; \
                 supported: x86_64, x86, aarch64, riscv64, riscv32 \
                 (enable the `fallback` feature to use a monotonic clock instead)"
            );
        }
    }
}
