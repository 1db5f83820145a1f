//! Build script - points the firmware link at the esp-hal linker scripts.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds of the workspace (unit tests) link without target scripts.
    if env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("xtensa") {
        println!("cargo:rustc-link-arg-bins=-Tlinkall.x");
    }
}
