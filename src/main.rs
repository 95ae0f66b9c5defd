#[cfg(any(target_arch = "wasm32", test))]
mod animate;
#[cfg(any(target_arch = "wasm32", test))]
mod config;
#[cfg(any(target_arch = "wasm32", test))]
mod contact;
#[cfg(any(target_arch = "wasm32", test))]
mod controller;
#[cfg(any(target_arch = "wasm32", test))]
mod counter;
#[cfg(any(target_arch = "wasm32", test))]
mod cursor;
#[cfg(any(target_arch = "wasm32", test))]
mod error;
#[cfg(any(target_arch = "wasm32", test))]
mod filter;
#[cfg(any(target_arch = "wasm32", test))]
mod hero;
#[cfg(any(target_arch = "wasm32", test))]
mod host;
#[cfg(any(target_arch = "wasm32", test))]
mod logging;
#[cfg(any(target_arch = "wasm32", test))]
mod magnetic;
#[cfg(any(target_arch = "wasm32", test))]
mod nav;
#[cfg(any(target_arch = "wasm32", test))]
mod preloader;
#[cfg(any(target_arch = "wasm32", test))]
mod reveal;
#[cfg(any(target_arch = "wasm32", test))]
mod scheduler;
#[cfg(any(target_arch = "wasm32", test))]
mod skills;
#[cfg(any(target_arch = "wasm32", test))]
mod store;
#[cfg(any(target_arch = "wasm32", test))]
mod theme;
#[cfg(any(target_arch = "wasm32", test))]
mod typing;
#[cfg(any(target_arch = "wasm32", test))]
mod visibility;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
mod frontend;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This project is frontend-only. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
