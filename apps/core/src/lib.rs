pub mod action_executor;
pub mod capture;
pub mod catalogue;
pub mod chord;
pub mod clipboard_history;
pub mod config;
pub mod home;
pub mod hotkey;
pub mod input_router;
pub mod keys;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod selectable_list;
pub mod surface;
pub mod view;
pub mod view_stack;
pub mod visibility;

#[cfg(test)]
mod tests {
    mod filter_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/filter_latency_test.rs"
        ));
    }
}
