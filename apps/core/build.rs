fn main() {
    println!("cargo:rerun-if-env-changed=QUICKLAUNCH_ICON");
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        return;
    }

    let icon_path =
        std::env::var("QUICKLAUNCH_ICON").unwrap_or_else(|_| "../assets/quicklaunch.ico".to_string());
    if !std::path::Path::new(&icon_path).exists() {
        println!(
            "cargo:warning=quicklaunch-core: Windows icon missing at {icon_path}; continuing without embedded icon"
        );
        return;
    }

    let mut res = winres::WindowsResource::new();
    res.set_icon(&icon_path);
    if let Err(error) = res.compile() {
        println!("cargo:warning=quicklaunch-core: failed to embed Windows icon: {error}");
    }
}
