use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")).unwrap_or_default();

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            let include_dir = crate_dir.join("include");
            if let Err(e) = std::fs::create_dir_all(&include_dir) {
                println!("cargo:warning=cannot create {}: {e}", include_dir.display());
                return;
            }
            bindings.write_to_file(include_dir.join("proofy.h"));
        }
        Err(e) => println!("cargo:warning=skipping C header generation: {e}"),
    }
}
