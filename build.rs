use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=assets/video/");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("builtin_clips.rs");
    let mut f = fs::File::create(&dest_path).unwrap();

    let asset_dir = Path::new(&env::var("CARGO_MANIFEST_DIR").unwrap()).join("assets/video");
    if !asset_dir.exists() {
        writeln!(f, "const BUILTIN_CLIPS: &[(&str, &str)] = &[];").unwrap();
        return;
    }

    let mut entries: Vec<_> = fs::read_dir(&asset_dir)
        .unwrap()
        .map(|res| res.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();

    // Stable order so the generated table doesn't churn between builds
    entries.sort();

    // Clips are keyed by file stem: "video/walk.mp4" resolves to assets/video/walk.txt
    writeln!(f, "const BUILTIN_CLIPS: &[(&str, &str)] = &[").unwrap();
    for path in entries {
        let stem = path.file_stem().unwrap().to_string_lossy();
        writeln!(f, "    ({:?}, include_str!({:?})),", stem, path.display().to_string()).unwrap();
    }
    writeln!(f, "];").unwrap();
}
