use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use zip::ZipArchive;

const FONT_FILE: &str = "DejaVuSans.ttf";
const ZIP_URL: &str = "https://github.com/dejavu-fonts/dejavu-fonts/releases/download/version_2_37/dejavu-fonts-ttf-2.37.zip";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=FONT_TTF");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let target_font = out_dir.join(FONT_FILE);

    // Incremental build: a previous run already produced a non-empty font.
    if fs::metadata(&target_font).map(|m| m.len() > 0).unwrap_or(false) {
        return;
    }

    if let Ok(path) = env::var("FONT_TTF") {
        match fs::copy(&path, &target_font) {
            Ok(_) => return,
            Err(e) => println!("cargo:warning=failed to copy FONT_TTF {path}: {e}"),
        }
    }

    match download_and_extract(&out_dir, &target_font) {
        Ok(()) => {}
        Err(msg) => {
            // Text falls back to system fonts at runtime when the bundle is empty.
            println!("cargo:warning={msg}; labels will use system fonts");
            fs::write(&target_font, b"").expect("write empty font placeholder");
        }
    }
}

fn download_and_extract(out_dir: &Path, target_font: &Path) -> Result<(), String> {
    let zip_path = out_dir.join("dejavu-fonts-ttf.zip");
    let zip_arg = zip_path.to_string_lossy().to_string();
    let mut ok = false;
    let status = Command::new("curl")
        .args(["-L", "-f", "-s", "--connect-timeout", "10", "--max-time", "120", "-o", &zip_arg, ZIP_URL])
        .status();
    if let Ok(st) = status
        && st.success()
    {
        ok = true;
    }
    if !ok {
        let status = Command::new("wget")
            .args(["-q", "-T", "30", "-O", &zip_arg, ZIP_URL])
            .status();
        if let Ok(st) = status
            && st.success()
        {
            ok = true;
        }
    }
    if !ok {
        return Err(format!("failed to download {ZIP_URL} (set FONT_TTF to use a local font)"));
    }

    let mut data = Vec::new();
    fs::File::open(&zip_path)
        .and_then(|mut f| f.read_to_end(&mut data))
        .map_err(|e| format!("zip read failed: {e}"))?;
    let mut zip = ZipArchive::new(std::io::Cursor::new(data)).map_err(|e| format!("zip parse failed: {e}"))?;
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).map_err(|e| format!("zip entry {i}: {e}"))?;
        if file.name().ends_with(&format!("ttf/{FONT_FILE}")) {
            let mut buf = Vec::new();
            std::io::copy(&mut file, &mut buf).map_err(|e| format!("extract failed: {e}"))?;
            fs::write(target_font, &buf).map_err(|e| format!("write font failed: {e}"))?;
            return Ok(());
        }
    }
    Err(format!("{FONT_FILE} not found in {ZIP_URL}"))
}
