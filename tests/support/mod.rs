use std::path::{Path, PathBuf};

// 1x1 PNG.
#[allow(dead_code)]
pub static PIXEL_PNG: &[u8] = &[
    137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13, 73, 72, 68, 82, 0, 0, 0, 1, 0, 0, 0, 1, 8, 4, 0,
    0, 0, 181, 28, 12, 2, 0, 0, 0, 11, 73, 68, 65, 84, 120, 218, 99, 252, 255, 23, 0, 2, 3, 1,
    128, 110, 220, 25, 0, 0, 0, 0, 73, 69, 78, 68, 174, 66, 96, 130,
];

// First case pattern matching the image path wins; unmatched images print
// nothing. Texts must not contain single quotes or percent signs.
pub fn write_stub_tesseract(dir: &Path, cases: &[(&str, &str)]) -> anyhow::Result<PathBuf> {
    let mut script = String::from("#!/bin/sh\n[ \"$2\" = \"stdout\" ] || exit 2\ncase \"$1\" in\n");
    for (pattern, text) in cases {
        script.push_str(&format!("*{pattern}*) printf '{text}' ;;\n"));
    }
    script.push_str("*) : ;;\nesac\n");

    let path = dir.join("tesseract-stub");
    std::fs::write(&path, script)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        let mut perms = std::fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}
