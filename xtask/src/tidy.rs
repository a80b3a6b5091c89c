use std::{
    fs,
    path::{Path, PathBuf},
};

#[test]
fn no_trailing_whitespace() {
    let mut offenders = Vec::new();
    for path in rust_files(&project_root()) {
        let text = fs::read_to_string(&path).unwrap();
        for (i, line) in text.lines().enumerate() {
            if line.ends_with([' ', '\t']) {
                offenders.push(format!("{}:{}", path.display(), i + 1));
            }
        }
    }
    assert!(offenders.is_empty(), "trailing whitespace:\n{}", offenders.join("\n"));
}

#[test]
fn no_todo_macros() {
    for path in rust_files(&project_root().join("src")) {
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains(concat!("todo", "!(")), "{} calls todo!()", path.display());
        assert!(!text.contains(concat!("dbg", "!(")), "{} calls dbg!()", path.display());
    }
}

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).parent().unwrap().to_path_buf()
}

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut res = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
            if name.starts_with('.') || name == "target" || name == "examples" {
                continue;
            }
            if path.is_dir() {
                stack.push(path);
            } else if name.ends_with(".rs") {
                res.push(path);
            }
        }
    }
    res.sort();
    res
}
