//! Test fixtures for common test scenarios.
//!
//! Archives here mirror the layout of the real CPython release artifacts
//! closely enough for the provisioning code to treat them as such.

use std::io::{Cursor, Write};
use std::path::PathBuf;

use crate::core::host::{Host, HostPython, PythonVersion, TARGET_OS};

/// Host interpreter facts for a 64-bit CPython 3.11.4 on Windows.
pub fn sample_host_python() -> HostPython {
    HostPython {
        executable: PathBuf::from("C:/Python311/python.exe"),
        version: PythonVersion::new(3, 11, 4),
        pointer_bits: 64,
        machine: "AMD64".to_string(),
        platform: "win32".to_string(),
        include: PathBuf::from("C:/Python311/Include"),
        platinclude: PathBuf::from("C:/Python311/Include"),
        base_exec_prefix: PathBuf::from("C:/Python311"),
    }
}

/// A Windows host running [`sample_host_python`].
pub fn sample_host() -> Host {
    Host {
        os: TARGET_OS.to_string(),
        python: sample_host_python(),
    }
}

/// Build an in-memory zip archive from `(name, contents)` pairs.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, contents) in files {
        writer
            .start_file(*name, options)
            .expect("failed to start zip entry");
        writer.write_all(contents).expect("failed to write zip entry");
    }

    writer
        .finish()
        .expect("failed to finish zip archive")
        .into_inner()
}

/// Build an in-memory gzip tarball from `(name, contents)` pairs.
pub fn tar_gz_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *contents)
            .expect("failed to append tar entry");
    }

    builder
        .into_inner()
        .expect("failed to finish tarball")
        .finish()
        .expect("failed to finish gzip stream")
}

/// Embeddable distribution for `version`: interpreter, DLL, nested
/// standard-library zip and the `._pth` file that restricts `sys.path`.
pub fn embed_zip_bytes(version: PythonVersion) -> Vec<u8> {
    let tag = format!("python{}{}", version.major, version.minor);
    let stdlib = zip_bytes(&[
        ("os.py", b"# os module\n"),
        ("encodings/__init__.py", b""),
    ]);

    zip_bytes(&[
        ("python.exe", b"MZ python"),
        ("pythonw.exe", b"MZ pythonw"),
        (&format!("{}.dll", tag), b"MZ dll"),
        (&format!("{}.zip", tag), &stdlib),
        (&format!("{}._pth", tag), b"python311.zip\n.\n"),
        ("LICENSE.txt", b"PSF"),
    ])
}

/// Source tarball for `version` with a few `lib2to3` modules and unrelated
/// files around them.
pub fn source_tgz_bytes(version: PythonVersion) -> Vec<u8> {
    let root = format!("Python-{}", version);
    let fix_print = format!("{}/Lib/lib2to3/fixes/fix_print.py", root);
    let fix_init = format!("{}/Lib/lib2to3/fixes/__init__.py", root);
    let token = format!("{}/Lib/lib2to3/pgen2/token.py", root);
    let grammar = format!("{}/Lib/lib2to3/Grammar.txt", root);
    let readme = format!("{}/README.rst", root);

    tar_gz_bytes(&[
        (&readme, b"This is Python"),
        (&fix_init, b""),
        (&fix_print, b"# fixer for print\n"),
        (&token, b"# token constants\n"),
        (&grammar, b"file_input: (NEWLINE | stmt)* ENDMARKER\n"),
    ])
}

/// A `pyproject.toml` with one console and one GUI script.
pub fn sample_pyproject(name: &str, version: &str) -> String {
    format!(
        r#"[project]
name = "{name}"
version = "{version}"

[project.scripts]
{name} = "{module}.cli:main"

[project.gui-scripts]
{name}-gui = "{module}.gui:main"
"#,
        name = name,
        version = version,
        module = name.replace('-', "_"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_zip_contents() {
        let bytes = embed_zip_bytes(PythonVersion::new(3, 11, 4));
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.file_names().collect();

        assert!(names.contains(&"python.exe"));
        assert!(names.contains(&"python311.zip"));
        assert!(names.contains(&"python311._pth"));
    }

    #[test]
    fn test_sample_pyproject_parses() {
        let contents = sample_pyproject("sample-app", "1.0");
        let value: toml::Value = toml::from_str(&contents).unwrap();
        assert_eq!(value["project"]["scripts"]["sample-app"].as_str(), Some("sample_app.cli:main"));
    }
}
