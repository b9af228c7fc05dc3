use anyhow::{Context, Result};
use std::{fs, io, path::Path};

/// Blocking GET of `url` into `dest`, replacing any previous file.
pub fn download_file(url: &str, dest: &Path) -> Result<()> {
    let mut resp = reqwest::blocking::get(url)
        .with_context(|| format!("http GET {url}"))?
        .error_for_status()
        .with_context(|| format!("request failed for {url}"))?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut file =
        fs::File::create(dest).with_context(|| format!("create {}", dest.display()))?;
    io::copy(&mut resp, &mut file).with_context(|| format!("write {}", dest.display()))?;
    tracing::debug!(url, dest = %dest.display(), "download complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_url_fails_without_creating_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("runtime.exe");
        let err = download_file("not a url", &dest).unwrap_err();
        assert!(err.to_string().contains("http GET not a url"));
        assert!(!dest.exists());
    }
}
