//! On-demand export of the display surface as a binary PPM. Pass-through
//! capability: the surface bytes go out exactly as composited.

use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Write `rgba` (row-major RGBA8, `width * height` pixels) as P6 PPM,
/// dropping the alpha channel.
pub fn write_ppm(path: &Path, width: usize, height: usize, rgba: &[u8]) -> anyhow::Result<()> {
    anyhow::ensure!(
        rgba.len() == width * height * 4,
        "surface is {} bytes, expected {}",
        rgba.len(),
        width * height * 4
    );

    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{width} {height}\n255\n")?;
    for px in rgba.chunks_exact(4) {
        out.write_all(&px[..3])?;
    }
    out.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Unique-enough snapshot name in the working directory.
pub fn snapshot_path() -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    PathBuf::from(format!("nivis-{stamp}.ppm"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppm_has_header_and_rgb_payload() {
        let dir = std::env::temp_dir();
        let path = dir.join("nivis_tui_snapshot_test.ppm");
        let rgba = vec![10u8, 20, 30, 255, 40, 50, 60, 255];
        write_ppm(&path, 2, 1, &rgba).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(bytes.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(&bytes[bytes.len() - 6..], &[10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let dir = std::env::temp_dir();
        let path = dir.join("nivis_tui_snapshot_bad.ppm");
        let err = write_ppm(&path, 2, 2, &[0u8; 4]);
        assert!(err.is_err());
    }
}
