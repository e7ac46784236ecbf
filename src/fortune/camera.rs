//! Frame source backed by a directory of binary PPM (P6) snapshots,
//! e.g. captured with `ffmpeg -f v4l2 -i /dev/video0 -r 4 frames/%04d.ppm`.
//! Frames are replayed in filename order and wrap around.

use std::path::{Path, PathBuf};

use super::{FortuneError, Frame, FrameSource};

pub struct PpmCamera {
    frames: Vec<PathBuf>,
    cursor: usize,
}

impl PpmCamera {
    pub fn open(dir: &Path) -> Result<Self, FortuneError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| FortuneError::CameraUnavailable(format!("{}: {}", dir.display(), e)))?;

        let mut frames: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .map(|ext| ext.eq_ignore_ascii_case("ppm"))
                        .unwrap_or(false)
            })
            .collect();

        if frames.is_empty() {
            return Err(FortuneError::CameraUnavailable(format!(
                "no .ppm frames in {}",
                dir.display()
            )));
        }

        frames.sort();
        tracing::debug!("Camera opened with {} frames from {}", frames.len(), dir.display());

        Ok(Self { frames, cursor: 0 })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for PpmCamera {
    fn grab(&mut self) -> Result<Frame, FortuneError> {
        let path = &self.frames[self.cursor];
        self.cursor = (self.cursor + 1) % self.frames.len();

        let data = std::fs::read(path)?;
        parse_ppm(&data).map_err(|e| match e {
            FortuneError::Frame(msg) => FortuneError::Frame(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }
}

/// Parse a binary PPM image with maxval up to 255
pub fn parse_ppm(data: &[u8]) -> Result<Frame, FortuneError> {
    let mut pos = 0;
    let mut fields = [0usize; 3];

    let magic = next_token(data, &mut pos).ok_or_else(|| bad("missing header"))?;
    if magic != b"P6" {
        return Err(bad("not a binary PPM (expected P6)"));
    }

    for field in fields.iter_mut() {
        let token = next_token(data, &mut pos).ok_or_else(|| bad("truncated header"))?;
        *field = std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| bad("invalid header number"))?;
    }
    let [width, height, maxval] = fields;

    if maxval == 0 || maxval > 255 {
        return Err(bad("only 8-bit PPM is supported"));
    }

    // Exactly one whitespace byte separates the header from the raster
    pos += 1;
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| bad("image dimensions too large"))?;
    let end = pos
        .checked_add(expected)
        .ok_or_else(|| bad("image dimensions too large"))?;
    let raster = data
        .get(pos..end)
        .ok_or_else(|| bad("raster shorter than header says"))?;

    let pixels = raster
        .chunks_exact(3)
        .map(|px| {
            [
                scale(px[0], maxval),
                scale(px[1], maxval),
                scale(px[2], maxval),
            ]
        })
        .collect();

    Ok(Frame {
        width,
        height,
        pixels,
    })
}

fn scale(value: u8, maxval: usize) -> u8 {
    if maxval == 255 {
        value
    } else {
        ((value as usize * 255) / maxval).min(255) as u8
    }
}

fn bad(msg: &str) -> FortuneError {
    FortuneError::Frame(msg.to_string())
}

/// Next whitespace-delimited header token, skipping `#` comments
fn next_token<'a>(data: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    loop {
        while *pos < data.len() && data[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < data.len() && data[*pos] == b'#' {
            while *pos < data.len() && data[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }

    let start = *pos;
    while *pos < data.len() && !data[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    (start < *pos).then(|| &data[start..*pos])
}
