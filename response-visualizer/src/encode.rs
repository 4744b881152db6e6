use anyhow::{Context, Result};
use image::RgbaImage;
use log::{debug, info};
use minimp4::Mp4Muxer;
use openh264::encoder::{BitRate, Encoder, EncoderConfig, FrameRate};
use openh264::formats::YUVBuffer;
use std::fs;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

const BITRATE_BPS: u32 = 5_000_000;

/// Converts an RGBA frame to planar YUV 4:2:0 (BT.601).
/// Both dimensions must be even.
pub fn rgba_to_yuv420(image: &RgbaImage) -> Vec<u8> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let luma_len = width * height;
    let chroma_width = width / 2;
    let chroma_len = chroma_width * (height / 2);

    let mut yuv = vec![0u8; luma_len + 2 * chroma_len];
    let (luma, chroma) = yuv.split_at_mut(luma_len);
    let (u_plane, v_plane) = chroma.split_at_mut(chroma_len);

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, _] = pixel.0.map(f32::from);
        luma[y as usize * width + x as usize] = (0.299 * r + 0.587 * g + 0.114 * b).round() as u8;
    }

    // Each chroma sample averages a 2x2 block
    for cy in 0..height / 2 {
        for cx in 0..chroma_width {
            let (mut sum_u, mut sum_v) = (0.0f32, 0.0f32);
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let [r, g, b, _] = image.get_pixel((2 * cx + dx) as u32, (2 * cy + dy) as u32).0.map(f32::from);
                sum_u += -0.169 * r - 0.331 * g + 0.5 * b + 128.0;
                sum_v += 0.5 * r - 0.419 * g - 0.081 * b + 128.0;
            }
            let idx = cy * chroma_width + cx;
            u_plane[idx] = (sum_u / 4.0).round().clamp(0.0, 255.0) as u8;
            v_plane[idx] = (sum_v / 4.0).round().clamp(0.0, 255.0) as u8;
        }
    }

    yuv
}

/// Accumulates H.264 frames and writes them out as an MP4 file.
pub struct VideoWriter {
    encoder: Encoder,
    h264_data: Vec<u8>,
    width: u32,
    height: u32,
    fps: u32,
    frame_count: usize,
}

impl VideoWriter {
    pub fn new(width: u32, height: u32, fps: u32) -> Result<Self> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            anyhow::bail!("Video dimensions must be even and non-zero, got {}x{}.", width, height);
        }
        if fps == 0 {
            anyhow::bail!("Frame rate must be positive.");
        }

        let encoder = Encoder::with_api_config(
            openh264::OpenH264API::from_source(),
            EncoderConfig::new()
                .max_frame_rate(FrameRate::from_hz(fps as f32))
                .bitrate(BitRate::from_bps(BITRATE_BPS)),
        )
        .context("Failed to initialize H.264 encoder")?;

        Ok(Self { encoder, h264_data: Vec::new(), width, height, fps, frame_count: 0 })
    }

    /// Encodes a frame already converted with [`rgba_to_yuv420`].
    pub fn encode_yuv(&mut self, yuv_data: Vec<u8>) -> Result<()> {
        let yuv_source = YUVBuffer::from_vec(yuv_data, self.width as usize, self.height as usize);
        let bitstream = self
            .encoder
            .encode(&yuv_source)
            .with_context(|| format!("Failed to encode frame {}", self.frame_count))?;
        bitstream.write_vec(&mut self.h264_data);
        self.frame_count += 1;
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Muxes the encoded stream into an MP4 container at `path`.
    /// Returns the file size in bytes.
    pub fn finish<P: AsRef<Path>>(self, path: P, description: &str) -> Result<usize> {
        let path_ref = path.as_ref();
        info!("Creating MP4 file with {} frames...", self.frame_count);

        let mut video_buffer = Cursor::new(Vec::new());
        let mut mp4muxer = Mp4Muxer::new(&mut video_buffer);
        mp4muxer.init_video(self.width as i32, self.height as i32, false, description);
        mp4muxer.write_video_with_fps(&self.h264_data, self.fps);
        mp4muxer.close();

        video_buffer.seek(SeekFrom::Start(0))?;
        let mut video_bytes = Vec::new();
        video_buffer.read_to_end(&mut video_bytes)?;
        debug!("H.264 stream: {} bytes, MP4: {} bytes", self.h264_data.len(), video_bytes.len());

        fs::write(path_ref, &video_bytes)
            .with_context(|| format!("Failed to write video file to {}", path_ref.display()))?;
        Ok(video_bytes.len())
    }
}
