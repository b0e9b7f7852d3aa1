//! AVIF decoding: `avif-parse` for the container, `rav1d` for the AV1 frame.
//!
//! The `image` crate's `"avif"` feature only enables the rav1e encoder; its
//! decoder needs the dav1d C library. `rav1d` is the pure-Rust port, driven
//! here through its C-compatible API.

use super::backend::BackendError;
use image::RgbImage;
use rav1d::include::dav1d::data::Dav1dData;
use rav1d::include::dav1d::dav1d::Dav1dSettings;
use rav1d::include::dav1d::headers::{
    DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
    DAV1D_PIXEL_LAYOUT_I444,
};
use rav1d::include::dav1d::picture::Dav1dPicture;
use rav1d::src::lib as dav1d;
use std::ptr::NonNull;

/// True when `bytes` start with an ISO-BMFF `ftyp` box branded AVIF.
pub fn is_avif(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && matches!(&bytes[8..12], b"avif" | b"avis")
}

/// Decoded picture that is unreferenced on drop.
struct Picture(Dav1dPicture);

impl Drop for Picture {
    fn drop(&mut self) {
        unsafe { dav1d::dav1d_picture_unref(NonNull::new(&mut self.0)) };
    }
}

pub fn decode_avif(bytes: &[u8], name: &str) -> Result<RgbImage, BackendError> {
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(bytes))
        .map_err(|e| BackendError::decode(name, format!("{e:?}")))?;
    let av1: &[u8] = &avif.primary_item;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    let settings_ptr = NonNull::new(settings.as_mut_ptr())
        .ok_or_else(|| BackendError::decode(name, "null settings"))?;
    unsafe { dav1d::dav1d_default_settings(settings_ptr) };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc = unsafe { dav1d::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(BackendError::decode(name, format!("rav1d open failed ({})", rc.0)));
    }

    // Every exit from the frame decode goes through the single close below.
    let decoded = (|| {
        let fail = |what: String| BackendError::decode(name, what);

        let mut data = Dav1dData::default();
        let buf = unsafe { dav1d::dav1d_data_create(NonNull::new(&mut data), av1.len()) };
        if buf.is_null() {
            return Err(fail("rav1d data_create failed".into()));
        }
        unsafe { std::ptr::copy_nonoverlapping(av1.as_ptr(), buf, av1.len()) };

        let rc = unsafe { dav1d::dav1d_send_data(ctx, NonNull::new(&mut data)) };
        if rc.0 != 0 {
            unsafe { dav1d::dav1d_data_unref(NonNull::new(&mut data)) };
            return Err(fail(format!("rav1d send_data failed ({})", rc.0)));
        }

        let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
        let rc = unsafe { dav1d::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
        if rc.0 != 0 {
            return Err(fail(format!("rav1d get_picture failed ({})", rc.0)));
        }
        let picture = Picture(pic);
        let pic = &picture.0;

        let (width, height) = (pic.p.w as u32, pic.p.h as u32);
        let y = pic.data[0].ok_or_else(|| fail("missing luma plane".into()))?;
        let y = y.as_ptr() as *const u8;

        let planes = if pic.p.layout == DAV1D_PIXEL_LAYOUT_I400 {
            YuvPlanes {
                y,
                u: y,
                v: y,
                y_stride: pic.stride[0],
                uv_stride: 0,
                width,
                height,
                bpc: pic.p.bpc as u32,
                subsampling: (false, false),
                monochrome: true,
            }
        } else {
            let subsampling = match pic.p.layout {
                DAV1D_PIXEL_LAYOUT_I420 => (true, true),
                DAV1D_PIXEL_LAYOUT_I422 => (true, false),
                DAV1D_PIXEL_LAYOUT_I444 => (false, false),
                other => return Err(fail(format!("unsupported pixel layout {other}"))),
            };
            let u = pic.data[1].ok_or_else(|| fail("missing chroma plane".into()))?;
            let v = pic.data[2].ok_or_else(|| fail("missing chroma plane".into()))?;
            YuvPlanes {
                y,
                u: u.as_ptr() as *const u8,
                v: v.as_ptr() as *const u8,
                y_stride: pic.stride[0],
                uv_stride: pic.stride[1],
                width,
                height,
                bpc: pic.p.bpc as u32,
                subsampling,
                monochrome: false,
            }
        };

        let rgb = planes.to_rgb();
        RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| fail("decoded frame size mismatch".into()))
    })();

    unsafe { dav1d::dav1d_close(NonNull::new(&mut ctx)) };
    decoded
}

/// Borrowed YUV planes of a decoded picture.
struct YuvPlanes {
    y: *const u8,
    u: *const u8,
    v: *const u8,
    y_stride: isize,
    uv_stride: isize,
    width: u32,
    height: u32,
    bpc: u32,
    /// Chroma subsampling (horizontal, vertical); I420 = (true, true).
    subsampling: (bool, bool),
    monochrome: bool,
}

impl YuvPlanes {
    /// BT.601 YCbCr → interleaved RGB8.
    fn to_rgb(&self) -> Vec<u8> {
        let max = ((1u32 << self.bpc) - 1) as f32;
        let center = (1u32 << (self.bpc - 1)) as f32;
        let scale = 255.0 / max;
        let (ss_x, ss_y) = self.subsampling;

        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
        for row in 0..self.height {
            for col in 0..self.width {
                let luma = sample(self.y, self.y_stride, col, row, self.bpc);
                let (r, g, b) = if self.monochrome {
                    (luma, luma, luma)
                } else {
                    let cx = if ss_x { col / 2 } else { col };
                    let cy = if ss_y { row / 2 } else { row };
                    let cb = sample(self.u, self.uv_stride, cx, cy, self.bpc) - center;
                    let cr = sample(self.v, self.uv_stride, cx, cy, self.bpc) - center;
                    (
                        luma + 1.402 * cr,
                        luma - 0.344136 * cb - 0.714136 * cr,
                        luma + 1.772 * cb,
                    )
                };
                for channel in [r, g, b] {
                    rgb.push((channel * scale).clamp(0.0, 255.0) as u8);
                }
            }
        }
        rgb
    }
}

/// One plane sample; 10/12-bit content is stored as u16.
#[inline]
fn sample(plane: *const u8, stride: isize, x: u32, y: u32, bpc: u32) -> f32 {
    if bpc <= 8 {
        (unsafe { *plane.offset(y as isize * stride + x as isize) }) as f32
    } else {
        let offset = y as isize * stride + x as isize * 2;
        (unsafe { (plane.offset(offset) as *const u16).read_unaligned() }) as f32
    }
}
