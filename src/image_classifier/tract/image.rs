use image::{imageops, DynamicImage};
use tract_onnx::prelude::*;

fn same_aspect(from: (u32, u32), to: (u32, u32)) -> bool {
    from.0 as u64 * to.1 as u64 == from.1 as u64 * to.0 as u64
}

/// Scales `image` to fit `width`x`height`, keeping its aspect ratio, and
/// centers it on a black canvas.
pub fn letterbox(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if same_aspect((image.width(), image.height()), (width, height)) {
        return image.resize_exact(width, height, imageops::FilterType::Triangle);
    }

    let scaled = image.resize(width, height, imageops::FilterType::Triangle);

    let mut canvas = DynamicImage::new_rgb8(width, height);
    let x_offset = (width - scaled.width()) / 2;
    let y_offset = (height - scaled.height()) / 2;
    imageops::overlay(&mut canvas, &scaled, x_offset as i64, y_offset as i64);

    canvas
}

/// NCHW float tensor with channels scaled to [0, 1].
pub fn to_tensor(image: &DynamicImage, width: u32, height: u32) -> Tensor {
    let rgb = letterbox(image, width, height).to_rgb8();

    tract_ndarray::Array4::from_shape_fn(
        (1, 3, height as usize, width as usize),
        |(_, c, y, x)| rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    )
    .into_tensor()
}
