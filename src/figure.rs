use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Resolution at which the bitmap is placed on the PDF page.
pub const PDF_DPI: f32 = 150.0;

pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Draw into an in-memory white RGB bitmap of the given size.
pub fn render<F>(size: (u32, u32), draw: F) -> Result<RgbImage>
where
    F: FnOnce(&Canvas<'_>) -> Result<()>,
{
    let (width, height) = size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }

    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| anyhow!("bitmap buffer does not match {}x{}", width, height))
}

pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Single-page PDF with the bitmap filling the page.
pub fn save_pdf(image: &RgbImage, path: &Path, title: &str) -> Result<()> {
    let px_to_mm = |px: u32| px as f32 / PDF_DPI * 25.4;
    let (doc, page, layer) = PdfDocument::new(
        title,
        Mm(px_to_mm(image.width())),
        Mm(px_to_mm(image.height())),
        "figure",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let embedded = Image::from_dynamic_image(&DynamicImage::ImageRgb8(image.clone()));
    embedded.add_to_layer(
        layer,
        ImageTransform {
            dpi: Some(PDF_DPI),
            ..Default::default()
        },
    );

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| anyhow!("Failed to write {}: {:?}", path.display(), e))?;
    Ok(())
}

/// Render once and write `{dir}/{stem}.png` and `{dir}/{stem}.pdf`.
/// Returns the PNG path.
pub fn save_figure<F>(dir: &Path, stem: &str, size: (u32, u32), draw: F) -> Result<PathBuf>
where
    F: FnOnce(&Canvas<'_>) -> Result<()>,
{
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let image = render(size, draw).with_context(|| format!("Failed to render {}", stem))?;

    let png_path = dir.join(format!("{}.png", stem));
    save_png(&image, &png_path)?;
    save_pdf(&image, &dir.join(format!("{}.pdf", stem)), stem)?;

    Ok(png_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn render_fills_white_background() {
        let image = render((40, 30), |_| Ok(())).unwrap();
        assert_eq!(image.dimensions(), (40, 30));
        assert!(image.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn save_figure_writes_png_and_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("nested").join("plots");

        let png_path = save_figure(&out_dir, "block", (64, 48), |root| {
            root.draw(&Rectangle::new([(8, 8), (40, 30)], BLUE.filled()))?;
            Ok(())
        })
        .unwrap();

        assert_eq!(png_path, out_dir.join("block.png"));
        let png = image::open(&png_path).unwrap().to_rgb8();
        assert_eq!(png.get_pixel(20, 20).0, [0, 0, 255]);

        let pdf = fs::read(out_dir.join("block.pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn draw_errors_propagate() {
        let result = render((10, 10), |_| Err(anyhow!("boom")));
        assert!(result.is_err());
    }
}
