// loader.rs — 后台线程解码图片，通过通道交回主线程

use crate::error::ImageLoadError;
use crate::i18n::{tr, tr_with};
use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

pub type LoadResult = Result<RgbaImage, ImageLoadError>;

/// Decodes any format `image` can guess, without size limits.
pub fn load_image(path: &Path) -> LoadResult {
    let file = File::open(path).map_err(|source| ImageLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    reader.no_limits();

    let img = reader.decode()?;
    Ok(img.to_rgba8())
}

pub fn start_load_image(path: PathBuf, tx: Sender<LoadResult>) {
    thread::spawn(move || {
        log::info!(
            "{}",
            tr_with("log.loading_image", &[("path", path.display().to_string())])
        );

        let result = load_image(&path);
        match &result {
            Ok(rgba) => log::info!(
                "{}",
                tr_with(
                    "log.image_loaded",
                    &[("w", rgba.width().to_string()), ("h", rgba.height().to_string())]
                )
            ),
            Err(e) if matches!(e, ImageLoadError::Open { .. }) => {
                log::error!("{}", tr_with("error.open_file", &[("err", e.to_string())]))
            }
            Err(e) => log::error!("{}", tr_with("error.decode_image", &[("err", e.to_string())])),
        }

        if tx.send(result).is_err() {
            log::error!("{}", tr("error.send_to_main_failed"));
        }
    });
}
