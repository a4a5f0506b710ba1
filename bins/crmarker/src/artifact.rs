// Image artifacts left behind by the marked program
use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use std::fs;
use std::path::Path;

/// MIME type for the image extensions we know how to embed
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// Read a png or jpeg image and return it as a `data:` URI
pub fn make_data_uri(path: &Path) -> Result<String> {
    let Some(mime) = image_mime_type(path) else {
        bail!("Unknown image type for data URI: {}", path.display());
    };
    let contents = fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(format!(
        "data:{};base64,{}",
        mime,
        general_purpose::STANDARD.encode(contents)
    ))
}

/// HTML for an inline image
pub fn image_html(path: &Path) -> Result<String> {
    Ok(format!("<img src=\"{}\" alt=\"Your plot\">", make_data_uri(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mime_types() {
        assert_eq!(image_mime_type(Path::new("plot.png")), Some("image/png"));
        assert_eq!(image_mime_type(Path::new("plot.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime_type(Path::new("plot.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime_type(Path::new("plot.svg")), None);
        assert_eq!(image_mime_type(Path::new("plot")), None);
    }

    #[test]
    fn test_png_data_uri() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plot.png");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(make_data_uri(&path).unwrap(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plot.bmp");
        fs::write(&path, b"abc").unwrap();
        assert!(make_data_uri(&path).is_err());
    }

    #[test]
    fn test_image_html() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        fs::write(&path, b"abc").unwrap();
        let html = image_html(&path).unwrap();
        assert!(html.starts_with("<img src=\"data:image/jpeg;base64,YWJj\""));
    }
}
