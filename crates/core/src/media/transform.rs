//! Delivery URLs for resized and re-encoded images.
//!
//! Renders `{origin}/cdn-cgi/image/{options}/{source}` where `source` is the
//! object path when the public URL lives on `origin`, else the full URL.

use std::fmt;

/// How the image fills the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFit {
    /// Shrink to fit, never enlarge.
    ScaleDown,
    /// Fit inside the box, preserving aspect ratio.
    Contain,
    /// Fill the box, cropping the overflow.
    Cover,
    /// Fill the box, cropping without resizing first.
    Crop,
    /// Fit inside and pad to the exact box.
    Pad,
}

impl fmt::Display for ImageFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ScaleDown => "scale-down",
            Self::Contain => "contain",
            Self::Cover => "cover",
            Self::Crop => "crop",
            Self::Pad => "pad",
        })
    }
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Best format the client accepts.
    Auto,
    /// WebP.
    Webp,
    /// AVIF.
    Avif,
    /// JPEG.
    Jpeg,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Jpeg => "jpeg",
        })
    }
}

/// Resize/re-encode options for one image URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageTransform {
    width: Option<u32>,
    height: Option<u32>,
    quality: Option<u8>,
    fit: Option<ImageFit>,
    format: Option<ImageFormat>,
}

impl ImageTransform {
    /// Empty transform (renders the URL untouched).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Square thumbnail used for avatars: `size`×`size`, cover, auto format.
    #[must_use]
    pub fn avatar(size: u32) -> Self {
        Self::new()
            .width(size)
            .height(size)
            .fit(ImageFit::Cover)
            .format(ImageFormat::Auto)
    }

    /// Target width in pixels.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Target height in pixels.
    #[must_use]
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Encoding quality, clamped to 1..=100.
    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality.clamp(1, 100));
        self
    }

    /// Fit mode.
    #[must_use]
    pub fn fit(mut self, fit: ImageFit) -> Self {
        self.fit = Some(fit);
        self
    }

    /// Output format.
    #[must_use]
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Comma-separated option list, `None` when nothing is set.
    #[must_use]
    pub fn options(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(w) = self.width {
            parts.push(format!("width={w}"));
        }
        if let Some(h) = self.height {
            parts.push(format!("height={h}"));
        }
        if let Some(q) = self.quality {
            parts.push(format!("quality={q}"));
        }
        if let Some(fit) = self.fit {
            parts.push(format!("fit={fit}"));
        }
        if let Some(format) = self.format {
            parts.push(format!("format={format}"));
        }

        (!parts.is_empty()).then(|| parts.join(","))
    }

    /// Delivery URL for `public_url` through `origin`.
    #[must_use]
    pub fn apply(&self, origin: &str, public_url: &str) -> String {
        let Some(options) = self.options() else {
            return public_url.to_string();
        };

        let origin = origin.trim_end_matches('/');
        let source = public_url
            .strip_prefix(origin)
            .filter(|rest| rest.starts_with('/'))
            .map_or(public_url, |rest| rest.trim_start_matches('/'));

        format!("{origin}/cdn-cgi/image/{options}/{source}")
    }
}
