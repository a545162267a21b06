use async_trait::async_trait;
use shelf_models::{Entry, Palette};
use shelf_sources::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::resolver::PaletteStrategy;
use super::{palette_from_hsl, rgb_to_hsl};

const THUMBNAIL_EDGE: u32 = 32;

/// Derives a palette from the poster's average color.
///
/// Best effort only: posters on third-party CDNs may refuse the request,
/// time out, or not decode. Every such case yields `None`.
pub struct PosterSampler {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl PosterSampler {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub async fn sample(&self, poster_url: &str) -> Option<Palette> {
        if poster_url.is_empty() {
            return None;
        }

        let response = match tokio::time::timeout(self.timeout, self.transport.get(poster_url)).await {
            Ok(Ok(response)) if response.is_success() => response,
            Ok(Ok(response)) => {
                debug!(url = %poster_url, status = response.status, "Poster request refused");
                return None;
            }
            Ok(Err(e)) => {
                debug!(url = %poster_url, error = %e, "Poster request failed");
                return None;
            }
            Err(_) => {
                debug!(url = %poster_url, timeout = ?self.timeout, "Poster request timed out");
                return None;
            }
        };

        let palette = palette_from_image_bytes(&response.body);
        if palette.is_none() {
            debug!(url = %poster_url, bytes = response.body.len(), "Poster did not decode");
        }
        palette
    }
}

#[async_trait]
impl PaletteStrategy for PosterSampler {
    fn name(&self) -> &str {
        "poster-sample"
    }

    async fn palette(&self, entry: &Entry) -> Option<Palette> {
        self.sample(&entry.poster_url).await
    }
}

/// Average color of an encoded image, pulled into the same saturation and
/// lightness band the title hash uses so sampled and generated palettes
/// sit together on one shelf.
pub fn palette_from_image_bytes(bytes: &[u8]) -> Option<Palette> {
    let image = image::load_from_memory(bytes).ok()?;
    let thumbnail = image.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE).to_rgb8();

    let pixel_count = u64::from(thumbnail.width()) * u64::from(thumbnail.height());
    if pixel_count == 0 {
        return None;
    }

    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for pixel in thumbnail.pixels() {
        r += u64::from(pixel[0]);
        g += u64::from(pixel[1]);
        b += u64::from(pixel[2]);
    }

    let average = |sum: u64| sum as f64 / pixel_count as f64 / 255.0;
    let (h, s, l) = rgb_to_hsl(average(r), average(g), average(b));

    Some(palette_from_hsl(h, s.clamp(0.4, 0.7), l.clamp(0.25, 0.4)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_sources::{HttpResponse, TransportError};
    use std::io::Cursor;

    fn png(r: u8, g: u8, b: u8) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 12, image::Rgb([r, g, b]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    struct StaticTransport(Result<HttpResponse, ()>);

    #[async_trait]
    impl HttpTransport for StaticTransport {
        async fn get(&self, _url: &str) -> Result<HttpResponse, TransportError> {
            self.0
                .clone()
                .map_err(|_| TransportError::Request("blocked by CORS".into()))
        }
    }

    fn sampler(response: Result<HttpResponse, ()>) -> PosterSampler {
        PosterSampler::new(Arc::new(StaticTransport(response)), Duration::from_secs(1))
    }

    #[test]
    fn test_palette_from_red_image() {
        let palette = palette_from_image_bytes(&png(200, 30, 30)).unwrap();
        let bg = palette.background;
        assert!(bg.r > bg.g && bg.r > bg.b, "expected a red background, got {}", bg);
        assert!(palette.accent.r > bg.r);
    }

    #[test]
    fn test_garbage_bytes_do_not_decode() {
        assert_eq!(palette_from_image_bytes(b"<html>403</html>"), None);
        assert_eq!(palette_from_image_bytes(&[]), None);
    }

    #[tokio::test]
    async fn test_sample_success() {
        let sampler = sampler(Ok(HttpResponse { status: 200, body: png(20, 40, 200) }));
        let palette = sampler.sample("https://a.ltrbxd.com/poster.jpg").await.unwrap();
        assert!(palette.background.b > palette.background.r);
    }

    #[tokio::test]
    async fn test_sample_failures_are_silent() {
        assert_eq!(sampler(Err(())).sample("https://a.ltrbxd.com/p.jpg").await, None);
        assert_eq!(
            sampler(Ok(HttpResponse { status: 403, body: Vec::new() }))
                .sample("https://a.ltrbxd.com/p.jpg")
                .await,
            None
        );
        assert_eq!(sampler(Ok(HttpResponse { status: 200, body: png(1, 2, 3) })).sample("").await, None);
    }
}
