//! Chunked generation streams.
//!
//! [`Generator::start`] renders the full document up front and returns a
//! [`GenerationStream`] that hands it out in fixed-size [`Bytes`] slices.
//! The stream drives the site lifecycle as it is consumed:
//!
//! 1. First poll: the site moves to `generating`.
//! 2. Between two chunks the stream suspends for the configured delay, or
//!    just yields to the scheduler when the delay is zero.
//! 3. Poll after the last chunk: the site moves to `ready` and the
//!    document is stored in the registry.
//!
//! Dropping the stream (the HTTP client went away) cancels it at the
//! current suspension point. Nothing is written to the registry after
//! that, so a cancelled generation never shows up as `ready`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use sitegen_types::SiteId;
use tracing::{debug, warn};

use crate::config::GenerationConfig;
use crate::error::SiteError;
use crate::registry::SiteRegistry;
use crate::template::DocumentRenderer;

// ---------------------------------------------------------------------------
// DocumentChunks
// ---------------------------------------------------------------------------

/// Iterator over fixed-size slices of a document.
///
/// Every slice has exactly `chunk_size` bytes except possibly the last one.
/// Boundaries ignore markup and UTF-8 code points; consumers are expected
/// to concatenate the bytes.
#[derive(Debug, Clone)]
pub struct DocumentChunks {
    remaining: Bytes,
    chunk_size: usize,
}

impl DocumentChunks {
    /// Slice `document` into chunks of `chunk_size` bytes. A zero size is
    /// treated as one.
    pub fn new(document: Bytes, chunk_size: usize) -> Self {
        Self {
            remaining: document,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Whether every chunk has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl Iterator for DocumentChunks {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = self.chunk_size.min(self.remaining.len());
        Some(self.remaining.split_to(take))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.len().div_ceil(self.chunk_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for DocumentChunks {}

// ---------------------------------------------------------------------------
// GenerationStream
// ---------------------------------------------------------------------------

/// Lazy, finite, non-restartable stream of document chunks for one site.
pub struct GenerationStream {
    inner: BoxStream<'static, Bytes>,
}

impl GenerationStream {
    fn new(
        registry: SiteRegistry,
        site_id: SiteId,
        document: Arc<str>,
        chunk_size: usize,
        delay: Duration,
    ) -> Self {
        let chunks = DocumentChunks::new(Bytes::from(document.to_string()), chunk_size);
        let progress = Progress {
            registry,
            site_id,
            document,
            chunks,
            delay,
            delivered: 0,
            finished: false,
        };
        Self {
            inner: stream::unfold(progress, step).boxed(),
        }
    }
}

impl Stream for GenerationStream {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Bytes>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for GenerationStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationStream").finish_non_exhaustive()
    }
}

/// State threaded through the stream between chunks.
struct Progress {
    registry: SiteRegistry,
    site_id: SiteId,
    document: Arc<str>,
    chunks: DocumentChunks,
    delay: Duration,
    delivered: usize,
    finished: bool,
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                site_id = %self.site_id,
                chunks_delivered = self.delivered,
                "generation stream dropped before completion"
            );
        }
    }
}

/// Produce the next chunk, or finalize the site once all chunks are out.
async fn step(mut progress: Progress) -> Option<(Bytes, Progress)> {
    if progress.delivered == 0 {
        if let Err(e) = progress.registry.begin_generation(progress.site_id).await {
            warn!(site_id = %progress.site_id, error = %e, "failed to start generation");
            progress.finished = true;
            return None;
        }
    } else if !progress.chunks.is_exhausted() {
        pause(progress.delay).await;
    }

    if let Some(chunk) = progress.chunks.next() {
        progress.delivered = progress.delivered.saturating_add(1);
        return Some((chunk, progress));
    }

    progress.finished = true;
    let document = Arc::clone(&progress.document);
    match progress
        .registry
        .complete_generation(progress.site_id, document)
        .await
    {
        Ok(_) => debug!(
            site_id = %progress.site_id,
            chunks_delivered = progress.delivered,
            "generation stream complete"
        ),
        Err(e) => warn!(site_id = %progress.site_id, error = %e, "failed to finalize generation"),
    }
    None
}

/// Suspension point between two chunks.
async fn pause(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Renders documents and opens generation streams.
#[derive(Debug)]
pub struct Generator {
    renderer: DocumentRenderer,
    config: GenerationConfig,
}

impl Generator {
    /// Build a generator from configuration, loading the template override
    /// if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Template`] if the template cannot be loaded.
    pub fn new(config: GenerationConfig) -> Result<Self, SiteError> {
        let renderer = match config.template_path.as_deref() {
            Some(path) => DocumentRenderer::from_file(path)?,
            None => DocumentRenderer::builtin()?,
        };
        Ok(Self::with_renderer(renderer, config))
    }

    /// Build a generator around an existing renderer.
    pub const fn with_renderer(renderer: DocumentRenderer, config: GenerationConfig) -> Self {
        Self { renderer, config }
    }

    /// The active chunking and pacing configuration.
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Render the full document for `site_id` without streaming it.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] for an unknown id, or
    /// [`SiteError::Template`] if rendering fails.
    pub async fn render(
        &self,
        registry: &SiteRegistry,
        site_id: SiteId,
        prompt: &str,
    ) -> Result<String, SiteError> {
        let site = registry.get(site_id).await?;
        self.renderer.render(site.title.as_deref(), prompt)
    }

    /// Open a generation stream for an existing site.
    ///
    /// The registry is not touched until the stream is first polled.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] for an unknown id, or
    /// [`SiteError::Template`] if rendering fails.
    pub async fn start(
        &self,
        registry: &SiteRegistry,
        site_id: SiteId,
        prompt: &str,
    ) -> Result<GenerationStream, SiteError> {
        let document: Arc<str> = Arc::from(self.render(registry, site_id, prompt).await?);
        Ok(GenerationStream::new(
            registry.clone(),
            site_id,
            document,
            self.config.chunk_size,
            self.config.chunk_delay(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sitegen_types::SiteStatus;

    use super::*;
    use crate::registry::NewSite;

    fn generator(chunk_size: usize, chunk_delay_ms: u64) -> Generator {
        Generator::new(GenerationConfig {
            chunk_size,
            chunk_delay_ms,
            template_path: None,
        })
        .unwrap()
    }

    async fn registry_with_site(prompt: &str) -> (SiteRegistry, SiteId) {
        let registry = SiteRegistry::new();
        let site = registry
            .create(NewSite {
                prompt: prompt.to_owned(),
                title: None,
            })
            .await
            .unwrap();
        (registry, site.id)
    }

    async fn status(registry: &SiteRegistry, id: SiteId) -> SiteStatus {
        registry.get(id).await.unwrap().status
    }

    #[test]
    fn chunks_are_uniform_except_last() {
        let document = Bytes::from(vec![b'x'; 250]);
        let sizes: Vec<usize> = DocumentChunks::new(document, 100).map(|c| c.len()).collect();
        assert_eq!(sizes, [100, 100, 50]);
    }

    #[test]
    fn chunks_concatenate_to_document() {
        let document = "<html><body>split anywhere, even mid-tag</body></html>";
        let joined: Vec<u8> = DocumentChunks::new(Bytes::from_static(document.as_bytes()), 7)
            .flatten()
            .collect();
        assert_eq!(joined, document.as_bytes());
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let chunks = DocumentChunks::new(Bytes::from_static(b"abcdef"), 3);
        assert_eq!(chunks.len(), 2);
        let sizes: Vec<usize> = chunks.map(|c| c.len()).collect();
        assert_eq!(sizes, [3, 3]);
    }

    #[test]
    fn oversized_chunk_yields_single_slice_and_zero_is_clamped() {
        assert_eq!(DocumentChunks::new(Bytes::from_static(b"abc"), 1000).count(), 1);
        assert_eq!(DocumentChunks::new(Bytes::from_static(b"abc"), 0).count(), 3);
        assert!(DocumentChunks::new(Bytes::new(), 10).is_exhausted());
    }

    #[tokio::test(start_paused = true)]
    async fn stream_delivers_document_and_marks_ready() {
        let (registry, id) = registry_with_site("fan site").await;
        let generator = generator(100, 50);

        let stream = generator.start(&registry, id, "fan site").await.unwrap();
        let chunks: Vec<Bytes> = stream.collect().await;
        let body: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
        let html = String::from_utf8(body).unwrap();

        assert!(chunks.len() > 1);
        assert!(html.contains("fan site"));
        assert!(html.trim_end().ends_with("</html>"));

        let site = registry.get(id).await.unwrap();
        assert_eq!(site.status, SiteStatus::Ready);
        assert_eq!(site.html_url.as_deref(), Some("/sites/1/html"));
        let stored = registry.document(id).await.unwrap().unwrap();
        assert_eq!(&*stored, html.as_str());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_generation_is_byte_identical() {
        let (registry, id) = registry_with_site("bakery").await;
        let generator = generator(64, 10);

        let first: Vec<Bytes> = generator
            .start(&registry, id, "bakery")
            .await
            .unwrap()
            .collect()
            .await;
        let second: Vec<Bytes> = generator
            .start(&registry, id, "bakery")
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(first, second);

        let (last, rest) = first.split_last().unwrap();
        assert!(rest.iter().all(|c| c.len() == 64));
        assert!(!last.is_empty() && last.len() <= 64);
    }

    #[tokio::test]
    async fn status_is_generating_until_drained() {
        let (registry, id) = registry_with_site("p").await;
        let generator = generator(16, 0);

        let mut stream = generator.start(&registry, id, "p").await.unwrap();
        assert_eq!(status(&registry, id).await, SiteStatus::Created);

        assert!(stream.next().await.is_some());
        assert_eq!(status(&registry, id).await, SiteStatus::Generating);

        while stream.next().await.is_some() {
            assert_eq!(status(&registry, id).await, SiteStatus::Generating);
        }
        assert_eq!(status(&registry, id).await, SiteStatus::Ready);
    }

    #[tokio::test]
    async fn dropped_stream_never_finalizes() {
        let (registry, id) = registry_with_site("p").await;
        let generator = generator(16, 0);

        let mut stream = generator.start(&registry, id, "p").await.unwrap();
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());
        drop(stream);

        let site = registry.get(id).await.unwrap();
        assert_eq!(site.status, SiteStatus::Generating);
        assert!(site.html_url.is_none());
        assert!(registry.document(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn template_path_replaces_builtin_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.html.j2");
        std::fs::write(&path, "<main id=\"custom\">{{ title }}|{{ prompt }}</main>").unwrap();

        let generator = Generator::new(GenerationConfig {
            chunk_size: 4,
            chunk_delay_ms: 0,
            template_path: Some(path.to_string_lossy().into_owned()),
        })
        .unwrap();
        let (registry, id) = registry_with_site("fan & site").await;

        let chunks: Vec<Bytes> = generator
            .start(&registry, id, "fan & site")
            .await
            .unwrap()
            .collect()
            .await;
        let body: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();

        assert_eq!(
            String::from_utf8(body).unwrap(),
            "<main id=\"custom\">fan &amp; site|fan &amp; site</main>"
        );
        assert_eq!(status(&registry, id).await, SiteStatus::Ready);
    }

    #[test]
    fn missing_template_path_fails_construction() {
        let result = Generator::new(GenerationConfig {
            chunk_size: 100,
            chunk_delay_ms: 0,
            template_path: Some(String::from("/nonexistent/sitegen/site.html.j2")),
        });
        assert!(matches!(result, Err(SiteError::Template(_))));
    }

    #[tokio::test]
    async fn unknown_site_fails_before_streaming() {
        let registry = SiteRegistry::new();
        let result = generator(100, 0).start(&registry, SiteId(5), "p").await;
        assert!(matches!(result, Err(SiteError::NotFound(SiteId(5)))));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_separates_chunks() {
        let (registry, id) = registry_with_site("p").await;
        let generator = generator(100, 250);

        let stream = generator.start(&registry, id, "p").await.unwrap();
        let started = tokio::time::Instant::now();
        let count = stream.count().await;
        let elapsed = started.elapsed();

        let pauses = u32::try_from(count.saturating_sub(1)).unwrap();
        assert!(pauses > 0);
        assert!(elapsed >= Duration::from_millis(250).saturating_mul(pauses));
    }
}
