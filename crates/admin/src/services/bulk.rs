//! Chunked bulk upload.
//!
//! Files go to the media host in fixed chunks of five: all uploads within a
//! chunk run concurrently, and the chunk boundary is a synchronization
//! point: the next chunk starts only when every upload in the current one
//! has settled. A single file's failure is counted and skipped, never
//! aborting the rest of the batch.

use futures::future::join_all;
use tracing::instrument;

use super::media::{MediaUploader, UploadFile, UploadedMedia};

/// Uploads per chunk.
const CHUNK_SIZE: usize = 5;

/// Outcome of a bulk upload.
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Successful uploads, in input order within each chunk.
    pub uploaded: Vec<(UploadFile, UploadedMedia)>,
    /// Filenames that failed, with their error messages.
    pub failed: Vec<(String, String)>,
}

impl BulkReport {
    /// Human-readable summary: "N uploaded, M failed".
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} uploaded, {} failed", self.uploaded.len(), self.failed.len())
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }
}

/// Upload `files` into `folder`, five at a time.
///
/// `on_progress` is called after each chunk with (completed, total), the
/// numbers a progress bar wants.
#[instrument(skip(uploader, files, on_progress), fields(total = files.len()))]
pub async fn upload_in_chunks<U: MediaUploader>(
    uploader: &U,
    files: Vec<UploadFile>,
    folder: &str,
    mut on_progress: impl FnMut(usize, usize),
) -> BulkReport {
    let total = files.len();
    let mut report = BulkReport::default();
    let mut completed = 0;

    for chunk in files.chunks(CHUNK_SIZE) {
        let results = join_all(chunk.iter().map(|file| uploader.upload(file, folder))).await;

        for (file, result) in chunk.iter().zip(results) {
            match result {
                Ok(uploaded) => report.uploaded.push((file.clone(), uploaded)),
                Err(e) => {
                    tracing::warn!(filename = %file.filename, error = %e, "bulk upload item failed");
                    report.failed.push((file.filename.clone(), e.to_string()));
                }
            }
        }

        completed += chunk.len();
        on_progress(completed, total);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::media::MediaError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Uploader that fails any file whose name contains "bad" and records
    /// how many uploads were ever in flight at once.
    #[derive(Default)]
    struct StubUploader {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MediaUploader for StubUploader {
        async fn upload(
            &self,
            file: &UploadFile,
            _folder: &str,
        ) -> Result<UploadedMedia, MediaError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if file.filename.contains("bad") {
                Err(MediaError::Rejected("unsupported format".into()))
            } else {
                Ok(UploadedMedia {
                    url: format!("https://cdn.example/{}", file.filename),
                    id: file.filename.clone(),
                })
            }
        }
    }

    fn file(name: &str) -> UploadFile {
        UploadFile {
            filename: name.to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0xff, 0xd8],
        }
    }

    #[tokio::test]
    async fn failures_are_counted_without_aborting_the_batch() {
        let uploader = StubUploader::default();
        let files = vec![
            file("a.jpg"),
            file("bad-1.jpg"),
            file("b.jpg"),
            file("bad-2.jpg"),
            file("c.jpg"),
            file("d.jpg"),
        ];

        let report = upload_in_chunks(&uploader, files, "gallery", |_, _| {}).await;

        assert_eq!(report.uploaded.len(), 4);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.total(), 6);
        assert_eq!(report.summary(), "4 uploaded, 2 failed");
    }

    #[tokio::test]
    async fn progress_is_reported_per_chunk() {
        let uploader = StubUploader::default();
        let files: Vec<UploadFile> = (0..12).map(|i| file(&format!("{i}.jpg"))).collect();

        let progress = Mutex::new(Vec::new());
        let report = upload_in_chunks(&uploader, files, "gallery", |done, total| {
            progress
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push((done, total));
        })
        .await;

        assert_eq!(report.uploaded.len(), 12);
        let progress = progress
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(progress, vec![(5, 12), (10, 12), (12, 12)]);
    }

    #[tokio::test]
    async fn empty_batch_reports_nothing() {
        let uploader = StubUploader::default();
        let report = upload_in_chunks(&uploader, Vec::new(), "gallery", |_, _| {}).await;
        assert_eq!(report.total(), 0);
        assert_eq!(report.summary(), "0 uploaded, 0 failed");
    }
}
