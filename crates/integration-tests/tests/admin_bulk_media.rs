//! Bulk-upload accounting at batch scale: chunk boundaries, progress
//! checkpoints, and failure aggregation.

use std::sync::Mutex;

use aurelle_admin::services::bulk::upload_in_chunks;
use aurelle_admin::services::media::{MediaError, MediaUploader, UploadFile, UploadedMedia};

/// Uploader that fails every third file.
struct FlakyUploader;

impl MediaUploader for FlakyUploader {
    async fn upload(&self, file: &UploadFile, _folder: &str) -> Result<UploadedMedia, MediaError> {
        tokio::task::yield_now().await;

        let index: usize = file
            .filename
            .trim_end_matches(".jpg")
            .parse()
            .unwrap_or_default();
        if index % 3 == 2 {
            Err(MediaError::Rejected("simulated failure".into()))
        } else {
            Ok(UploadedMedia {
                url: format!("https://cdn.example/{}", file.filename),
                id: file.filename.clone(),
            })
        }
    }
}

fn files(count: usize) -> Vec<UploadFile> {
    (0..count)
        .map(|i| UploadFile {
            filename: format!("{i}.jpg"),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0xff, 0xd8],
        })
        .collect()
}

#[tokio::test]
async fn a_23_file_batch_settles_in_five_chunks() {
    let progress = Mutex::new(Vec::new());

    let report = upload_in_chunks(&FlakyUploader, files(23), "gallery", |done, total| {
        progress
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((done, total));
    })
    .await;

    // Indices 2, 5, 8, 11, 14, 17, 20 fail: 7 failures.
    assert_eq!(report.failed.len(), 7);
    assert_eq!(report.uploaded.len(), 16);
    assert_eq!(report.total(), 23);
    assert_eq!(report.summary(), "16 uploaded, 7 failed");

    let progress = progress
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    assert_eq!(
        progress,
        vec![(5, 23), (10, 23), (15, 23), (20, 23), (23, 23)],
        "one checkpoint per chunk, final one short"
    );
}

#[tokio::test]
async fn failures_keep_their_messages_for_the_aggregate_report() {
    let report = upload_in_chunks(&FlakyUploader, files(3), "gallery", |_, _| {}).await;

    assert_eq!(report.failed.len(), 1);
    let (filename, error) = &report.failed[0];
    assert_eq!(filename, "2.jpg");
    assert!(error.contains("simulated failure"));
}
