// src/pipeline/attachments.rs

//! Attachment extraction pipeline.
//!
//! scan -> name -> download -> transcribe -> manifest, one thread at a time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{
    AttachmentRecord, AttachmentReference, Manifest, ManifestEntry, Outcome, RawThread,
};
use crate::services::{
    AttachmentDownloader, AttachmentScanner, DownloadMode, Transcriber, is_transcribable,
};
use crate::utils::fs::{claim_unique_name, sanitize_filename, with_extension};

/// Counters reported at the end of an attachment run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentStats {
    pub threads_with_attachments: usize,
    pub references_found: usize,
    pub files_saved: usize,
    pub files_skipped: usize,
    pub transcripts_created: usize,
}

/// Accumulates per-thread attachment records into the manifest.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    manifest: Manifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a thread's surviving attachments. Threads with none are not
    /// added. Records keep the order they were given in.
    pub fn add_thread(&mut self, thread: &RawThread, number: u64, records: Vec<AttachmentRecord>) {
        if records.is_empty() {
            return;
        }
        self.manifest.insert(
            number,
            ManifestEntry {
                thread_id: thread.id,
                thread_title: thread.title.clone(),
                attachments: records,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }

    pub fn build(self) -> Manifest {
        self.manifest
    }
}

/// Directory holding one thread's attachments.
pub fn thread_dir_name(number: u64) -> String {
    format!("thread_{number}")
}

/// One attachment with the names it will be stored under.
struct AttachmentJob<'r> {
    reference: &'r AttachmentReference,
    file_name: String,
    /// Set when the file will be transcribed
    transcript_name: Option<String>,
}

/// Processes the attachments of filtered threads.
pub struct AttachmentProcessor {
    scanner: AttachmentScanner,
    downloader: AttachmentDownloader,
    transcriber: Transcriber,
    files_dir: PathBuf,
    saved_path_prefix: String,
    max_concurrent: usize,
}

impl AttachmentProcessor {
    pub fn new(
        downloader: AttachmentDownloader,
        transcriber: Transcriber,
        files_dir: impl Into<PathBuf>,
        saved_path_prefix: impl Into<String>,
    ) -> Self {
        Self {
            scanner: AttachmentScanner::new(),
            downloader,
            transcriber,
            files_dir: files_dir.into(),
            saved_path_prefix: saved_path_prefix.into(),
            max_concurrent: 1,
        }
    }

    /// Allow up to `n` downloads in flight within one thread.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Process every thread and build the manifest.
    pub async fn run(&self, threads: &[RawThread]) -> Result<(Manifest, AttachmentStats)> {
        tokio::fs::create_dir_all(&self.files_dir).await?;

        let mut builder = ManifestBuilder::new();
        let mut stats = AttachmentStats::default();

        for thread in threads {
            let references = self.scanner.scan(&thread.content);
            if references.is_empty() {
                continue;
            }

            log::info!("Thread {}: {}", thread.label(), thread.title);
            log::info!("  Found {} file(s)", references.len());
            stats.threads_with_attachments += 1;
            stats.references_found += references.len();

            match self.process_thread(thread, &references).await {
                Outcome::Done((number, records)) => {
                    stats.files_saved += records.len();
                    stats.files_skipped += references.len() - records.len();
                    stats.transcripts_created += records
                        .iter()
                        .filter(|r| r.transcript_path.is_some())
                        .count();
                    builder.add_thread(thread, number, records);
                }
                Outcome::Skipped { reason } => {
                    stats.files_skipped += references.len();
                    log::warn!("  Skipping attachments of thread {}: {}", thread.label(), reason);
                }
            }
        }

        Ok((builder.build(), stats))
    }

    /// Download and transcribe one thread's attachments, in scan order.
    async fn process_thread(
        &self,
        thread: &RawThread,
        references: &[AttachmentReference],
    ) -> Outcome<(u64, Vec<AttachmentRecord>)> {
        let Some(number) = thread.number else {
            return Outcome::skipped("thread has no number");
        };

        let dir_name = thread_dir_name(number);
        let thread_dir = self.files_dir.join(&dir_name);
        if let Err(e) = tokio::fs::create_dir_all(&thread_dir).await {
            return Outcome::skipped(format!("cannot create {}: {e}", thread_dir.display()));
        }

        let jobs = self.claim_names(references);

        let records: Vec<AttachmentRecord> = stream::iter(jobs)
            .map(|job| {
                let thread_dir = &thread_dir;
                let dir_name = &dir_name;
                async move { self.process_attachment(job, thread_dir, dir_name).await }
            })
            .buffered(self.max_concurrent)
            .filter_map(|outcome| async move { outcome.done() })
            .collect()
            .await;

        Outcome::Done((number, records))
    }

    /// Pick every on-disk name of a thread up front: attachments first, in
    /// scan order, then transcripts. A transcript never reuses a name
    /// claimed by an attachment or another transcript.
    fn claim_names<'r>(&self, references: &'r [AttachmentReference]) -> Vec<AttachmentJob<'r>> {
        let mut taken = HashSet::new();
        let mut jobs: Vec<AttachmentJob<'r>> = references
            .iter()
            .map(|reference| AttachmentJob {
                reference,
                file_name: claim_unique_name(&sanitize_filename(&reference.filename), &mut taken),
                transcript_name: None,
            })
            .collect();

        if self.downloader.mode() == DownloadMode::Fetch {
            for job in jobs.iter_mut().filter(|j| is_transcribable(&j.file_name)) {
                job.transcript_name =
                    Some(claim_unique_name(&with_extension(&job.file_name, "txt"), &mut taken));
            }
        }
        jobs
    }

    async fn process_attachment(
        &self,
        job: AttachmentJob<'_>,
        thread_dir: &Path,
        dir_name: &str,
    ) -> Outcome<AttachmentRecord> {
        let AttachmentJob {
            reference,
            file_name,
            transcript_name,
        } = job;
        let file_name = file_name.as_str();

        let path = match self.downloader.download(reference, thread_dir, file_name).await {
            Outcome::Done(path) => path,
            Outcome::Skipped { reason } => return Outcome::Skipped { reason },
        };

        let mut record = AttachmentRecord {
            original_filename: reference.filename.clone(),
            saved_path: self.saved_path(dir_name, file_name),
            source_url: reference.url.clone(),
            position: reference.position,
            context: reference.context.clone(),
            transcript_path: None,
        };

        if let Some(transcript_name) = transcript_name {
            log::info!("  Extracting text from: {file_name}");
            let text = self.transcriber.transcribe(&path).await;
            if !text.is_empty() {
                match tokio::fs::write(thread_dir.join(&transcript_name), text).await {
                    Ok(()) => {
                        log::info!("  Saved transcript: {transcript_name}");
                        record.transcript_path = Some(self.saved_path(dir_name, &transcript_name));
                    }
                    Err(e) => log::warn!("  Cannot write transcript {transcript_name}: {e}"),
                }
            }
        }

        Outcome::Done(record)
    }

    fn saved_path(&self, dir_name: &str, file_name: &str) -> String {
        let prefix = self.saved_path_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            format!("{dir_name}/{file_name}")
        } else {
            format!("{prefix}/{dir_name}/{file_name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::Result as AppResult;
    use crate::services::PageRenderer;
    use tempfile::TempDir;

    struct EchoRenderer;

    impl PageRenderer for EchoRenderer {
        fn render_pages(&self, bytes: &[u8]) -> AppResult<Vec<String>> {
            Ok(vec![String::from_utf8_lossy(bytes).into_owned()])
        }
    }

    fn thread(number: Option<u64>, content: &str) -> RawThread {
        RawThread {
            id: Some(100),
            number,
            title: "Special Participation A".to_string(),
            content: content.to_string(),
            ..RawThread::default()
        }
    }

    fn placeholder_processor(files_dir: &Path) -> AttachmentProcessor {
        AttachmentProcessor::new(
            AttachmentDownloader::new(reqwest::Client::new(), DownloadMode::Placeholder),
            Transcriber::new(Arc::new(EchoRenderer)),
            files_dir,
            "files",
        )
    }

    #[test]
    fn test_manifest_builder_skips_empty_threads() {
        let mut builder = ManifestBuilder::new();
        builder.add_thread(&thread(Some(1), ""), 1, Vec::new());
        assert!(builder.is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_mode_records_without_transcripts() {
        let tmp = TempDir::new().unwrap();
        let processor = placeholder_processor(tmp.path());
        let content = concat!(
            r#"<file url="http://127.0.0.1:9/a" filename="Report: v1.pdf"/>"#,
            r#"<file url="http://127.0.0.1:9/b" filename="Report? v1.pdf"/>"#,
            r#"<file url="http://127.0.0.1:9/c" filename="chat.png"/>"#,
        );

        let (manifest, stats) = processor.run(&[thread(Some(42), content)]).await.unwrap();

        let entry = &manifest[&42];
        assert_eq!(entry.thread_id, Some(100));
        let saved: Vec<&str> = entry.attachments.iter().map(|a| a.saved_path.as_str()).collect();
        assert_eq!(
            saved,
            vec![
                "files/thread_42/Report_ v1.pdf",
                "files/thread_42/Report_ v1_2.pdf",
                "files/thread_42/chat.png",
            ]
        );
        assert!(entry.attachments.iter().all(|a| a.transcript_path.is_none()));
        assert!(tmp.path().join("thread_42/Report_ v1_2.pdf").exists());
        assert_eq!(stats.files_saved, 3);
        assert_eq!(stats.transcripts_created, 0);
    }

    #[tokio::test]
    async fn test_threads_without_attachments_or_number_are_omitted() {
        let tmp = TempDir::new().unwrap();
        let processor = placeholder_processor(tmp.path());
        let with_file = r#"<file url="http://127.0.0.1:9/a" filename="a.pdf"/>"#;

        let (manifest, stats) = processor
            .run(&[thread(Some(1), "<p>no files</p>"), thread(None, with_file)])
            .await
            .unwrap();

        assert!(manifest.is_empty());
        assert_eq!(stats.files_skipped, 1);
    }

    fn reference(filename: &str) -> AttachmentReference {
        AttachmentReference {
            url: format!("http://127.0.0.1:9/{filename}"),
            filename: filename.to_string(),
            position: 0,
            context: String::new(),
        }
    }

    #[test]
    fn test_transcript_names_avoid_attachment_names() {
        let tmp = TempDir::new().unwrap();
        let processor = AttachmentProcessor::new(
            AttachmentDownloader::new(reqwest::Client::new(), DownloadMode::Fetch),
            Transcriber::new(Arc::new(EchoRenderer)),
            tmp.path(),
            "files",
        );
        let references = vec![reference("notes.txt"), reference("notes.pdf"), reference("notes_2.txt")];

        let jobs = processor.claim_names(&references);
        let names: Vec<(&str, Option<&str>)> = jobs
            .iter()
            .map(|j| (j.file_name.as_str(), j.transcript_name.as_deref()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("notes.txt", None),
                ("notes.pdf", Some("notes_3.txt")),
                ("notes_2.txt", None),
            ]
        );
    }

    #[test]
    fn test_placeholder_mode_claims_no_transcripts() {
        let tmp = TempDir::new().unwrap();
        let processor = placeholder_processor(tmp.path());
        let references = vec![reference("notes.pdf")];

        let jobs = processor.claim_names(&references);
        assert!(jobs[0].transcript_name.is_none());
    }

    #[test]
    fn test_saved_path_prefix() {
        let tmp = TempDir::new().unwrap();
        let processor = AttachmentProcessor::new(
            AttachmentDownloader::new(reqwest::Client::new(), DownloadMode::Placeholder),
            Transcriber::unavailable(),
            tmp.path(),
            "",
        );
        assert_eq!(processor.saved_path("thread_1", "a.pdf"), "thread_1/a.pdf");
    }
}
