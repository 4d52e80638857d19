//! Single reader, bounded worker pool, single writer.
//!
//! The reader consumes the header row first and builds the column map and
//! enricher from it; a bad header aborts the job before any worker starts.
//! Data rows then flow over a bounded intake channel shared by every worker,
//! and enriched records flow over a second bounded channel to the writer.
//! Both channels apply backpressure, so memory stays flat on large inputs.
//!
//! Rows are written in completion order. With one worker that is input
//! order; with more, no order is guaranteed.

use crate::columns::ColumnMap;
use crate::config::{
    JobConfig, DEFAULT_WORKERS, OUTPUT_BUFFER_SIZE, OUTPUT_SUFFIX, PROGRESS_INTERVAL,
    QUEUE_DEPTH_PER_WORKER,
};
use crate::enrich::RecordEnricher;
use crate::error::JobError;
use crate::models::RawRow;
use crate::reference::ReferenceData;
use crate::schema::{CanonicalRecord, Schema};
use crate::stats::JobStats;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use indicatif::ProgressBar;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{self, JoinSet};
use tracing::{debug, info};

pub struct Pipeline {
    reference: Arc<ReferenceData>,
    config: Arc<JobConfig>,
    schema: Arc<Schema>,
    workers: usize,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    pub fn new(reference: Arc<ReferenceData>, config: Arc<JobConfig>) -> Self {
        let schema = Arc::new(Schema::from_headers(&config.headers));
        Self {
            reference,
            config,
            schema,
            workers: DEFAULT_WORKERS,
            progress: None,
        }
    }

    /// Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Streams `input` through the worker pool into `output`.
    ///
    /// Fails on an empty input, a header without a zip column, an invalid
    /// central zip, or any read/write error. Counters for the run are
    /// returned on success.
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<Arc<JobStats>>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let start = Instant::now();
        let stats = Arc::new(JobStats::new());

        let (mut reader, header) = task::spawn_blocking(move || -> Result<_> {
            // rows with a different field count than the header are fatal
            let mut reader = ReaderBuilder::new().has_headers(false).from_reader(input);
            let mut header = StringRecord::new();
            if !reader
                .read_record(&mut header)
                .context("Failed to read header row")?
            {
                return Err(JobError::EmptyInput.into());
            }
            Ok((reader, header))
        })
        .await
        .context("Header task failed")??;

        let columns = ColumnMap::from_header(&header.iter().collect::<Vec<_>>())?;
        debug!("Column map:\n{}", columns);

        let enricher = Arc::new(
            RecordEnricher::new(
                columns,
                Arc::clone(&self.reference),
                Arc::clone(&self.config),
            )?
            .with_stats(Arc::clone(&stats)),
        );

        let depth = self.workers * QUEUE_DEPTH_PER_WORKER;
        let (intake_tx, intake_rx) = mpsc::channel::<RawRow>(depth);
        let (result_tx, mut result_rx) = mpsc::channel::<CanonicalRecord>(depth);

        let reader_stats = Arc::clone(&stats);
        let read_task = task::spawn_blocking(move || -> Result<()> {
            for (i, record) in reader.records().enumerate() {
                // the header is row 0
                let index = i + 1;
                let record =
                    record.with_context(|| format!("Failed to read input row {index}"))?;
                reader_stats.inc_rows_read();
                if index as u64 % PROGRESS_INTERVAL == 0 {
                    debug!(rows = index, "Reading");
                }
                if intake_tx.blocking_send(RawRow::new(index, record)).is_err() {
                    // every worker is gone; the writer reports why
                    break;
                }
            }
            Ok(())
        });

        // the writer must hold a blocking thread before any worker is queued;
        // workers beyond the runtime's blocking cap wait their turn
        let schema = Arc::clone(&self.schema);
        let writer_stats = Arc::clone(&stats);
        let write_task = task::spawn_blocking(move || -> Result<()> {
            let mut writer =
                Writer::from_writer(BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, output));
            writer
                .write_record(schema.headers())
                .context("Failed to write header row")?;
            while let Some(record) = result_rx.blocking_recv() {
                writer
                    .write_record(schema.project(&record))
                    .context("Failed to write record")?;
                writer_stats.inc_records_written();
            }
            writer.flush().context("Failed to flush output")?;
            Ok(())
        });

        let intake = Arc::new(Mutex::new(intake_rx));
        let mut workers = JoinSet::new();
        for _ in 0..self.workers {
            let intake = Arc::clone(&intake);
            let results = result_tx.clone();
            let enricher = Arc::clone(&enricher);
            let progress = self.progress.clone();
            workers.spawn_blocking(move || {
                loop {
                    // the intake lock is released before the row is processed
                    let next = intake.blocking_lock().blocking_recv();
                    let Some(row) = next else {
                        break;
                    };
                    let record = enricher.enrich(&row);
                    enricher.audit_suppression(&record);
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    if !enricher.retains(&record) {
                        enricher.stats().inc_blank_date_drops();
                        continue;
                    }
                    if results.blocking_send(record).is_err() {
                        break;
                    }
                }
            });
        }
        // the result channel closes once the last worker drops its sender
        drop(result_tx);

        while let Some(joined) = workers.join_next().await {
            joined.context("Worker task failed")?;
        }
        read_task.await.context("Reader task failed")??;
        write_task.await.context("Writer task failed")??;

        info!(
            rows = stats.rows_read(),
            written = stats.records_written(),
            invalid_zips = stats.invalid_zips(),
            workers = self.workers,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Job complete"
        );
        Ok(stats)
    }

    /// Runs one file job. See [`Pipeline::run_to_path`].
    pub async fn run_file(&self, input: &Path, output: &Path) -> Result<Arc<JobStats>> {
        let source = File::open(input)
            .with_context(|| format!("Failed to open input: {}", input.display()))?;
        let stats = self.run_to_path(BufReader::new(source), output).await?;
        info!(input = %input.display(), output = %output.display(), "Output written");
        Ok(stats)
    }

    /// Output goes to a temporary sibling that is renamed over `output` only
    /// when the whole job succeeds; on failure the temporary file is removed.
    pub async fn run_to_path<R>(&self, input: R, output: &Path) -> Result<Arc<JobStats>>
    where
        R: Read + Send + 'static,
    {
        let tmp = temp_path(output);
        let sink = File::create(&tmp)
            .with_context(|| format!("Failed to create output: {}", tmp.display()))?;

        match self.run(input, sink).await {
            Ok(stats) => {
                fs::rename(&tmp, output).with_context(|| {
                    format!("Failed to move {} to {}", tmp.display(), output.display())
                })?;
                Ok(stats)
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                Err(e)
            }
        }
    }
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    output.with_file_name(name)
}

/// `<dir>/<stem>_output.csv` beside the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Every `.csv` in `dir` that is not itself a job output, sorted by name.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && name.ends_with(".csv") && !name.ends_with(OUTPUT_SUFFIX) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Newline count, plus one for a final unterminated line.
pub fn count_lines(path: &Path) -> Result<u64> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut buf = vec![0u8; OUTPUT_BUFFER_SIZE];
    let mut lines = 0u64;
    let mut last = b'\n';
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        lines += memchr::memchr_iter(b'\n', &buf[..n]).count() as u64;
        last = buf[n - 1];
    }
    if last != b'\n' {
        lines += 1;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_path_sits_beside_input() {
        assert_eq!(
            default_output_path(Path::new("/data/list.csv")),
            PathBuf::from("/data/list_output.csv")
        );
        assert_eq!(
            default_output_path(Path::new("list")),
            PathBuf::from("list_output.csv")
        );
    }

    #[test]
    fn temp_path_is_a_sibling() {
        assert_eq!(
            temp_path(Path::new("/data/list_output.csv")),
            PathBuf::from("/data/list_output.csv.tmp")
        );
    }

    #[test]
    fn discovery_skips_outputs_and_other_files() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.csv", "a.csv", "a_output.csv", "notes.txt"] {
            fs::write(tmp.path().join(name), "zip\n").unwrap();
        }
        fs::create_dir(tmp.path().join("dir.csv")).unwrap();

        let found: Vec<_> = discover_inputs(tmp.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn line_counting() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.csv");

        fs::write(&path, "").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 0);
        fs::write(&path, "zip\n1\n2\n").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 3);
        fs::write(&path, "zip\n1\n2").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 3);
    }

    #[test]
    fn worker_count_floor() {
        let p = Pipeline::new(Arc::default(), Arc::default()).with_workers(0);
        assert_eq!(p.workers(), 1);
    }
}
