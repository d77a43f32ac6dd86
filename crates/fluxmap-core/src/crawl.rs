//! Repository crawl: walk, decode in parallel, collect in walk order
//!
//! The calling thread walks the tree, feeds the cluster forest with every
//! directory and hands YAML files to a pool of decode workers. Results
//! carry the sequence number of their file and are appended to the stores
//! in that order, so store order never depends on worker scheduling.

use crossbeam_channel::{Receiver, Sender};
use fluxmap_fs::{NormalizedPath, io};
use walkdir::WalkDir;

use crate::clusters::ClusterMatcher;
use crate::context::ResolutionContext;
use crate::decode::{Decoder, Document};
use crate::{Error, Result};

struct DecodeJob {
    seq: usize,
    path: NormalizedPath,
}

struct Decoded {
    seq: usize,
    path: NormalizedPath,
    documents: Vec<Document>,
}

/// Crawl `ctx.root`, filling the manifest and source stores and the
/// cluster forest.
pub fn crawl(ctx: &mut ResolutionContext) -> Result<()> {
    let root = ctx.root.clone();
    let decoder = Decoder::from_config(&ctx.config);
    let matcher = ClusterMatcher::from_config(&ctx.config);
    let workers = ctx.config.effective_workers();
    let follow_links = ctx.config.follow_links;

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<DecodeJob>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<Decoded>();

    let mut decoded = std::thread::scope(|scope| -> Result<Vec<Decoded>> {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let decoder = &decoder;
                scope.spawn(move || decode_worker(decoder, job_rx, result_tx))
            })
            .collect();
        drop(job_rx);
        drop(result_tx);

        let mut seq = 0;
        for entry in WalkDir::new(root.to_native())
            .follow_links(follow_links)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let path = NormalizedPath::new(entry.path()).clean();

            if entry.file_type().is_dir() {
                ctx.clusters.insert(&matcher.candidates(&root, &path));
                continue;
            }
            if !entry.file_type().is_file() || !path.is_yaml() {
                continue;
            }

            if job_tx.send(DecodeJob { seq, path }).is_err() {
                break;
            }
            seq += 1;
        }
        drop(job_tx);

        for handle in handles {
            handle.join().map_err(|_| Error::WorkerPanicked)?;
        }
        Ok(result_rx.iter().collect())
    })?;

    decoded.sort_by_key(|file| file.seq);
    for file in decoded {
        for document in file.documents {
            match document {
                Document::Manifest(doc) => {
                    ctx.push_manifest(doc, file.path.clone());
                }
                Document::Source(doc) => {
                    ctx.push_source(doc, file.path.clone());
                }
                Document::Unrecognized => {}
            }
        }
    }

    tracing::debug!(
        manifests = ctx.manifests.len(),
        sources = ctx.sources.len(),
        clusters = ctx.clusters.len(),
        "Crawl complete"
    );
    Ok(())
}

fn decode_worker(decoder: &Decoder, jobs: Receiver<DecodeJob>, results: Sender<Decoded>) {
    for job in jobs.iter() {
        let documents = io::read_text_lenient(&job.path)
            .map(|content| decoder.decode_stream(&content))
            .unwrap_or_default();
        let decoded = Decoded {
            seq: job.seq,
            path: job.path,
            documents,
        };
        if results.send(decoded).is_err() {
            break;
        }
    }
}
