//! Chunked batch reads of custom-object records.

use std::collections::HashMap;

use futures::{StreamExt, TryStreamExt, stream};

use super::CrmClient;
use crate::config::Credential;
use crate::domain::OrderField;
use crate::domain::wire::{BatchReadRequest, BatchReadResponse, RawRecord};
use crate::error::{OrderHistoryError, Result, UpstreamOperation};
use crate::http::{HttpClient, HttpRequest};

impl<H: HttpClient> CrmClient<H> {
    /// Fetch the order properties of every id, one batch-read per chunk.
    ///
    /// Chunks are at most `batch_read_limit` ids, contiguous, and requested
    /// one after another. The first failing chunk aborts the fetch and the
    /// records from earlier chunks are dropped.
    #[tracing::instrument(skip(self, ids, credential), fields(ids = ids.len()))]
    pub async fn fetch_batches(
        &self,
        ids: &[String],
        credential: &Credential,
    ) -> Result<Vec<RawRecord>> {
        let limit = self.config.effective_batch_limit();
        let chunk_count = ids.len().div_ceil(limit);

        stream::iter(ids.chunks(limit).enumerate())
            .then(|(index, chunk)| self.read_chunk(index, chunk_count, chunk, credential))
            .try_fold(Vec::with_capacity(ids.len()), |mut records, chunk| async move {
                records.extend(chunk);
                Ok::<_, OrderHistoryError>(records)
            })
            .await
    }

    async fn read_chunk(
        &self,
        index: usize,
        chunk_count: usize,
        chunk: &[String],
        credential: &Credential,
    ) -> Result<Vec<RawRecord>> {
        let url = self.endpoint(&[
            "crm",
            "v3",
            "objects",
            self.config.object_type_id.as_str(),
            "batch",
            "read",
        ])?;
        let body = serde_json::to_string(&BatchReadRequest::new(OrderField::properties(), chunk))?;

        tracing::debug!(
            chunk = index + 1,
            of = chunk_count,
            size = chunk.len(),
            "Reading batch"
        );

        let response_body = self
            .send(
                UpstreamOperation::BatchRead,
                HttpRequest::post_json(url, body),
                credential,
            )
            .await
            .map_err(|e| {
                tracing::error!(chunk = index + 1, of = chunk_count, "Batch read aborted");
                e
            })?;

        let response: BatchReadResponse = serde_json::from_str(&response_body).map_err(|e| {
            tracing::error!(error = %e, chunk = index + 1, "Malformed batch-read response");
            e
        })?;

        Ok(order_by_request(chunk, response.results))
    }
}

/// Re-key upstream results by id and emit them in request order.
///
/// An id requested twice is emitted twice. Requested ids missing from the
/// response are skipped, and results nobody asked for are dropped.
fn order_by_request(requested: &[String], results: Vec<RawRecord>) -> Vec<RawRecord> {
    let returned = results.len();
    let mut by_id: HashMap<String, RawRecord> = HashMap::with_capacity(returned);
    for record in results {
        by_id.entry(record.id.clone()).or_insert(record);
    }

    let ordered: Vec<RawRecord> = requested
        .iter()
        .filter_map(|id| by_id.get(id).cloned())
        .collect();

    let missing = requested.iter().filter(|id| !by_id.contains_key(*id)).count();
    if missing > 0 {
        tracing::warn!(
            requested = requested.len(),
            missing = missing,
            "Batch read did not return every requested record"
        );
    }
    let unrequested = by_id
        .keys()
        .filter(|id| !requested.contains(id))
        .count();
    if unrequested > 0 {
        tracing::warn!(
            returned = returned,
            unrequested = unrequested,
            "Batch read returned records that were not requested"
        );
    }

    ordered
}
