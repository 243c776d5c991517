//! Batch fetching.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::opts::Opts;
use crate::protocol::{Batch, QueryToken};

/// Source of result batches for a running query.
///
/// Implemented by the transport. Each method performs one blocking round
/// trip for the query identified by `token`:
/// - `fetch_next` asks for the next batch ("continue")
/// - `abandon` tells the server to stop producing rows ("stop")
pub trait BatchFetcher {
    /// Fetch the next batch of rows.
    ///
    /// `opts` carries batch size hints (see [`Opts::batch_optargs()`]).
    fn fetch_next(&mut self, token: QueryToken, opts: &Opts) -> Result<Batch>;

    /// Stop the query on the server. Best-effort.
    fn abandon(&mut self, token: QueryToken) -> Result<()>;
}

impl<F: BatchFetcher + ?Sized> BatchFetcher for &mut F {
    fn fetch_next(&mut self, token: QueryToken, opts: &Opts) -> Result<Batch> {
        (**self).fetch_next(token, opts)
    }

    fn abandon(&mut self, token: QueryToken) -> Result<()> {
        (**self).abandon(token)
    }
}

impl<F: BatchFetcher + ?Sized> BatchFetcher for Box<F> {
    fn fetch_next(&mut self, token: QueryToken, opts: &Opts) -> Result<Batch> {
        (**self).fetch_next(token, opts)
    }

    fn abandon(&mut self, token: QueryToken) -> Result<()> {
        (**self).abandon(token)
    }
}

/// Fetcher that replays batches already held in memory.
///
/// Useful for results that arrived in one piece and for tests.
#[derive(Debug, Default)]
pub struct ReplayFetcher {
    batches: VecDeque<Batch>,
    fetches: usize,
    abandons: usize,
}

impl ReplayFetcher {
    /// Create a fetcher that hands out `batches` in order.
    pub fn new(batches: impl IntoIterator<Item = Batch>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
            fetches: 0,
            abandons: 0,
        }
    }

    /// Queue another batch.
    pub fn push(&mut self, batch: Batch) {
        self.batches.push_back(batch);
    }

    /// Number of batches still queued.
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }

    /// Number of `fetch_next` calls served so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Number of `abandon` calls received so far.
    pub fn abandons(&self) -> usize {
        self.abandons
    }
}

impl BatchFetcher for ReplayFetcher {
    fn fetch_next(&mut self, token: QueryToken, _opts: &Opts) -> Result<Batch> {
        self.fetches += 1;
        self.batches.pop_front().ok_or_else(|| {
            Error::Protocol(format!("no batch left to replay for query {}", token))
        })
    }

    fn abandon(&mut self, _token: QueryToken) -> Result<()> {
        self.abandons += 1;
        self.batches.clear();
        Ok(())
    }
}
