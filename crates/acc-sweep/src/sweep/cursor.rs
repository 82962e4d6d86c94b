//! Paginated listing
//!
//! A [`PageCursor`] yields the items of a listing call one page at a time.
//! [`TokenCursor`] drives any API that pages with an opaque continuation
//! token, keeping the token to itself.

use crate::aws::Page;
use anyhow::Result;
use futures::future::BoxFuture;
use std::future::Future;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("next_page called on an exhausted cursor")]
    Exhausted,
}

/// Lazy iterator over pages of a listing
pub trait PageCursor: Send {
    type Item: Send;

    /// True before the first fetch and while the previous page carried a
    /// continuation token. False after any fetch error.
    fn has_more(&self) -> bool;

    /// Fetch the next page.
    ///
    /// Calling this when [`has_more`](Self::has_more) is false fails with
    /// [`CursorError::Exhausted`] without calling the backend.
    fn next_page(&mut self) -> impl Future<Output = Result<Vec<Self::Item>>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CursorState {
    Start,
    Token(String),
    Done,
}

/// [`PageCursor`] over a token-paginated listing call
pub struct TokenCursor<T, F> {
    fetch: F,
    state: CursorState,
    _item: PhantomData<fn() -> T>,
}

impl<T, F> TokenCursor<T, F>
where
    F: FnMut(Option<String>) -> BoxFuture<'static, Result<Page<T>>>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            state: CursorState::Start,
            _item: PhantomData,
        }
    }
}

impl<T, F> PageCursor for TokenCursor<T, F>
where
    T: Send,
    F: FnMut(Option<String>) -> BoxFuture<'static, Result<Page<T>>> + Send,
{
    type Item = T;

    fn has_more(&self) -> bool {
        self.state != CursorState::Done
    }

    fn next_page(&mut self) -> impl Future<Output = Result<Vec<T>>> + Send {
        let request = match std::mem::replace(&mut self.state, CursorState::Done) {
            CursorState::Start => Ok(None),
            CursorState::Token(token) => Ok(Some(token)),
            CursorState::Done => Err(CursorError::Exhausted),
        };
        let fetch = request.map(|token| {
            let sent = token.clone();
            ((self.fetch)(token), sent)
        });
        let state = &mut self.state;

        async move {
            let (fetch, sent) = fetch?;
            // State stays Done if the fetch fails.
            let page = fetch.await?;

            match page.next_token {
                Some(next) if sent.as_deref() == Some(next.as_str()) => {
                    warn!(token = %next, "Listing returned the same continuation token twice, stopping");
                }
                Some(next) => *state = CursorState::Token(next),
                None => {}
            }
            Ok::<_, anyhow::Error>(page.items)
        }
    }
}
